use md5::{Digest, Md5};
use std::io::{self, Read};

/// 读取 `reader` 直到 EOF，返回内容的 MD5（小写十六进制）
///
/// 调用方负责在之后将读取位置复位。
pub fn md5_hex<R: Read + ?Sized>(reader: &mut R) -> io::Result<String> {
    let mut hasher = Md5::new();
    io::copy(reader, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}
