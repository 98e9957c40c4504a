use chrono::{DateTime, TimeZone};
use std::fmt::Display;

/// 输出文件名中的时间戳格式，例如 `2024-03-09 14.05.07 +0800`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H.%M.%S %z";

/// 客户端文件名清洗后为空时使用的名称
pub const FALLBACK_FILE_NAME: &str = "upload";

/// 生成输出文件名：`<时间戳> <md5> <原始文件名>`
pub fn output_file_name<Tz>(captured_at: &DateTime<Tz>, checksum: &str, original: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "{} {} {}",
        captured_at.format(TIMESTAMP_FORMAT),
        checksum,
        original
    )
}

/// 只保留客户端文件名的最后一段路径
///
/// 同时按 `/` 和 `\` 拆分，保证文件名不会逃出输出目录。
pub fn sanitize_client_file_name(raw: &str) -> String {
    let name = raw
        .trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    match name {
        "" | "." | ".." => FALLBACK_FILE_NAME.to_string(),
        _ => name.to_string(),
    }
}
