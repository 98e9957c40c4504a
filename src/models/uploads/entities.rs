use std::io::{self, Cursor, Read, Seek, SeekFrom};
use tempfile::NamedTempFile;

/// 一次请求中解析出的表单
#[derive(Debug, Default)]
pub struct UploadForm {
    pub fields: Vec<FormField>,
}

impl UploadForm {
    /// 将附件追加到同名字段，字段按首次出现的顺序保存
    pub fn push_file(&mut self, attachment: FileAttachment) {
        match self
            .fields
            .iter_mut()
            .find(|field| field.name == attachment.field_name)
        {
            Some(field) => field.files.push(attachment),
            None => self.fields.push(FormField {
                name: attachment.field_name.clone(),
                files: vec![attachment],
            }),
        }
    }

    /// 表单中的附件总数
    pub fn file_count(&self) -> usize {
        self.fields.iter().map(|field| field.files.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.file_count() == 0
    }

    pub fn into_files(self) -> impl Iterator<Item = FileAttachment> {
        self.fields.into_iter().flat_map(|field| field.files)
    }
}

/// 表单字段，一个字段可以携带多个文件
#[derive(Debug)]
pub struct FormField {
    pub name: String,
    pub files: Vec<FileAttachment>,
}

/// 上传的单个文件
#[derive(Debug)]
pub struct FileAttachment {
    // 所属字段名
    pub field_name: String,
    // 客户端提供的文件名（已去除目录部分）
    pub file_name: String,
    // 客户端声明的 MIME 类型
    pub content_type: Option<String>,
    // 文件大小（字节）
    pub size: u64,
    pub body: AttachmentBody,
}

impl FileAttachment {
    /// 打开一个位于偏移 0 的读取句柄
    pub fn open(&self) -> io::Result<AttachmentReader<'_>> {
        match &self.body {
            AttachmentBody::Memory(bytes) => Ok(AttachmentReader::Memory(Cursor::new(bytes))),
            AttachmentBody::Spilled(file) => Ok(AttachmentReader::File(file.reopen()?)),
        }
    }

    pub fn is_spilled(&self) -> bool {
        matches!(self.body, AttachmentBody::Spilled(_))
    }
}

/// 附件内容：小文件保留在内存中，超出阈值的落盘到临时文件
///
/// 临时文件在附件被 drop 时删除。
#[derive(Debug)]
pub enum AttachmentBody {
    Memory(Vec<u8>),
    Spilled(NamedTempFile),
}

/// 附件的读取句柄
pub enum AttachmentReader<'a> {
    Memory(Cursor<&'a Vec<u8>>),
    File(std::fs::File),
}

impl Read for AttachmentReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            AttachmentReader::Memory(cursor) => cursor.read(buf),
            AttachmentReader::File(file) => file.read(buf),
        }
    }
}

impl Seek for AttachmentReader<'_> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            AttachmentReader::Memory(cursor) => cursor.seek(pos),
            AttachmentReader::File(file) => file.seek(pos),
        }
    }
}
