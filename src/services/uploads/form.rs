//! multipart 表单收集
//!
//! 普通字段与保存在内存中的文件共享 `max_memory` 预算，超出剩余预算的文件落盘到临时文件。

use actix_multipart::Multipart;
use futures_util::TryStreamExt;
use std::io::{self, Write};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::errors::{Result, UploaderError};
use crate::models::uploads::entities::{AttachmentBody, FileAttachment, UploadForm};
use crate::utils::sanitize_client_file_name;

/// 普通字段在 `max_memory` 之外额外允许的字节数
pub const VALUE_ALLOWANCE: usize = 10 << 20;

/// 读取整个表单，任何解析错误都会丢弃整个表单
pub async fn collect_form(mut payload: Multipart, max_memory: usize) -> Result<UploadForm> {
    let mut form = UploadForm::default();
    let mut memory_left = max_memory;
    let mut value_bytes_left = max_memory.saturating_add(VALUE_ALLOWANCE);

    while let Some(mut field) = payload.try_next().await? {
        let content_disposition = field.content_disposition();
        let name = content_disposition
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();
        let raw_file_name = content_disposition
            .and_then(|cd| {
                cd.get_filename().map(str::to_string).or_else(|| {
                    cd.get_filename_ext()
                        .map(|ext| String::from_utf8_lossy(&ext.value).into_owned())
                })
            })
            .unwrap_or_default();
        let content_type = field.content_type().map(|ct| ct.to_string());

        if name.is_empty() {
            continue;
        }

        // 没有文件名的分段按普通字段处理
        if raw_file_name.is_empty() {
            while let Some(chunk) = field.try_next().await? {
                if chunk.len() > value_bytes_left {
                    return Err(UploaderError::payload_too_large(format!(
                        "form values exceed {} bytes",
                        max_memory.saturating_add(VALUE_ALLOWANCE)
                    )));
                }
                value_bytes_left -= chunk.len();
            }
            continue;
        }

        let mut spool = Spool::new(memory_left);
        while let Some(chunk) = field.try_next().await? {
            spool.write_chunk(&chunk)?;
        }
        let size = spool.size;
        let body = spool.finish()?;
        // 保留在内存中的文件同时占用文件预算与普通字段预算
        if let AttachmentBody::Memory(bytes) = &body {
            memory_left -= bytes.len();
            value_bytes_left = value_bytes_left.saturating_sub(bytes.len());
        }

        let file_name = sanitize_client_file_name(&raw_file_name);
        debug!(
            "Received file '{}' in field '{}' ({} bytes, type: {}, spilled: {})",
            file_name,
            name,
            size,
            content_type.as_deref().unwrap_or("unknown"),
            matches!(body, AttachmentBody::Spilled(_))
        );

        form.push_file(FileAttachment {
            field_name: name,
            file_name,
            content_type,
            size,
            body,
        });
    }

    Ok(form)
}

/// 单个文件的缓冲区，超出上限后整体转存到临时文件
struct Spool {
    limit: usize,
    memory: Vec<u8>,
    file: Option<NamedTempFile>,
    size: u64,
}

impl Spool {
    fn new(limit: usize) -> Self {
        Self {
            limit,
            memory: Vec::new(),
            file: None,
            size: 0,
        }
    }

    fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.size += chunk.len() as u64;

        if let Some(file) = self.file.as_mut() {
            return file.write_all(chunk);
        }

        if self.memory.len() + chunk.len() <= self.limit {
            self.memory.extend_from_slice(chunk);
            return Ok(());
        }

        let mut file = NamedTempFile::new()?;
        file.write_all(&self.memory)?;
        file.write_all(chunk)?;
        self.memory = Vec::new();
        self.file = Some(file);
        Ok(())
    }

    fn finish(self) -> io::Result<AttachmentBody> {
        match self.file {
            Some(mut file) => {
                file.flush()?;
                Ok(AttachmentBody::Spilled(file))
            }
            None => Ok(AttachmentBody::Memory(self.memory)),
        }
    }
}
