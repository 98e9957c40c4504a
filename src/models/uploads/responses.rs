use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

use crate::errors::UploaderError;

/// 成功写入磁盘的文件
#[derive(Debug, Clone, Serialize)]
pub struct PersistedFile {
    /// 所属字段名
    pub field_name: String,
    /// 生成的文件名
    pub file_name: String,
    /// 完整路径
    pub path: PathBuf,
    /// 内容 MD5（小写十六进制）
    pub checksum: String,
    /// 写入字节数
    pub size: u64,
    /// 生成文件名时捕获的时间
    pub captured_at: chrono::DateTime<chrono::Local>,
}

/// 附件处理失败的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Open,
    Checksum,
    Rewind,
    Create,
    Write,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            FailureStage::Open => "open",
            FailureStage::Checksum => "checksum",
            FailureStage::Rewind => "rewind",
            FailureStage::Create => "create",
            FailureStage::Write => "write",
        };
        f.write_str(stage)
    }
}

/// 处理失败的附件
#[derive(Debug, Clone, Serialize)]
pub struct FailedAttachment {
    pub field_name: String,
    /// 客户端提供的原始文件名
    pub file_name: String,
    pub stage: FailureStage,
    pub code: &'static str,
    pub error: String,
}

impl FailedAttachment {
    pub fn new(
        field_name: impl Into<String>,
        file_name: impl Into<String>,
        stage: FailureStage,
        error: &UploaderError,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            file_name: file_name.into(),
            stage,
            code: error.code(),
            error: error.message().to_string(),
        }
    }
}

/// 单次请求的处理结果
///
/// HTTP 层目前始终返回 200，结果仅用于日志，后续可据此区分状态码。
#[derive(Debug, Clone, Default, Serialize)]
pub struct UploadOutcome {
    pub persisted: Vec<PersistedFile>,
    pub failed: Vec<FailedAttachment>,
}

impl UploadOutcome {
    pub fn is_empty(&self) -> bool {
        self.persisted.is_empty() && self.failed.is_empty()
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }
}
