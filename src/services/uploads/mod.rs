pub mod form;
pub mod persist;
pub mod upload;

use actix_multipart::Multipart;
use actix_web::{HttpResponse, Result as ActixResult};
use chrono::{DateTime, Local};
use std::path::Path;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::uploads::entities::UploadForm;
use crate::models::uploads::responses::UploadOutcome;
use crate::storage::LocalStorage;

/// 上传服务，持有启动时解析好的输出目录与内存阈值
#[derive(Debug, Clone)]
pub struct UploadService {
    storage: LocalStorage,
    max_memory: usize,
}

impl UploadService {
    pub fn new(storage: LocalStorage, max_memory: usize) -> Self {
        Self {
            storage,
            max_memory,
        }
    }

    pub fn from_config(config: &AppConfig, cwd: &Path) -> Self {
        Self::new(
            LocalStorage::new(config.output_dir(cwd)),
            config.server.limits.max_memory,
        )
    }

    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    // Collect multipart form
    pub async fn collect_form(&self, payload: Multipart) -> Result<UploadForm> {
        form::collect_form(payload, self.max_memory).await
    }

    /// 依次写入表单中的所有附件（阻塞 I/O）
    ///
    /// 单个附件失败不影响同一字段中的其他附件。
    pub fn persist_form(&self, form: UploadForm) -> UploadOutcome {
        self.persist_form_with_clock(form, Local::now)
    }

    pub(crate) fn persist_form_with_clock<F>(&self, form: UploadForm, clock: F) -> UploadOutcome
    where
        F: Fn() -> DateTime<Local>,
    {
        let mut outcome = UploadOutcome::default();
        for attachment in form.into_files() {
            match persist::persist_attachment_with_clock(&self.storage, &attachment, &clock) {
                Ok(stored) => outcome.persisted.push(stored),
                Err(failed) => outcome.failed.push(failed),
            }
        }
        outcome
    }

    // Receive a request body and persist every attachment
    pub async fn receive(&self, payload: Multipart) -> UploadOutcome {
        upload::receive(self, payload).await
    }

    // Handle upload request
    pub async fn handle_upload(&self, payload: Multipart) -> ActixResult<HttpResponse> {
        upload::handle_upload(self, payload).await
    }
}
