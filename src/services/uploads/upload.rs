use actix_multipart::Multipart;
use actix_web::{HttpResponse, Result as ActixResult, web};
use tracing::{debug, error, info, warn};

use super::UploadService;
use crate::errors::UploaderError;
use crate::models::uploads::responses::UploadOutcome;

/// 解析表单并写入所有附件
///
/// 表单缺失或无法解析时不写入任何文件，返回空结果。
pub async fn receive(service: &UploadService, payload: Multipart) -> UploadOutcome {
    let form = match service.collect_form(payload).await {
        Ok(form) => form,
        Err(e @ UploaderError::NotMultipart(_)) => {
            debug!("Ignoring request without multipart body: {}", e);
            return UploadOutcome::default();
        }
        Err(e) => {
            warn!("Discarding upload form: {}", e);
            return UploadOutcome::default();
        }
    };

    // 检查是否有文件
    if form.is_empty() {
        debug!("Multipart form carries no files");
        return UploadOutcome::default();
    }

    // 文件 I/O 均为阻塞操作，放到阻塞线程池中执行
    let worker = service.clone();
    match web::block(move || worker.persist_form(form)).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Upload worker failed: {}", e);
            UploadOutcome::default()
        }
    }
}

/// 处理上传请求，无论结果如何都返回不带响应体的 200
pub async fn handle_upload(
    service: &UploadService,
    payload: Multipart,
) -> ActixResult<HttpResponse> {
    let outcome = receive(service, payload).await;

    if !outcome.is_empty() {
        info!(
            "Upload finished: {} stored, {} failed",
            outcome.persisted.len(),
            outcome.failed.len()
        );
    }
    if !outcome.is_complete_success() {
        match serde_json::to_string(&outcome.failed) {
            Ok(failed) => debug!("Failed attachments: {}", failed),
            Err(e) => debug!("Failed to serialize upload outcome: {}", e),
        }
    }

    Ok(HttpResponse::Ok().finish())
}
