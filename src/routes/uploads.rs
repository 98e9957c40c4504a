use actix_multipart::Multipart;
use actix_web::{HttpResponse, Result as ActixResult, web};

use crate::services::UploadService;

pub async fn handle_upload(
    service: web::Data<UploadService>,
    payload: Multipart,
) -> ActixResult<HttpResponse> {
    service.handle_upload(payload).await
}

// 配置路由
pub fn configure_upload_routes(cfg: &mut web::ServiceConfig) {
    // 任意路径、任意方法都按上传请求处理
    cfg.route("/{tail:.*}", web::route().to(handle_upload));
}
