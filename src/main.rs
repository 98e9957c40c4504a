use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use human_panic::setup_panic;
use tracing::{debug, warn};

// 从 lib.rs 导入模块
use upload_drop::config::AppConfig;
use upload_drop::errors::UploaderError;
use upload_drop::routes;
use upload_drop::runtime::lifetime;

/// 启动阶段的致命错误，直接退出进程
fn exit_with(err: UploaderError) -> ! {
    #[cfg(debug_assertions)]
    eprintln!("{}", err.format_colored());
    #[cfg(not(debug_assertions))]
    eprintln!("{err}");
    std::process::exit(1);
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    // 记录程序启动时间
    let start_datetime = chrono::Utc::now();

    // 启动前预处理 //

    // 初始化配置
    setup_panic!();
    let config = AppConfig::load().unwrap_or_else(|e| exit_with(e.into()));

    // 初始化日志与上传服务
    let startup = lifetime::startup::prepare_server_startup(config).unwrap_or_else(|e| exit_with(e));
    let config = startup.config;
    let _log_guard = startup.log_guard;
    let upload_service = web::Data::new(startup.upload_service);

    // 打印信息
    warn!(
        "Upload service initialized
        Project: {}
        Version: {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    // 输出预处理时间
    debug!(
        "Pre-startup processing completed in {} ms",
        chrono::Utc::now()
            .signed_duration_since(start_datetime)
            .num_milliseconds()
    );

    // 预处理完成 //

    warn!("Using {} CPU cores for the server", config.server.workers);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(upload_service.clone())
            .configure(routes::configure_upload_routes) // 配置上传路由（任意路径）
    })
    .keep_alive(std::time::Duration::from_secs(
        config.server.timeouts.keep_alive,
    )) // 启用长连接
    .client_request_timeout(std::time::Duration::from_millis(
        config.server.timeouts.client_request,
    )) // 客户端超时
    .client_disconnect_timeout(std::time::Duration::from_millis(
        config.server.timeouts.client_disconnect,
    )) // 断连超时
    .workers(config.server.workers)
    .disable_signals(); // 由 listen_for_shutdown 统一处理信号

    let bind_address = config.server_bind_address();
    warn!("Starting server at http://{}", bind_address);
    let server = server.bind(&bind_address)?.run();

    tokio::select! {
        res = server => {
            res?;
        }
        res = lifetime::shutdown::listen_for_shutdown() => {
            res?;
        }
    }

    Ok(())
}
