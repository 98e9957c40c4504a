use std::fs::OpenOptions;
use std::path::Path;
use tracing::{debug, warn};
use tracing_appender::non_blocking::WorkerGuard;

use crate::config::AppConfig;
use crate::errors::{Result, UploaderError};
use crate::services::UploadService;

pub struct StartupContext {
    pub config: AppConfig,
    pub upload_service: UploadService,
    // 必须在整个进程生命周期内持有，否则缓冲中的日志会丢失
    pub log_guard: WorkerGuard,
}

/// 初始化日志
///
/// 配置了日志文件时以追加方式写入文件，否则写到 stderr。
pub fn init_tracing(config: &AppConfig, cwd: &Path) -> Result<WorkerGuard> {
    let log_file = config.log_file_path(cwd);
    let ansi = log_file.is_none();

    let (non_blocking_writer, guard) = match &log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .append(true)
                .create(true)
                .open(path)
                .map_err(|e| {
                    UploaderError::logging(format!(
                        "cannot open log file {}: {e}",
                        path.display()
                    ))
                })?;
            tracing_appender::non_blocking(file)
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    let filter = tracing_subscriber::EnvFilter::new(&config.app.log_level);
    let tracing_format = tracing_subscriber::fmt::format()
        .with_level(true)
        .with_ansi(ansi);

    let tracing_builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking_writer)
        .event_format(tracing_format);

    let installed = if config.is_development() {
        tracing_builder
            .with_file(true)
            .with_line_number(true)
            .try_init()
    } else {
        tracing_builder.json().try_init()
    };
    installed.map_err(|e| UploaderError::logging(e.to_string()))?;

    Ok(guard)
}

/// 准备服务器启动的上下文
/// 包括日志、输出目录和上传服务
pub fn prepare_server_startup(config: AppConfig) -> Result<StartupContext> {
    let cwd = std::env::current_dir()
        .map_err(|e| UploaderError::config(format!("cannot read working directory: {e}")))?;

    let log_guard = init_tracing(&config, &cwd)?;

    let upload_service = UploadService::from_config(&config, &cwd);
    let output_dir = upload_service.storage().dir();
    if output_dir.is_dir() {
        warn!("Writing uploads to {}", output_dir.display());
    } else {
        warn!(
            "Output directory {} does not exist, uploads will fail until it is created",
            output_dir.display()
        );
    }
    debug!(
        "Form data above {} bytes per request is spilled to {}",
        config.server.limits.max_memory,
        std::env::temp_dir().display()
    );

    Ok(StartupContext {
        config,
        upload_service,
        log_guard,
    })
}
