use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use std::path::{Path, PathBuf};

use super::AppConfig;

/// 内存中保留的表单数据上限 (10 MiB)
pub const DEFAULT_MAX_MEMORY: i64 = 10 << 20;

impl AppConfig {
    /// 加载配置
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            // 首先加载默认配置文件
            .add_source(File::with_name("config").required(false))
            // 然后根据环境加载特定配置文件
            .add_source(
                File::with_name(&format!(
                    "config.{}",
                    std::env::var("APP_ENV").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            // 最后加载环境变量覆盖
            .add_source(
                Environment::with_prefix("UPLOADER")
                    .separator("_")
                    .try_parsing(true),
            );

        // 支持从环境变量加载
        let builder = builder
            .set_override_option("app.environment", std::env::var("APP_ENV").ok())?
            .set_override_option("app.log_level", std::env::var("RUST_LOG").ok())?
            .set_override_option("app.log_file", std::env::var("LOG_FILE").ok())?
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .set_override_option("server.workers", std::env::var("CPU_COUNT").ok())?
            .set_override_option("upload.dir", std::env::var("OUTPUT_DIR").ok())?;

        Self::load_from(builder)
    }

    /// 在内置默认值之上构建配置
    pub fn load_from(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config = builder
            .set_default("app.environment", "development")?
            .set_default("app.log_level", "info")?
            .set_default("app.log_file", "")?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 80_i64)?
            .set_default("server.workers", 0_i64)?
            .set_default("server.max_workers", 16_i64)?
            .set_default("server.timeouts.client_request", 5000_i64)?
            .set_default("server.timeouts.client_disconnect", 1000_i64)?
            .set_default("server.timeouts.keep_alive", 75_i64)?
            .set_default("server.limits.max_memory", DEFAULT_MAX_MEMORY)?
            .set_default("upload.dir", "")?
            .build()?;

        let mut app_config: AppConfig = config.try_deserialize()?;

        // 处理工作线程数
        if app_config.server.workers == 0 {
            app_config.server.workers = num_cpus::get().min(app_config.server.max_workers);
        }

        Ok(app_config)
    }

    /// 检查是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app.environment == "production"
    }

    /// 检查是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app.environment == "development"
    }

    /// 获取服务器绑定地址
    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 解析输出目录 (相对路径基于 `cwd`)
    pub fn output_dir(&self, cwd: &Path) -> PathBuf {
        if self.upload.dir.is_empty() {
            cwd.to_path_buf()
        } else {
            cwd.join(&self.upload.dir)
        }
    }

    /// 解析日志文件路径，未配置时返回 None
    pub fn log_file_path(&self, cwd: &Path) -> Option<PathBuf> {
        if self.app.log_file.is_empty() {
            None
        } else {
            Some(cwd.join(&self.app.log_file))
        }
    }
}
