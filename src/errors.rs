//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_uploader_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum UploaderError {
            $($variant(String),)*
        }

        impl UploaderError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(UploaderError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(UploaderError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(UploaderError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl UploaderError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        UploaderError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_uploader_errors! {
    Config("E001", "Configuration Error"),
    Logging("E002", "Logging Setup Error"),
    Multipart("E003", "Multipart Parse Error"),
    PayloadTooLarge("E004", "Payload Too Large"),
    FileOperation("E005", "File Operation Error"),
    DestinationExists("E006", "Destination Exists"),
    NotMultipart("E007", "Not A Multipart Request"),
}

impl UploaderError {
    /// 格式化为彩色输出（用于开发环境）
    #[cfg(debug_assertions)]
    pub fn format_colored(&self) -> String {
        format!(
            "\x1b[1;31m[ERROR]\x1b[0m \x1b[33m{}\x1b[0m \x1b[31m{}\x1b[0m\n  {}",
            self.code(),
            self.error_type(),
            self.message()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for UploaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for UploaderError {}

// 为常见的错误类型实现 From trait
impl From<std::io::Error> for UploaderError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::AlreadyExists => UploaderError::DestinationExists(err.to_string()),
            _ => UploaderError::FileOperation(err.to_string()),
        }
    }
}

impl From<config::ConfigError> for UploaderError {
    fn from(err: config::ConfigError) -> Self {
        UploaderError::Config(err.to_string())
    }
}

impl From<actix_multipart::MultipartError> for UploaderError {
    fn from(err: actix_multipart::MultipartError) -> Self {
        use actix_multipart::MultipartError;

        match err {
            MultipartError::ContentTypeMissing | MultipartError::ContentTypeIncompatible => {
                UploaderError::NotMultipart(err.to_string())
            }
            _ => UploaderError::Multipart(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, UploaderError>;
