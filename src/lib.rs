//! upload-drop - 单端点文件上传服务
//!
//! 基于 Actix Web 构建：接收 multipart 表单，按内容 MD5 与时间戳为每个文件生成
//! 不可冲突的文件名，并以独占创建的方式写入输出目录。
//!
//! # 架构
//! - `config`: 配置管理
//! - `errors`: 统一错误处理
//! - `models`: 表单与处理结果
//! - `routes`: API 路由层
//! - `runtime`: 运行时生命周期管理
//! - `services`: 业务逻辑层
//! - `storage`: 本地输出目录
//! - `utils`: 工具函数

pub mod config;
pub mod errors;
pub mod models;
pub mod routes;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;
