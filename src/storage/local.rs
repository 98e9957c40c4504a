use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::errors::Result;

/// 本地输出目录
///
/// 目录由启动流程解析为绝对路径，这里不负责创建。
#[derive(Debug, Clone)]
pub struct LocalStorage {
    dir: PathBuf,
}

impl LocalStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 将生成的文件名拼接到输出目录
    pub fn resolve(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// 以独占方式创建文件，目标已存在时失败，不会覆盖
    pub fn create_new(&self, file_name: &str) -> Result<(PathBuf, File)> {
        let path = self.resolve(file_name);

        let mut options = OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o666);
        }

        let file = options.open(&path)?;
        Ok((path, file))
    }
}
