//! 模板存在性检查

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::PathBuf;

/// 资源存储
///
/// 只读；调用方的身份上下文由实现自行携带。
pub trait ResourceResolver: Send + Sync {
    /// 路径对应的资源是否存在
    fn exists(&self, path: &str) -> Result<bool>;
}

/// 基于本地目录的资源存储
///
/// 仓库路径 `/content/dam/x.xdp` 映射到 `<root>/content/dam/x.xdp`。
pub struct FsResourceResolver {
    root: PathBuf,
}

impl FsResourceResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn local_path(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

impl ResourceResolver for FsResourceResolver {
    fn exists(&self, path: &str) -> Result<bool> {
        let local = self.local_path(path);
        local
            .try_exists()
            .with_context(|| format!("无法检查资源: {}", local.display()))
    }
}

/// 内存中的资源存储
#[derive(Debug, Default, Clone)]
pub struct MemoryResourceResolver {
    paths: HashSet<String>,
}

impl MemoryResourceResolver {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }
}

impl ResourceResolver for MemoryResourceResolver {
    fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.paths.contains(path))
    }
}
