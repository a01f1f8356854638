//! 作业文件存储
//!
//! 只负责“保存字节、返回路径”和“删除路径”，不关心数据库。

use std::path::{Component, Path, PathBuf};

use crate::errors::{ElearningError, Result};

#[async_trait::async_trait]
pub trait ArtifactStore: Send + Sync {
    /// 保存到 `{category}/{file_name}`，返回相对路径
    async fn save(&self, category: &str, file_name: &str, bytes: &[u8]) -> Result<String>;
    /// 删除先前保存的相对路径
    async fn remove(&self, relative_path: &str) -> Result<()>;
    /// 读取相对路径，不存在时返回 None
    async fn read(&self, relative_path: &str) -> Result<Option<Vec<u8>>>;
}

/// 本地磁盘实现
#[derive(Debug, Clone)]
pub struct LocalArtifactStore {
    root: PathBuf,
}

impl LocalArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    // 只接受普通路径片段，拒绝 `..`、绝对路径等
    fn resolve(&self, relative_path: &str) -> Result<PathBuf> {
        let relative = Path::new(relative_path);
        let is_plain = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if relative_path.is_empty() || !is_plain {
            return Err(ElearningError::validation(format!(
                "Invalid artifact path: {relative_path}"
            )));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait::async_trait]
impl ArtifactStore for LocalArtifactStore {
    async fn save(&self, category: &str, file_name: &str, bytes: &[u8]) -> Result<String> {
        let relative = format!("{category}/{file_name}");
        let path = self.resolve(&relative)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                ElearningError::file_operation(format!("创建上传目录失败: {e}"))
            })?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| ElearningError::file_operation(format!("保存文件失败: {e}")))?;
        Ok(relative)
    }

    async fn remove(&self, relative_path: &str) -> Result<()> {
        let path = self.resolve(relative_path)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| ElearningError::file_operation(format!("删除文件失败: {e}")))
    }

    async fn read(&self, relative_path: &str) -> Result<Option<Vec<u8>>> {
        let path = self.resolve(relative_path)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ElearningError::file_operation(format!("读取文件失败: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_read_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalArtifactStore::new(dir.path());

        let path = store
            .save("assignment_submissions", "a.txt", b"hello")
            .await
            .unwrap();
        assert_eq!(path, "assignment_submissions/a.txt");
        assert_eq!(store.read(&path).await.unwrap(), Some(b"hello".to_vec()));

        store.remove(&path).await.unwrap();
        assert_eq!(store.read(&path).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalArtifactStore::new(dir.path());

        assert!(store.read("../etc/passwd").await.is_err());
        assert!(store.read("/etc/passwd").await.is_err());
        assert!(store.save("..", "x.txt", b"x").await.is_err());
    }
}
