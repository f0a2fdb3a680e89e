use super::{generate_image_id, ImageStorage, RequestOrigin};
use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 本地文件存储实现
/// 引用为生成的文件名，URL在读取时按请求来源拼接
pub struct LocalImageStorage {
    base_path: PathBuf,
}

impl LocalImageStorage {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// 构建完整文件路径，只取引用的文件名部分
    fn build_path(&self, reference: &str) -> PathBuf {
        let file_name = Path::new(reference)
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| reference.into());
        self.base_path.join(file_name)
    }
}

#[async_trait]
impl ImageStorage for LocalImageStorage {
    async fn store(&self, content: &[u8], original_filename: &str) -> Result<String> {
        let extension = Path::new(original_filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext.to_lowercase()))
            .unwrap_or_default();
        let filename = format!("{}{}", generate_image_id(), extension);

        fs::create_dir_all(&self.base_path).await?;
        fs::write(self.build_path(&filename), content).await?;

        Ok(filename)
    }

    async fn delete(&self, reference: &str) -> Result<()> {
        let full_path = self.build_path(reference);
        if full_path.exists() {
            fs::remove_file(&full_path).await?;
        }
        Ok(())
    }

    fn resolve_url(&self, reference: &str, origin: &RequestOrigin) -> String {
        // 已经是完整URL的引用原样返回，便于存储后端迁移后旧记录仍可用
        if reference.starts_with("http://") || reference.starts_with("https://") {
            return reference.to_string();
        }
        format!("{}/schoolImages/{}", origin.base_url(), reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_store_writes_named_file() {
        let dir = TempDir::new().unwrap();
        let storage = LocalImageStorage::new(dir.path().to_path_buf());

        let reference = storage.store(b"image-bytes", "photo.JPG").await.unwrap();

        assert!(reference.starts_with("school-"));
        assert!(reference.ends_with(".jpg"));
        let written = std::fs::read(dir.path().join(&reference)).unwrap();
        assert_eq!(written, b"image-bytes");
    }

    #[tokio::test]
    async fn test_store_without_extension() {
        let dir = TempDir::new().unwrap();
        let storage = LocalImageStorage::new(dir.path().to_path_buf());

        let reference = storage.store(b"raw", "upload").await.unwrap();
        assert!(!reference.contains('.'));
        assert!(dir.path().join(&reference).exists());
    }

    #[tokio::test]
    async fn test_delete_removes_file() {
        let dir = TempDir::new().unwrap();
        let storage = LocalImageStorage::new(dir.path().to_path_buf());

        let reference = storage.store(b"bytes", "a.png").await.unwrap();
        storage.delete(&reference).await.unwrap();
        assert!(!dir.path().join(&reference).exists());
    }

    #[tokio::test]
    async fn test_delete_missing_file_is_ok() {
        let dir = TempDir::new().unwrap();
        let storage = LocalImageStorage::new(dir.path().to_path_buf());

        assert!(storage.delete("school-0-0.png").await.is_ok());
    }

    #[test]
    fn test_resolve_url() {
        let storage = LocalImageStorage::new(PathBuf::from("schoolImages"));
        let origin = RequestOrigin::new("http://localhost:5000");

        assert_eq!(
            storage.resolve_url("school-1-1.jpg", &origin),
            "http://localhost:5000/schoolImages/school-1-1.jpg"
        );
        // 完整URL透传
        assert_eq!(
            storage.resolve_url("https://cdn.example.com/x.jpg", &origin),
            "https://cdn.example.com/x.jpg"
        );
    }

    #[test]
    fn test_build_path_ignores_directory_components() {
        let storage = LocalImageStorage::new(PathBuf::from("/srv/images"));
        assert_eq!(
            storage.build_path("../../etc/passwd"),
            PathBuf::from("/srv/images/passwd")
        );
    }
}
