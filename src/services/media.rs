use std::path::{Component, Path, PathBuf};
use uuid::Uuid;

use crate::config::{Config, StorageConfig};
use crate::error::AppError;
use crate::extract::UploadedFile;
use crate::services::s3::S3Service;
use crate::utils::images::CheckedImage;

/// Where uploaded logos and screen images live.
#[derive(Clone)]
pub enum MediaStore {
    Local(LocalStore),
    S3(S3Service),
}

/// Uploads kept in a directory on disk and served by the API under `/storage`.
#[derive(Clone, Debug)]
pub struct LocalStore {
    root: PathBuf,
    public_base: String,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base, key)
    }

    fn key_from_url(&self, stored: &str) -> Option<String> {
        if let Some(key) = stored.strip_prefix(&format!("{}/", self.public_base)) {
            return Some(key.to_string());
        }
        // Bare relative paths such as `screens/abc.png`.
        if !stored.contains("://") {
            return Some(stored.trim_start_matches('/').to_string());
        }
        let parsed = url::Url::parse(stored).ok()?;
        parsed
            .path()
            .split_once("/storage/")
            .map(|(_, key)| key.to_string())
    }

    async fn put(&self, key: &str, data: &[u8]) -> Result<(), AppError> {
        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to create {}: {}", parent.display(), e)))?;
        }
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to write {}: {}", path.display(), e)))
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        let path = self.root.join(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!("Failed to delete {}: {}", path.display(), e))),
        }
    }
}

/// Keys must stay inside the store: relative, no `..`.
fn is_safe_key(key: &str) -> bool {
    !key.is_empty()
        && Path::new(key)
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}

impl MediaStore {
    pub async fn from_config(config: &Config) -> Result<Self, AppError> {
        match &config.storage {
            StorageConfig::Local { root } => {
                tokio::fs::create_dir_all(root).await.map_err(|e| {
                    AppError::Storage(format!("Failed to create {}: {}", root.display(), e))
                })?;
                Ok(MediaStore::Local(LocalStore::new(
                    root.clone(),
                    format!("{}/storage", config.public_url),
                )))
            }
            StorageConfig::S3(s3_config) => {
                let s3 = S3Service::new(s3_config).await;
                s3.ensure_bucket_exists().await?;
                Ok(MediaStore::S3(s3))
            }
        }
    }

    pub fn local_root(&self) -> Option<&Path> {
        match self {
            MediaStore::Local(local) => Some(local.root()),
            MediaStore::S3(_) => None,
        }
    }

    /// Stores an already inspected image under `folder` and returns its public URL.
    pub async fn store(
        &self,
        folder: &str,
        file: &UploadedFile,
        image: CheckedImage,
    ) -> Result<String, AppError> {
        let key = format!("{}/{}.{}", folder, Uuid::new_v4(), image.extension);

        let url = match self {
            MediaStore::Local(local) => {
                local.put(&key, &file.data).await?;
                local.url(&key)
            }
            MediaStore::S3(s3) => {
                s3.put_object(&key, file.data.to_vec(), image.mime_type).await?;
                s3.object_url(&key)
            }
        };

        tracing::info!(%key, original = %file.file_name, size = file.data.len(), "stored upload");
        Ok(url)
    }

    pub async fn remove(&self, stored: &str) -> Result<(), AppError> {
        let key = match self {
            MediaStore::Local(local) => local.key_from_url(stored),
            MediaStore::S3(s3) => s3.key_from_url(stored),
        }
        .filter(|key| is_safe_key(key))
        .ok_or_else(|| AppError::Storage(format!("Cannot resolve stored file {}", stored)))?;

        match self {
            MediaStore::Local(local) => local.delete(&key).await,
            MediaStore::S3(s3) => s3.delete_object(&key).await,
        }
    }

    /// Best effort: failures are logged, never returned.
    pub async fn remove_all<I, S>(&self, stored: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for item in stored {
            if let Err(e) = self.remove(item.as_ref()).await {
                tracing::warn!(file = item.as_ref(), error = %e, "failed to remove stored file");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_urls_map_back_to_keys() {
        let store = LocalStore::new("/tmp/catalog", "http://localhost:3000/storage/");
        let url = store.url("screens/a.png");

        assert_eq!(url, "http://localhost:3000/storage/screens/a.png");
        assert_eq!(store.key_from_url(&url).as_deref(), Some("screens/a.png"));
        assert_eq!(store.key_from_url("screens/b.png").as_deref(), Some("screens/b.png"));
        assert_eq!(
            store.key_from_url("https://old-host.example.com/storage/logos/c.gif").as_deref(),
            Some("logos/c.gif")
        );
        assert_eq!(store.key_from_url("https://cdn.example.com/elsewhere.png"), None);
    }

    #[test]
    fn keys_cannot_escape_the_store() {
        assert!(is_safe_key("screens/a.png"));
        assert!(!is_safe_key("../etc/passwd"));
        assert!(!is_safe_key("/etc/passwd"));
        assert!(!is_safe_key(""));
    }
}
