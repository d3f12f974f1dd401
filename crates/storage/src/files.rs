//! Tenant media library.
//!
//! Every object key is `{tenant_id}/{uuid}.{ext}`. The tenant prefix is the
//! authorization boundary: list is scoped to it and delete rejects keys that
//! do not carry it.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::error;
use uuid::Uuid;

use campzap_core::config::StorageConfig;
use campzap_core::error::{DashboardError, DashboardResult};
use campzap_core::types::MessageType;

use crate::bucket::ObjectStore;

/// Display category of a stored file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Video,
    Audio,
    Document,
    /// Unrecognized extension with no campaign hint.
    File,
}

impl FileKind {
    /// Classify by file extension alone.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "webp" | "bmp" | "svg" => FileKind::Image,
            "mp4" | "avi" | "mov" | "wmv" | "webm" | "mkv" => FileKind::Video,
            "mp3" | "wav" | "ogg" | "m4a" | "aac" | "opus" => FileKind::Audio,
            "pdf" | "doc" | "docx" | "xls" | "xlsx" | "ppt" | "pptx" | "txt" | "csv" => {
                FileKind::Document
            }
            _ => FileKind::File,
        }
    }

    /// Campaign message types map directly onto file kinds; `Text` campaigns
    /// carry no media, so it falls through to the generic kind.
    pub fn from_message_type(message_type: MessageType) -> Self {
        match message_type {
            MessageType::Image => FileKind::Image,
            MessageType::Video => FileKind::Video,
            MessageType::Audio => FileKind::Audio,
            MessageType::Document => FileKind::Document,
            MessageType::Text => FileKind::File,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageFile {
    pub key: String,
    pub name: String,
    pub url: String,
    pub kind: FileKind,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresignedUpload {
    pub url: String,
    pub key: String,
    pub expires_at: DateTime<Utc>,
}

pub struct MediaLibrary {
    bucket: Arc<dyn ObjectStore>,
    config: StorageConfig,
}

impl MediaLibrary {
    pub fn new(bucket: Arc<dyn ObjectStore>, config: StorageConfig) -> Self {
        Self { bucket, config }
    }

    /// Lists a tenant's media, newest first. Zero-byte objects (folder
    /// placeholders) are skipped. `type_hints` maps keys to the kind recorded
    /// on the campaign that uses the object, which wins over the extension.
    ///
    /// Fail-soft: a listing failure is logged and returns an empty library.
    pub async fn list_files(
        &self,
        tenant_id: Uuid,
        type_hints: &HashMap<String, FileKind>,
    ) -> Vec<StorageFile> {
        let prefix = format!("{tenant_id}/");
        let objects = match self.bucket.list(&prefix).await {
            Ok(objects) => objects,
            Err(e) => {
                error!(tenant_id = %tenant_id, error = %e, "Error listing media files");
                return Vec::new();
            }
        };

        let mut files: Vec<StorageFile> = objects
            .into_iter()
            .filter(|o| o.size > 0)
            .map(|o| {
                let name = o
                    .key
                    .rsplit('/')
                    .next()
                    .unwrap_or(o.key.as_str())
                    .to_string();
                let kind = type_hints.get(&o.key).copied().unwrap_or_else(|| {
                    let ext = name.rsplit('.').next().unwrap_or_default();
                    FileKind::from_extension(ext)
                });
                StorageFile {
                    url: format!("https://{}/{}", self.config.public_domain, o.key),
                    key: o.key,
                    name,
                    kind,
                    size: o.size,
                    last_modified: o.last_modified,
                }
            })
            .collect();

        files.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
        files
    }

    /// Deletes an object after checking that the key sits under the tenant's
    /// prefix.
    pub async fn delete_file(&self, tenant_id: Uuid, key: &str) -> DashboardResult<()> {
        if !key.starts_with(&format!("{tenant_id}/")) {
            return Err(DashboardError::Unauthorized);
        }
        self.bucket.delete(key).await
    }

    /// Signed upload URL for a fresh object key under the tenant prefix.
    /// The signature covers key, content type and expiry, so none of them can
    /// be swapped after issuance.
    pub fn presign_upload(
        &self,
        tenant_id: Uuid,
        file_name: &str,
        content_type: &str,
    ) -> PresignedUpload {
        let ext = file_name
            .rsplit('.')
            .next()
            .filter(|e| !e.is_empty() && *e != file_name)
            .unwrap_or("bin");
        let key = format!("{tenant_id}/{}.{ext}", Uuid::new_v4());
        let expires_at = Utc::now() + Duration::seconds(self.config.presign_ttl_secs as i64);

        let mut hasher = Sha256::new();
        hasher.update(self.config.signing_secret.as_bytes());
        hasher.update(b"|");
        hasher.update(key.as_bytes());
        hasher.update(b"|");
        hasher.update(content_type.as_bytes());
        hasher.update(b"|");
        hasher.update(expires_at.timestamp().to_string().as_bytes());
        let signature = hex::encode(hasher.finalize());

        PresignedUpload {
            url: format!(
                "https://{}/{}?expires={}&signature={}",
                self.config.public_domain,
                key,
                expires_at.timestamp(),
                signature
            ),
            key,
            expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::MemoryBucket;

    fn library() -> (Arc<MemoryBucket>, MediaLibrary) {
        let bucket = Arc::new(MemoryBucket::new());
        let library = MediaLibrary::new(bucket.clone(), StorageConfig::default());
        (bucket, library)
    }

    #[test]
    fn test_classification_by_extension() {
        assert_eq!(FileKind::from_extension("PNG"), FileKind::Image);
        assert_eq!(FileKind::from_extension("mp4"), FileKind::Video);
        assert_eq!(FileKind::from_extension("opus"), FileKind::Audio);
        assert_eq!(FileKind::from_extension("pdf"), FileKind::Document);
        assert_eq!(FileKind::from_extension("zip"), FileKind::File);
    }

    #[tokio::test]
    async fn test_list_scopes_to_tenant_and_skips_placeholders() {
        let (bucket, library) = library();
        let tenant = Uuid::new_v4();
        let other = Uuid::new_v4();
        bucket
            .put(&format!("{tenant}/a.png"), None, vec![1])
            .await
            .unwrap();
        bucket
            .put(&format!("{tenant}/folder/"), None, vec![])
            .await
            .unwrap();
        bucket
            .put(&format!("{other}/b.png"), None, vec![1])
            .await
            .unwrap();

        let files = library.list_files(tenant, &HashMap::new()).await;
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "a.png");
        assert_eq!(files[0].kind, FileKind::Image);
        assert!(files[0].url.contains(&tenant.to_string()));
    }

    #[tokio::test]
    async fn test_type_hint_wins_over_extension() {
        let (bucket, library) = library();
        let tenant = Uuid::new_v4();
        let key = format!("{tenant}/clip.bin");
        bucket.put(&key, None, vec![1]).await.unwrap();

        let mut hints = HashMap::new();
        hints.insert(key, FileKind::Video);
        let files = library.list_files(tenant, &hints).await;
        assert_eq!(files[0].kind, FileKind::Video);
    }

    #[tokio::test]
    async fn test_delete_rejects_foreign_prefix() {
        let (bucket, library) = library();
        let tenant = Uuid::new_v4();
        let other = Uuid::new_v4();
        let foreign_key = format!("{other}/a.png");
        bucket.put(&foreign_key, None, vec![1]).await.unwrap();

        let result = library.delete_file(tenant, &foreign_key).await;
        assert!(matches!(result, Err(DashboardError::Unauthorized)));
        assert_eq!(bucket.list(&foreign_key).await.unwrap().len(), 1);
    }

    #[test]
    fn test_presign_shape() {
        let (_, library) = library();
        let tenant = Uuid::new_v4();
        let upload = library.presign_upload(tenant, "photo.JPG", "image/jpeg");

        assert!(upload.key.starts_with(&format!("{tenant}/")));
        assert!(upload.key.ends_with(".JPG"));
        assert!(upload.url.contains("signature="));
        assert!(upload.expires_at > Utc::now() + Duration::minutes(59));

        let no_ext = library.presign_upload(tenant, "README", "application/octet-stream");
        assert!(no_ext.key.ends_with(".bin"));
    }
}
