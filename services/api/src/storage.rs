//! Object storage for uploaded media (videos, thumbnails, avatars, covers)

use anyhow::Result;
use aws_sdk_s3::{Client, primitives::ByteStream};
use tracing::info;
use uuid::Uuid;

use crate::upload::UploadedFile;

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Bucket receiving uploaded media
    pub bucket_name: String,
    /// Public base URL under which bucket objects are served
    pub public_base_url: String,
}

impl StorageConfig {
    /// Create a new StorageConfig from environment variables
    ///
    /// # Environment Variables
    /// - `MEDIA_BUCKET_NAME`: Target bucket (default: "media-bucket")
    /// - `MEDIA_PUBLIC_BASE_URL`: Base URL of served objects
    ///   (default: "https://media-bucket.s3.amazonaws.com")
    pub fn from_env() -> Self {
        let bucket_name =
            std::env::var("MEDIA_BUCKET_NAME").unwrap_or_else(|_| "media-bucket".to_string());
        let public_base_url = std::env::var("MEDIA_PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("https://{}.s3.amazonaws.com", bucket_name));

        Self {
            bucket_name,
            public_base_url,
        }
    }
}

/// Kind of uploaded media, decides the key prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Thumbnail,
    Avatar,
    CoverImage,
}

impl MediaKind {
    fn prefix(&self) -> &'static str {
        match self {
            MediaKind::Video => "videos",
            MediaKind::Thumbnail => "thumbnails",
            MediaKind::Avatar => "avatars",
            MediaKind::CoverImage => "covers",
        }
    }

    /// Whether `content_type` is acceptable for this kind
    pub fn accepts(&self, content_type: &str) -> bool {
        match self {
            MediaKind::Video => content_type.starts_with("video/"),
            _ => content_type.starts_with("image/"),
        }
    }
}

/// Uploads media to S3 and hands back public URLs
#[derive(Clone)]
pub struct MediaStorage {
    s3_client: Client,
    config: StorageConfig,
}

impl MediaStorage {
    pub fn new(s3_client: Client, config: StorageConfig) -> Self {
        Self { s3_client, config }
    }

    /// Upload `file` and return its public URL
    pub async fn upload(&self, kind: MediaKind, file: UploadedFile) -> Result<String> {
        let key = object_key(kind, Uuid::new_v4(), &file.file_name);
        info!("Uploading {} bytes to {}", file.bytes.len(), key);

        self.s3_client
            .put_object()
            .bucket(&self.config.bucket_name)
            .key(&key)
            .body(ByteStream::from(file.bytes.to_vec()))
            .content_type(file.content_type)
            .send()
            .await?;

        Ok(public_url(&self.config.public_base_url, &key))
    }
}

/// Bucket key: `<prefix>/<id>-<sanitised file name>`
pub fn object_key(kind: MediaKind, id: Uuid, file_name: &str) -> String {
    let sanitized: String = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let sanitized = if sanitized.trim_matches('.').is_empty() {
        "upload".to_string()
    } else {
        sanitized
    };

    format!("{}/{}-{}", kind.prefix(), id, sanitized)
}

pub fn public_url(base_url: &str, key: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), key)
}
