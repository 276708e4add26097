//! Multipart form collection for upload endpoints

use axum::{body::Bytes, extract::Multipart};
use std::collections::HashMap;

use crate::{
    error::{ApiError, ApiResult},
    storage::MediaKind,
};

/// A file part of a multipart form
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Text fields and files of a multipart form
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl UploadForm {
    /// Drain `multipart` into memory
    pub async fn collect(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            let file_name = field.file_name().map(str::to_string);

            match file_name {
                Some(file_name) => {
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let bytes = field.bytes().await?;
                    if bytes.is_empty() {
                        continue;
                    }
                    form.files.insert(
                        name,
                        UploadedFile {
                            file_name,
                            content_type,
                            bytes,
                        },
                    );
                }
                None => {
                    let value = field.text().await?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Take an optional file, checking its content type against `kind`
    pub fn take_file(&mut self, name: &str, kind: MediaKind) -> ApiResult<Option<UploadedFile>> {
        match self.files.remove(name) {
            Some(file) if !kind.accepts(&file.content_type) => Err(ApiError::BadRequest(format!(
                "{} has unsupported content type {}",
                name, file.content_type
            ))),
            other => Ok(other),
        }
    }

    /// Take a required file
    pub fn require_file(&mut self, name: &str, kind: MediaKind) -> ApiResult<UploadedFile> {
        self.take_file(name, kind)?
            .ok_or_else(|| ApiError::BadRequest(format!("{} file is required", name)))
    }

    #[cfg(test)]
    pub(crate) fn with_parts(
        fields: Vec<(&str, &str)>,
        files: Vec<(&str, &str, &'static [u8])>,
    ) -> Self {
        UploadForm {
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            files: files
                .into_iter()
                .map(|(name, content_type, bytes)| {
                    (
                        name.to_string(),
                        UploadedFile {
                            file_name: format!("{}.bin", name),
                            content_type: content_type.to_string(),
                            bytes: Bytes::from_static(bytes),
                        },
                    )
                })
                .collect(),
        }
    }
}
