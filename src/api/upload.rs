use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::fs;
use std::path::Path;

use super::{ApiClient, FilePart, Method};
use crate::error::ApiError;

pub const DEFAULT_FOLDER: &str = "hero";
pub const ICON_FOLDER: &str = "stats-icons";

const MIB: u64 = 1024 * 1024;

const IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "image/gif"];
const ICON_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/gif",
    "image/svg+xml",
];

/// Advisory client-side limits. The server enforces its own and may still
/// refuse a file that passes here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UploadPolicy {
    pub allowed: &'static [&'static str],
    pub max_bytes: u64,
    label: &'static str,
}

impl UploadPolicy {
    pub fn for_folder(folder: &str) -> Self {
        if folder == ICON_FOLDER {
            UploadPolicy {
                allowed: ICON_TYPES,
                max_bytes: 2 * MIB,
                label: "JPG, PNG, WEBP, GIF, or SVG",
            }
        } else {
            UploadPolicy {
                allowed: IMAGE_TYPES,
                max_bytes: 5 * MIB,
                label: "JPG, PNG, WEBP, or GIF",
            }
        }
    }

    pub fn check(&self, mime: Option<&str>, size: u64) -> Result<(), ApiError> {
        match mime {
            Some(m) if self.allowed.contains(&m) => {}
            _ => {
                return Err(ApiError::Validation(format!(
                    "Invalid file type. Please upload {}.",
                    self.label
                )))
            }
        }
        if size > self.max_bytes {
            return Err(ApiError::Validation(format!(
                "File size must be less than {}MB.",
                self.max_bytes / MIB
            )));
        }
        Ok(())
    }
}

/// MIME type from the file extension.
pub fn mime_for(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())?
        .to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "svg" => Some("image/svg+xml"),
        "pdf" => Some("application/pdf"),
        _ => None,
    }
}

/// `data` of a successful `POST /upload/single`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Uploaded {
    pub url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub struct UploadApi<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    pub fn upload(&self) -> UploadApi<'_> {
        UploadApi { client: self }
    }
}

impl<'a> UploadApi<'a> {
    pub fn upload_single(&self, path: &Path, folder: &str) -> Result<Uploaded, ApiError> {
        let bytes = fs::read(path)
            .map_err(|e| ApiError::Validation(format!("cannot read {}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        self.upload_bytes(&file_name, bytes, folder)
    }

    /// Single all-or-nothing multipart request: `file` plus `folder`.
    pub fn upload_bytes(&self, file_name: &str, bytes: Vec<u8>, folder: &str) -> Result<Uploaded, ApiError> {
        let folder = if folder.trim().is_empty() { DEFAULT_FOLDER } else { folder };
        let mime = mime_for(file_name);
        UploadPolicy::for_folder(folder).check(mime, bytes.len() as u64)?;

        let _guard = self.client.guard("upload", &format!("single:{}", folder))?;
        log::info!("[upload] {} ({} bytes) -> {}", file_name, bytes.len(), folder);
        let file = FilePart {
            field: "file".to_string(),
            file_name: file_name.to_string(),
            mime: mime.unwrap_or("application/octet-stream").to_string(),
            bytes,
        };
        let env = self
            .client
            .call_multipart(
                "/upload/single",
                vec![("folder".to_string(), folder.to_string())],
                file,
                "Upload failed",
            )?
            .into_success()?;
        let uploaded: Uploaded = env.data_as()?;
        if uploaded.url.is_empty() {
            return Err(ApiError::Decode("upload response has no url".into()));
        }
        Ok(uploaded)
    }

    pub fn delete_file(&self, path: &str) -> Result<(), ApiError> {
        if path.trim().is_empty() {
            return Err(ApiError::Validation("file path is required".into()));
        }
        let _guard = self.client.guard("upload", "delete")?;
        self.client
            .call(Method::Delete, "/upload", Some(json!({ "path": path })))?
            .into_success()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icons_allow_svg_but_images_do_not() {
        let images = UploadPolicy::for_folder("projects");
        let icons = UploadPolicy::for_folder(ICON_FOLDER);
        assert!(images.check(Some("image/svg+xml"), 10).is_err());
        assert!(icons.check(Some("image/svg+xml"), 10).is_ok());
    }

    #[test]
    fn size_ceilings() {
        let images = UploadPolicy::for_folder(DEFAULT_FOLDER);
        assert!(images.check(Some("image/png"), 5 * MIB).is_ok());
        match images.check(Some("image/png"), 5 * MIB + 1) {
            Err(ApiError::Validation(msg)) => assert_eq!(msg, "File size must be less than 5MB."),
            other => panic!("unexpected {:?}", other),
        }
        let icons = UploadPolicy::for_folder(ICON_FOLDER);
        assert!(icons.check(Some("image/png"), 2 * MIB + 1).is_err());
    }

    #[test]
    fn unknown_type_is_rejected() {
        let images = UploadPolicy::for_folder(DEFAULT_FOLDER);
        assert!(images.check(None, 1).is_err());
        assert!(images.check(Some("application/pdf"), 1).is_err());
    }

    #[test]
    fn mime_from_extension() {
        assert_eq!(mime_for("photo.JPG"), Some("image/jpeg"));
        assert_eq!(mime_for("icon.svg"), Some("image/svg+xml"));
        assert_eq!(mime_for("archive.tar"), None);
        assert_eq!(mime_for("noext"), None);
    }
}
