//! Flat-file storage for uploaded and generated product images.

use crate::models::{ImageResult, ImageSource, UploadedImage};
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Extensions accepted for client uploads.
pub const ALLOWED_EXTENSIONS: [&str; 4] = [".jpg", ".jpeg", ".png", ".webp"];

/// MIME types accepted for client uploads.
pub const ALLOWED_IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

const MAX_NAME_LEN: usize = 50;

/// Stores image files flat under a single upload directory.
///
/// Filenames are a random token plus either the original extension
/// (uploads) or a sanitized product-name suffix (generated images). There
/// is no subdirectory structure and no metadata sidecar.
pub struct ImageStore {
    dir: PathBuf,
    max_upload_bytes: usize,
    serve_prefix: String,
}

impl ImageStore {
    pub fn new(dir: PathBuf, max_upload_bytes: usize, serve_prefix: String) -> Result<Self> {
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            max_upload_bytes,
            serve_prefix,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Validate and persist a client upload.
    pub async fn save_upload(&self, upload: &UploadedImage) -> Result<ImageResult> {
        let extension = file_extension(&upload.file_name).ok_or_else(|| {
            Error::Validation(format!("File '{}' has no extension", upload.file_name))
        })?;

        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(Error::Validation(format!(
                "File extension '{}' not allowed. Allowed: {}",
                extension,
                ALLOWED_EXTENSIONS.join(", ")
            )));
        }

        if !ALLOWED_IMAGE_TYPES.contains(&upload.content_type.as_str()) {
            return Err(Error::Validation(format!(
                "Content type '{}' not allowed. Allowed: {}",
                upload.content_type,
                ALLOWED_IMAGE_TYPES.join(", ")
            )));
        }

        if upload.bytes.len() > self.max_upload_bytes {
            return Err(Error::Validation(format!(
                "File size ({} bytes) exceeds maximum allowed size ({} bytes)",
                upload.bytes.len(),
                self.max_upload_bytes
            )));
        }

        let file_name = format!("{}{}", Uuid::new_v4().simple(), extension);
        let path = self.dir.join(&file_name);
        tokio::fs::write(&path, &upload.bytes).await?;
        tracing::info!("Stored uploaded image at: {}", path.display());

        Ok(self.result(path, file_name, ImageSource::Uploaded))
    }

    /// Persist a generated image under a product-derived filename.
    pub async fn save_generated(&self, product_name: &str, bytes: &[u8]) -> Result<ImageResult> {
        let file_name = format!(
            "{}_{}.png",
            Uuid::new_v4().simple(),
            sanitize_product_name(product_name)
        );
        let path = self.dir.join(&file_name);
        tokio::fs::write(&path, bytes).await?;
        tracing::info!("Stored generated image at: {}", path.display());

        Ok(self.result(path, file_name, ImageSource::Generated))
    }

    /// Resolve a stored file name to its on-disk path.
    ///
    /// Rejects path separators and parent references so callers cannot
    /// escape the upload directory.
    pub fn resolve(&self, file_name: &str) -> Result<PathBuf> {
        if file_name.is_empty()
            || file_name.contains('/')
            || file_name.contains('\\')
            || file_name.contains("..")
        {
            return Err(Error::NotFound(format!("Image not found: {}", file_name)));
        }

        let path = self.dir.join(file_name);
        if !path.is_file() {
            return Err(Error::NotFound(format!("Image not found: {}", file_name)));
        }
        Ok(path)
    }

    /// Best-effort removal of generated temporary files.
    pub async fn cleanup(&self, file_names: &[String]) {
        for file_name in file_names {
            let path = match self.resolve(file_name) {
                Ok(path) => path,
                Err(_) => {
                    tracing::warn!("Temporary file not found: {}", file_name);
                    continue;
                }
            };
            match tokio::fs::remove_file(&path).await {
                Ok(()) => tracing::info!("Deleted temporary file: {}", path.display()),
                Err(e) => tracing::warn!("Error cleaning up {}: {}", path.display(), e),
            }
        }
    }

    fn result(&self, path: PathBuf, file_name: String, source: ImageSource) -> ImageResult {
        ImageResult {
            image_path: Some(path.to_string_lossy().to_string()),
            image_url: Some(format!("{}/{}", self.serve_prefix, file_name)),
            generated: source == ImageSource::Generated,
            source,
        }
    }
}

fn file_extension(file_name: &str) -> Option<String> {
    file_name
        .rfind('.')
        .filter(|&idx| idx > 0)
        .map(|idx| file_name[idx..].to_ascii_lowercase())
}

/// Reduce a product name to a filesystem-safe filename suffix.
///
/// Keeps ASCII alphanumerics, dashes, and underscores; spaces become
/// underscores, everything else is dropped, and the result is capped at 50
/// characters. An empty result falls back to "product".
pub fn sanitize_product_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .filter_map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => Some(c),
            ' ' => Some('_'),
            _ => None,
        })
        .take(MAX_NAME_LEN)
        .collect();

    if sanitized.is_empty() {
        "product".to_string()
    } else {
        sanitized
    }
}

/// Sniff an image content type from magic bytes, defaulting to PNG.
pub fn detect_image_mime(bytes: &[u8]) -> &'static str {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [0x89, 0x50, 0x4E, 0x47, ..] => "image/png",
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => "image/webp",
        _ => "image/png",
    }
}
