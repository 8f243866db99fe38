//! Image resolution orchestration
//!
//! Picks a product image from up to three sources with a strict priority:
//! a client upload wins over a supplied URL, which wins over AI generation.
//! Failures in a selected branch are logged and collapse to "no image";
//! remote-client errors never reach the caller.

pub mod storage;

pub use storage::{sanitize_product_name, ImageStore};

use crate::ai::ImageGenerationService;
use crate::models::{ImageResult, ImageSource, UploadedImage};
use crate::prompts;
use std::sync::Arc;

const FALLBACK_BRAND: &str = "a generic brand";

/// Orchestrates image selection, generation, and persistence.
pub struct ImageStudio {
    imagen: Arc<dyn ImageGenerationService>,
    store: Arc<ImageStore>,
}

impl ImageStudio {
    pub fn new(imagen: Arc<dyn ImageGenerationService>, store: Arc<ImageStore>) -> Self {
        Self { imagen, store }
    }

    pub fn store(&self) -> &ImageStore {
        &self.store
    }

    /// Resolve a product image, trying sources in priority order.
    ///
    /// Only the first supplied source is attempted; `None` means no image
    /// was produced, which is a valid outcome rather than an error.
    pub async fn resolve_image(
        &self,
        product_name: &str,
        brand_name: Option<&str>,
        description: Option<&str>,
        image_url: Option<&str>,
        uploaded: Option<UploadedImage>,
        generate: bool,
    ) -> Option<ImageResult> {
        if let Some(upload) = uploaded {
            tracing::info!("Processing uploaded image file: {}", upload.file_name);
            return match self.store.save_upload(&upload).await {
                Ok(result) => Some(result),
                Err(e) => {
                    tracing::error!("Failed to process uploaded image: {}", e);
                    None
                }
            };
        }

        if let Some(url) = image_url {
            tracing::info!("Using provided image URL: {}", url);
            if is_valid_image_url(url) {
                return Some(ImageResult {
                    image_path: None,
                    image_url: Some(url.to_string()),
                    source: ImageSource::Url,
                    generated: false,
                });
            }
            tracing::warn!("Invalid image URL: {}", url);
            return None;
        }

        if generate {
            tracing::info!("Generating AI image for product: {}", product_name);
            return self.generate_and_store(product_name, brand_name, description).await;
        }

        tracing::debug!("No image provided or requested");
        None
    }

    async fn generate_and_store(
        &self,
        product_name: &str,
        brand_name: Option<&str>,
        description: Option<&str>,
    ) -> Option<ImageResult> {
        let prompt = prompts::render(
            prompts::IMAGE_PROMPT,
            &[
                ("product_name", product_name),
                ("brand_name", brand_name.unwrap_or(FALLBACK_BRAND)),
                ("product_description", description.unwrap_or("")),
            ],
        );

        let image = match self.imagen.generate_image(&prompt).await {
            Ok(image) => image,
            Err(e) => {
                tracing::error!("Failed to generate AI image: {}", e);
                return None;
            }
        };

        if let Some(text) = &image.text {
            tracing::info!("Image model commentary: {}", text);
        }

        match self.store.save_generated(product_name, &image.bytes).await {
            Ok(result) => Some(result),
            Err(e) => {
                tracing::error!("Failed to store generated image: {}", e);
                None
            }
        }
    }
}

/// Check that a URL is absolute http/https with a host.
fn is_valid_image_url(url: &str) -> bool {
    match reqwest::Url::parse(url) {
        Ok(parsed) => {
            matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some()
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockImageClient;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn studio(dir: &std::path::Path, imagen: MockImageClient) -> ImageStudio {
        let store = Arc::new(
            ImageStore::new(dir.to_path_buf(), 1024, "/api/v1/images".to_string()).unwrap(),
        );
        ImageStudio::new(Arc::new(imagen), store)
    }

    fn png_upload() -> UploadedImage {
        UploadedImage {
            file_name: "shot.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![1, 2, 3],
        }
    }

    #[test]
    fn test_url_validation() {
        assert!(is_valid_image_url("https://cdn.example.com/pic.png"));
        assert!(is_valid_image_url("http://localhost:8000/pic.png"));
        assert!(!is_valid_image_url("example.com/pic.png"));
        assert!(!is_valid_image_url("ftp://example.com/pic.png"));
        assert!(!is_valid_image_url("https://"));
        assert!(!is_valid_image_url(""));
    }

    #[tokio::test]
    async fn test_upload_wins_over_url_and_generation() {
        let dir = tempdir().unwrap();
        let imagen = MockImageClient::new();
        let probe = imagen.clone();
        let studio = studio(dir.path(), imagen);

        let result = studio
            .resolve_image(
                "Widget",
                None,
                None,
                Some("https://cdn.example.com/pic.png"),
                Some(png_upload()),
                true,
            )
            .await
            .unwrap();

        assert_eq!(result.source, ImageSource::Uploaded);
        assert!(!result.generated);
        assert_eq!(probe.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_url_wins_over_generation() {
        let dir = tempdir().unwrap();
        let imagen = MockImageClient::new();
        let probe = imagen.clone();
        let studio = studio(dir.path(), imagen);

        let result = studio
            .resolve_image(
                "Widget",
                None,
                None,
                Some("https://cdn.example.com/pic.png"),
                None,
                true,
            )
            .await
            .unwrap();

        assert_eq!(result.source, ImageSource::Url);
        assert_eq!(
            result.image_url.as_deref(),
            Some("https://cdn.example.com/pic.png")
        );
        assert!(result.image_path.is_none());
        assert_eq!(probe.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_url_yields_none_without_fallback() {
        let dir = tempdir().unwrap();
        let studio = studio(dir.path(), MockImageClient::new());

        let result = studio
            .resolve_image("Widget", None, None, Some("example.com/pic.png"), None, false)
            .await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_invalid_upload_yields_none_without_fallback() {
        let dir = tempdir().unwrap();
        let studio = studio(dir.path(), MockImageClient::new());

        let bad = UploadedImage {
            file_name: "notes.txt".to_string(),
            content_type: "text/plain".to_string(),
            bytes: vec![1],
        };
        // A valid URL is also supplied, but the upload branch was selected
        // and its failure is final.
        let result = studio
            .resolve_image(
                "Widget",
                None,
                None,
                Some("https://cdn.example.com/pic.png"),
                Some(bad),
                true,
            )
            .await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_generation_persists_file() {
        let dir = tempdir().unwrap();
        let studio = studio(
            dir.path(),
            MockImageClient::new().with_image_response(vec![7, 7, 7]),
        );

        let result = studio
            .resolve_image(
                "Trail Shoe",
                Some("Northstep"),
                Some("Grippy trail runner"),
                None,
                None,
                true,
            )
            .await
            .unwrap();

        assert_eq!(result.source, ImageSource::Generated);
        assert!(result.generated);

        let path = PathBuf::from(result.image_path.unwrap());
        assert!(path.is_file());
        assert_eq!(std::fs::read(&path).unwrap(), vec![7, 7, 7]);
    }

    #[tokio::test]
    async fn test_generation_failure_is_swallowed() {
        let dir = tempdir().unwrap();
        let studio = studio(
            dir.path(),
            MockImageClient::new().with_failure("safety block".to_string()),
        );

        let result = studio
            .resolve_image("Widget", None, None, None, None, true)
            .await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_nothing_supplied_yields_none() {
        let dir = tempdir().unwrap();
        let imagen = MockImageClient::new();
        let probe = imagen.clone();
        let studio = studio(dir.path(), imagen);

        let result = studio
            .resolve_image("Widget", None, None, None, None, false)
            .await;
        assert!(result.is_none());
        assert_eq!(probe.get_call_count(), 0);
    }
}
