//! Data models and structures
//!
//! Defines the request, response, and streaming event types exchanged over
//! the HTTP surface, plus the ad type/tone axes that drive prompt selection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Structural axis of a generated ad: which layout and length ceiling apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdType {
    SocialMedia,
    Email,
    ProductDescription,
}

impl Default for AdType {
    fn default() -> Self {
        AdType::SocialMedia
    }
}

impl AdType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdType::SocialMedia => "social_media",
            AdType::Email => "email",
            AdType::ProductDescription => "product_description",
        }
    }
}

/// Stylistic axis of a generated ad: voice, formality, and emoji density.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdTone {
    Friendly,
    Professional,
    Urgent,
    Playful,
    Luxurious,
    Minimalist,
    Bold,
    Conversational,
}

impl Default for AdTone {
    fn default() -> Self {
        AdTone::Friendly
    }
}

impl AdTone {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdTone::Friendly => "friendly",
            AdTone::Professional => "professional",
            AdTone::Urgent => "urgent",
            AdTone::Playful => "playful",
            AdTone::Luxurious => "luxurious",
            AdTone::Minimalist => "minimalist",
            AdTone::Bold => "bold",
            AdTone::Conversational => "conversational",
        }
    }
}

/// Product input from the user form, plus the optional ad type/tone.
///
/// Constructed once per request and discarded after the response is built.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AdRequest {
    #[validate(length(min = 1, max = 200))]
    pub product_name: String,
    #[validate(length(max = 100))]
    pub brand_name: Option<String>,
    #[validate(length(min = 1))]
    pub category: Vec<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(range(exclusive_min = 0.0))]
    pub price: Option<f64>,
    #[validate(range(exclusive_min = 0.0))]
    pub discounted_price: Option<f64>,
    #[validate(length(max = 1000))]
    pub product_url: Option<String>,
    #[validate(length(max = 1000))]
    pub image_url: Option<String>,
    pub ad_type: Option<AdType>,
    pub ad_tone: Option<AdTone>,
}

impl AdRequest {
    /// Flatten the product fields into a newline-delimited `field: value`
    /// block for the model's user turn. Absent fields are omitted entirely
    /// and the remaining fields keep declaration order.
    pub fn field_block(&self) -> String {
        let mut lines = vec![format!("product_name: {}", self.product_name)];
        if let Some(brand_name) = &self.brand_name {
            lines.push(format!("brand_name: {}", brand_name));
        }
        lines.push(format!("category: {}", render_list(&self.category)));
        if let Some(description) = &self.description {
            lines.push(format!("description: {}", description));
        }
        if let Some(price) = self.price {
            lines.push(format!("price: {}", price));
        }
        if let Some(discounted_price) = self.discounted_price {
            lines.push(format!("discounted_price: {}", discounted_price));
        }
        if let Some(product_url) = &self.product_url {
            lines.push(format!("product_url: {}", product_url));
        }
        if let Some(image_url) = &self.image_url {
            lines.push(format!("image_url: {}", image_url));
        }
        lines.join("\n")
    }
}

fn render_list(items: &[String]) -> String {
    let quoted: Vec<String> = items.iter().map(|item| format!("'{}'", item)).collect();
    format!("[{}]", quoted.join(", "))
}

/// Product fields echoed back in responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductInfo {
    pub product_name: String,
    pub brand_name: Option<String>,
    pub category: Vec<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub discounted_price: Option<f64>,
    pub product_url: Option<String>,
}

impl From<&AdRequest> for ProductInfo {
    fn from(request: &AdRequest) -> Self {
        Self {
            product_name: request.product_name.clone(),
            brand_name: request.brand_name.clone(),
            category: request.category.clone(),
            description: request.description.clone(),
            price: request.price,
            discounted_price: request.discounted_price,
            product_url: request.product_url.clone(),
        }
    }
}

/// Resolved ad type/tone pair echoed back in responses.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AdSettings {
    pub ad_type: AdType,
    pub ad_tone: AdTone,
}

/// Complete response for a non-streaming ad generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdResponse {
    pub ad_content: String,
    pub product_info: ProductInfo,
    pub ad_settings: AdSettings,
    /// Total generation time in seconds.
    pub generation_time: f64,
    pub model_used: String,
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

/// One newline-delimited event on the streaming generation path.
///
/// Every stream opens with `processing`, carries any number of `streaming`
/// fragments, and closes with exactly one `completed` or `error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StreamEvent {
    Processing {
        request_id: String,
    },
    Streaming {
        content: String,
        progress: f32,
    },
    Completed {
        content: String,
        product_info: ProductInfo,
        ad_settings: AdSettings,
        generation_time: f64,
        model_used: String,
        request_id: String,
    },
    Error {
        message: String,
        error_code: String,
        request_id: String,
    },
}

/// Request body for standalone image generation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ImageRequest {
    #[validate(length(min = 1, max = 200))]
    pub product_name: String,
    #[validate(length(max = 100))]
    pub brand_name: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(length(max = 1000))]
    pub image_url: Option<String>,
    #[serde(default = "default_generate_image")]
    pub generate_image: bool,
}

fn default_generate_image() -> bool {
    true
}

/// Where a resolved image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    Uploaded,
    Url,
    Generated,
}

/// A resolved product image. At least one of `image_path`/`image_url` is
/// populated; "no image" is represented by the absence of a result, not by
/// an empty one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageResult {
    pub image_path: Option<String>,
    pub image_url: Option<String>,
    pub source: ImageSource,
    pub generated: bool,
}

/// An image file supplied by the client, already read into memory.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}
