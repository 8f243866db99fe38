//! Backend for adsmith - turns product metadata into advertising copy and imagery
//!
//! Accepts product details over HTTP and delegates to hosted model APIs: an
//! OpenAI-compatible chat completion endpoint for ad copy and the Gemini
//! image generation endpoint for product shots. Ad copy is returned whole or
//! streamed incrementally as newline-delimited events.

pub mod ads;
pub mod ai;
pub mod config;
pub mod error;
pub mod http;
pub mod image;
pub mod models;
pub mod prompts;

pub use error::{Error, Result};
