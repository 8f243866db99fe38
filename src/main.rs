use adsmith::ads::AdStudio;
use adsmith::ai::{ChatService, GeminiImageClient, ImageGenerationService, OpenAiChatClient};
use adsmith::config::Config;
use adsmith::http::{router, AppState, RateLimiter, API_PREFIX};
use adsmith::image::{ImageStore, ImageStudio};
use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "adsmith")]
#[command(about = "Ad copy and product image generation backend")]
struct CliArgs {
    /// Override the bind address from the environment.
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port from the environment.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "adsmith=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();
    let config = Config::from_env()?;

    // Reuse one HTTP connection pool across provider clients.
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(120))
        .build()?;

    let chat: Arc<dyn ChatService> = Arc::new(OpenAiChatClient::new_with_client(
        config.llm_api_key.clone(),
        config.llm_base_url.clone(),
        config.llm_model.clone(),
        http_client.clone(),
    ));
    info!("Chat model: {} via {}", config.llm_model, config.llm_base_url);

    let imagen: Arc<dyn ImageGenerationService> = Arc::new(GeminiImageClient::new_with_client(
        config.gemini_api_key.clone(),
        config.gemini_image_model.clone(),
        config.gemini_safety_threshold.clone(),
        http_client,
    ));
    info!("Image model: {}", config.gemini_image_model);

    let store = Arc::new(ImageStore::new(
        config.upload_dir.clone(),
        config.max_upload_bytes,
        format!("{}/images", API_PREFIX),
    )?);
    info!("Upload directory: {}", config.upload_dir.display());

    let state = AppState {
        ads: Arc::new(AdStudio::new(chat, config.llm_model.clone())),
        images: Arc::new(ImageStudio::new(imagen, store)),
        limiter: Arc::new(RateLimiter::new(
            config.rate_limit_requests,
            Duration::from_secs(config.rate_limit_window_secs),
        )),
    };

    let host = args.host.unwrap_or(config.host);
    let port = args.port.unwrap_or(config.port);
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, router(state)).await?;
    Ok(())
}
