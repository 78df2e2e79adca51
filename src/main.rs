use std::sync::Arc;

use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod error;
mod llm;
mod tts;
mod workflow;

use api::routes::{create_router, AppState};
use config::Config;
use llm::{GeminiClient, TextGenerator};
use tts::TtsService;
use workflow::WorkflowService;

#[tokio::main]
async fn main() {
    // A missing .env file is fine; real environment variables still apply
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env().expect("Invalid configuration");

    tracing::info!("Goalflow server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Starting server on http://{}:{}", config.host, config.port);
    tracing::info!("Audio directory: {}", config.audio_dir.display());

    let generator: Option<Arc<dyn TextGenerator>> = match &config.gemini_api_key {
        Some(key) => {
            tracing::info!("GEMINI_API_KEY is configured (model {})", config.gemini_model);
            let client = GeminiClient::new(
                key.clone(),
                config.gemini_api_base.clone(),
                config.gemini_model.clone(),
                config.gemini_timeout,
            )
            .expect("Failed to create Gemini client");
            Some(Arc::new(client) as Arc<dyn TextGenerator>)
        }
        None => {
            tracing::warn!("GEMINI_API_KEY is not set. Workflow and question routes will fail until configured.");
            None
        }
    };

    if config.murf_api_key.is_some() {
        tracing::info!("MURF_API_KEY is configured.");
    } else {
        tracing::warn!("MURF_API_KEY is not set. /api/tts still serves placeholder audio.");
    }

    // Create app state
    let state = Arc::new(AppState {
        workflow: WorkflowService::new(generator),
        tts: TtsService::new(config.murf_api_key.clone()),
        config,
    });

    let listener = tokio::net::TcpListener::bind(state.config.bind_target())
        .await
        .expect("Failed to bind to address");

    // Create router
    let app = create_router(state);

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
