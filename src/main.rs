//! Thinkr - Google Cloud certification Q&A service
//!
//! Serves browser chat sessions, each driven by a single-writer
//! orchestrator task, and the assistant backend they talk to.

mod api;
mod collaborator;
mod config;
mod llm;
mod prompt;
mod runtime;
mod session;
mod state_machine;

use api::{create_router, AppState};
use axum::http::HeaderValue;
use collaborator::{Collaborator, HttpCollaborator};
use config::ServerConfig;
use llm::{LlmConfig, ModelRegistry};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "thinkr=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = ServerConfig::from_env()?;

    // Initialize LLM registry
    let llm_config = LlmConfig::from_env();
    let llm_registry = Arc::new(ModelRegistry::new(&llm_config));

    if llm_registry.has_models() {
        tracing::info!(
            models = ?llm_registry.available_models(),
            default = %llm_registry.default_model_id(),
            "LLM registry initialized"
        );
    } else {
        tracing::warn!("No LLM API keys configured. Set GOOGLE_API_KEY or LLM_GATEWAY.");
    }

    // Sessions talk to a remote backend when one is configured
    let remote: Option<Arc<dyn Collaborator>> = match &config.backend_url {
        Some(url) => {
            let http = HttpCollaborator::new(url, config.request_timeout)?;
            tracing::info!(
                endpoint = %http.endpoint(),
                timeout = ?config.request_timeout,
                "Using remote chat backend"
            );
            Some(Arc::new(http))
        }
        None => None,
    };

    // Create application state
    let state = AppState::new(llm_registry, remote);
    Arc::clone(&state.sessions).spawn_idle_sweeper(config.session_idle);
    tracing::info!(idle = ?config.session_idle, "Idle session sweeper started");

    // Build router with middleware
    let app = create_router(state)
        .layer(cors_layer(&config.allowed_origins))
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, "Starting Thinkr server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}
