use anyhow::Result;
use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, Method},
    response::Json,
    routing::get,
    serve, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use wiretronic_utils::{init_logging, AppConfig};

mod fx;
mod handlers;
mod metrics;
mod middleware;
mod pricing;
mod routes;
mod service;
mod upstream;

use fx::{RateProvider, SekRates};
use metrics::ResearchMetrics;
use middleware::*;
use service::ResearchService;
use upstream::OpenAiClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration ({}), using defaults", e);
        AppConfig::default()
    });

    init_logging(&config.logging)?;
    info!("Starting Wiretronic research service");

    if config.openai.api_key.is_none() {
        warn!("No server-side OpenAI API key configured; requests must supply one");
    }

    let state = build_state(&config)?;
    let app = create_app(state, &config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let listener = TcpListener::bind(&addr).await?;
    info!("Research service listening on {}", addr);

    serve(listener, app).await?;

    Ok(())
}

fn build_state(config: &AppConfig) -> Result<AppState> {
    let metrics = Arc::new(ResearchMetrics::new()?);
    let rates: Arc<dyn SekRates> = Arc::new(RateProvider::from_config(&config.fx)?);
    let search = Arc::new(OpenAiClient::from_config(&config.openai)?);

    let service = ResearchService::new(
        search,
        Arc::clone(&rates),
        Duration::from_secs(config.openai.timeout_seconds),
        Arc::clone(&metrics),
    );

    Ok(AppState {
        service: Arc::new(service),
        rates,
        metrics,
        config: config.clone(),
    })
}

fn create_app(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .nest("/api/v1", routes::create_api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods([Method::GET, Method::POST])
                        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
                )
                .layer(DefaultBodyLimit::max(config.server.max_request_size))
                .layer(axum::middleware::from_fn(request_id_middleware))
                .layer(axum::middleware::from_fn(error_logging_middleware)),
        )
        .with_state(state)
}

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ResearchService>,
    pub rates: Arc<dyn SekRates>,
    pub metrics: Arc<ResearchMetrics>,
    pub config: AppConfig,
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": "wiretronic-research",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn metrics_handler(State(state): State<AppState>) -> ApiResult<String> {
    Ok(state.metrics.encode()?)
}
