pub mod health;
pub mod parse;

pub use health::*;
pub use parse::*;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::middleware::logging_middleware;
use crate::services::{ExtractionPipeline, GeminiClient, PdfProcessor, StatementMatchers};

/// Everything a request needs, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: Arc<ExtractionPipeline>,
    pub matchers: Arc<StatementMatchers>,
}

impl AppState {
    pub fn new(config: Config, pipeline: ExtractionPipeline) -> AppResult<Self> {
        let matchers = StatementMatchers::new()
            .map_err(|e| AppError::config(format!("invalid statement pattern: {}", e)))?;

        Ok(Self {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            matchers: Arc::new(matchers),
        })
    }

    /// Production wiring: lopdf for extraction, Gemini for completion.
    pub fn from_config(config: Config) -> AppResult<Self> {
        let completion = GeminiClient::from_config(&config)?;
        let pipeline = ExtractionPipeline::new(Arc::new(PdfProcessor::new()), Arc::new(completion));
        Self::new(config, pipeline)
    }
}

pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_size_bytes();

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/parse-pdf", post(parse_pdf_handler))
        .route("/api/parse-pdf/local", post(parse_pdf_local_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(body_limit))
                .layer(axum::middleware::from_fn(logging_middleware)),
        )
        .with_state(state)
}
