//! HTTP surface: router, shared state and the listener loop.

mod handlers;

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    extract::{MatchedPath, Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::llm::{GeminiProvider, OpenAiProvider, Provider};
use crate::metrics::Metrics;
use crate::prompt::TemplateStore;
use crate::relay::Relay;

pub const METRICS_PATH: &str = "/metrics";

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
    pub openai: Arc<dyn Provider>,
    pub gemini: Arc<dyn Provider>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    /// State backed by the real OpenAI and Gemini adapters.
    pub fn new(config: &AppConfig, templates: TemplateStore) -> Result<Self, prometheus::Error> {
        let openai = OpenAiProvider::new(config.openai_base_url.as_str())
            .with_timeout(config.request_timeout);
        let gemini = GeminiProvider::new(config.gemini_base_url.as_str())
            .with_timeout(config.request_timeout);
        Self::with_providers(config, templates, Arc::new(openai), Arc::new(gemini))
    }

    pub fn with_providers(
        config: &AppConfig,
        templates: TemplateStore,
        openai: Arc<dyn Provider>,
        gemini: Arc<dyn Provider>,
    ) -> Result<Self, prometheus::Error> {
        let metrics = Arc::new(Metrics::new()?);
        let relay = Relay::new(Arc::new(templates), config, metrics.clone());
        Ok(Self {
            relay: Arc::new(relay),
            openai,
            gemini,
            metrics,
        })
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/call_openai", post(handlers::call_openai))
        .route("/call_gemini", post(handlers::call_gemini))
        .route("/_/_/echo", get(handlers::echo))
        .route(METRICS_PATH, get(handlers::metrics))
        .route("/version", get(handlers::version))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            track_requests,
        ))
        .with_state(state)
}

/// Count and time every routed request; log all but metrics scrapes.
async fn track_requests(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let endpoint = match request.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_owned(),
        None => request.uri().path().to_owned(),
    };

    let response = next.run(request).await;

    let elapsed = started.elapsed();
    let status = response.status();
    state
        .metrics
        .observe_request(method.as_str(), &endpoint, status.as_u16(), elapsed);

    if endpoint != METRICS_PATH {
        info!(
            method = %method,
            path = %endpoint,
            status = status.as_u16(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Handled request"
        );
    }
    response
}

/// Bind `config.bind_address()` and serve until ctrl-c.
pub async fn serve(config: &AppConfig, state: AppState) -> std::io::Result<()> {
    let listener = TcpListener::bind(config.bind_address()).await?;
    let addr = listener.local_addr()?;
    info!(
        addr = %addr,
        environment = %config.environment,
        "LLM connector listening"
    );

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
