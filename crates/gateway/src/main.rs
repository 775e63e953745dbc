//! AnswerForge API Gateway
//!
//! The entry point for prediction requests.
//! Handles:
//! - Configuration loading (fails fast on missing settings)
//! - Request routing
//! - Observability (logging, metrics, tracing)

mod handlers;

use answerforge_common::{
    config::Settings,
    metrics::{self, LATENCY_BUCKETS},
    QueryProcessor,
};
use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub processor: Arc<QueryProcessor>,
    pub metrics: Option<PrometheusHandle>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = Settings::load().context("Failed to load configuration")?;

    // Initialize tracing
    init_tracing(&settings);

    info!(
        "Starting {} v{} (gateway v{})",
        settings.app_name,
        settings.app_version,
        answerforge_common::VERSION
    );

    // Initialize metrics
    let metrics_handle = PrometheusBuilder::new()
        .set_buckets(LATENCY_BUCKETS)?
        .install_recorder()
        .context("Failed to install metrics recorder")?;
    metrics::register_metrics();

    // Build the pipeline
    let processor = QueryProcessor::from_settings(&settings)?;
    info!(
        model = processor.model_name(),
        endpoint = %settings.openai_endpoint,
        max_sources = settings.search_max_results,
        "Query processor ready"
    );

    let settings = Arc::new(settings);
    let state = AppState {
        settings: settings.clone(),
        processor: Arc::new(processor),
        metrics: Some(metrics_handle),
    };

    // Build the router
    let app = create_router(state);

    // Start the server
    let addr = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Configure the global subscriber; `RUST_LOG` overrides `LOGGING_LEVEL`
fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_filter()));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(settings.enable_debug)
        .with_line_number(settings.enable_debug);

    if settings.json_logging {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

/// Create the main application router
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    // API routes
    let api_routes = Router::new().route("/request", post(handlers::request::predict));

    let router = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/metrics", get(handlers::metrics::render));

    // axum refuses to nest at the root
    let prefix = state.settings.route_prefix();
    let router = if prefix.is_empty() {
        router.merge(api_routes)
    } else {
        router.nest(&prefix, api_routes)
    };

    // Last layer added runs first, so the id is set before it is propagated
    router
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(propagate_id)
        .layer(request_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
