//! Pivot API Server implementation
//!
//! Axum server for the upload form and the report download endpoint.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers;
use crate::report::{ReportOptions, ReportPipeline};
use crate::session::ReportSession;

/// Default upload limit in megabytes
pub const DEFAULT_MAX_UPLOAD_MB: usize = 20;

/// API Server configuration
#[derive(Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub report: ReportOptions,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
            report: ReportOptions::default(),
        }
    }
}

/// Shared application state
pub struct AppState {
    pub version: String,
    pub pipeline: ReportPipeline,
    /// One report at a time; extra submissions get 409
    pub session: ReportSession,
}

impl AppState {
    pub fn new(report: ReportOptions) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            pipeline: ReportPipeline::new(report),
            session: ReportSession::new(),
        }
    }
}

/// Build the router with all routes and middleware
pub fn build_router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers(Any);

    Router::new()
        // Upload form, health and info endpoints
        .route("/", get(handlers::form))
        .route("/health", get(handlers::health))
        .route("/version", get(handlers::version))
        // Report endpoints
        .route("/api/v1/report", post(handlers::report))
        .route("/api/v1/preview", post(handlers::preview))
        // State and middleware
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Run the API server
pub async fn run_api_server(config: ApiConfig) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "pivot_server=info,royalbit_pivot=info,tower_http=info".into()
            }),
        )
        .init();

    let state = Arc::new(AppState::new(config.report.clone()));
    let app = build_router(state, config.max_upload_bytes);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("📊 Pivot server starting on http://{}", addr);
    info!("   Form: /  Endpoints: /api/v1/report, /api/v1/preview");
    info!("   Health: /health, Version: /version");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Pivot server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping server...");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_upload_bytes, 20 * 1024 * 1024);
        assert_eq!(config.report.sheet_name, "Report");
    }

    #[test]
    fn test_config_address_format() {
        let config = ApiConfig {
            host: "192.168.1.100".to_string(),
            port: 9090,
            ..ApiConfig::default()
        };
        let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse().unwrap();
        assert_eq!(addr.port(), 9090);
    }

    #[test]
    fn test_app_state_starts_idle() {
        let state = AppState::new(ReportOptions::default());
        assert_eq!(state.version, env!("CARGO_PKG_VERSION"));
        assert!(!state.session.is_busy());
    }
}
