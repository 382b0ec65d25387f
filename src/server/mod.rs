use crate::config::Config;
use crate::converter::Converter;
use anyhow::{Context, Result};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

mod error;
pub mod routes_api;
pub mod routes_convert;
pub mod uploads;

pub use error::AppError;
pub use uploads::{start_cleanup_task, UploadStore};

/// Room left in a request body for multipart framing around the file.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// How often expired uploads are swept, in seconds.
const CLEANUP_INTERVAL_SECS: u64 = 60;

/// Shared application context
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub converter: Arc<Converter>,
    /// Uploads waiting to be converted
    pub uploads: UploadStore,
}

impl AppContext {
    pub fn new(config: Config) -> Self {
        Self {
            converter: Arc::new(Converter::new(&config)),
            uploads: UploadStore::new(config.server.upload_ttl_secs),
            config: Arc::new(config),
        }
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext, static_dir: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .expose_headers([header::CONTENT_DISPOSITION]);

    let body_limit = ctx
        .config
        .server
        .max_upload_bytes()
        .saturating_add(MULTIPART_OVERHEAD);

    let api = routes_api::api_routes()
        .merge(routes_convert::convert_routes().layer(DefaultBodyLimit::max(body_limit)));

    let mut app = Router::new()
        // Health check
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx);

    // Serve a prebuilt front-end if configured, with SPA fallback to index.html
    if let Some(dir) = static_dir {
        if dir.exists() {
            tracing::info!("Serving static files from {:?}", dir);
            let index_path = dir.join("index.html");
            app = app.fallback_service(
                ServeDir::new(&dir)
                    .append_index_html_on_directories(true)
                    .not_found_service(ServeFile::new(index_path)),
            );
        }
    }

    app
}

async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Start the HTTP server
pub async fn start_server(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let static_dir = config.server.static_dir.clone();
    let ctx = AppContext::new(config);

    let cleanup = start_cleanup_task(ctx.uploads.clone(), CLEANUP_INTERVAL_SECS);
    let uploads = ctx.uploads.clone();

    let app = create_router(ctx, static_dir);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cleanup.abort();
    tracing::info!(
        pending_uploads = uploads.len(),
        "Server shutdown complete, discarding pending uploads"
    );
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received");
}
