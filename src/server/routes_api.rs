use crate::server::AppContext;
use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use formatfusion_av::{check_tools, MediaKind};

pub fn api_routes() -> Router<AppContext> {
    Router::new()
        .route("/health", get(health))
        .route("/formats", get(formats))
        .route("/tools", get(get_tools))
}

async fn health(State(ctx): State<AppContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "pending_uploads": ctx.uploads.len(),
    }))
}

/// Accepted upload extensions and offered targets, per media kind.
async fn formats() -> impl IntoResponse {
    let kinds: serde_json::Map<String, serde_json::Value> = MediaKind::all()
        .iter()
        .map(|kind| {
            (
                kind.to_string(),
                serde_json::json!({
                    "uploads": kind.upload_extensions(),
                    "targets": kind.targets(),
                }),
            )
        })
        .collect();

    Json(serde_json::Value::Object(kinds))
}

async fn get_tools(State(ctx): State<AppContext>) -> impl IntoResponse {
    let ffmpeg = ctx.converter.ffmpeg_path().to_path_buf();
    let ffprobe = ctx.converter.ffprobe_path().to_path_buf();

    // Spawning the tools blocks, keep it off the async workers
    let tools = tokio::task::spawn_blocking(move || check_tools(Some(&ffmpeg), Some(&ffprobe)))
        .await
        .unwrap_or_default();

    Json(tools)
}
