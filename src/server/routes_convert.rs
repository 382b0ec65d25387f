//! Upload and conversion API routes.
//!
//! Two ways to convert a file:
//!
//! - Two steps: `POST /{kind}/uploads` stores the file and returns an id,
//!   then `POST /uploads/{id}/convert?format=..` returns the converted bytes.
//!   The same upload can be converted any number of times until it is
//!   deleted or expires.
//! - One shot: `POST /{kind}/convert?format=..` with the file in the body.

use axum::{
    body::Body,
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bytes::{Bytes, BytesMut};
use formatfusion_av::{ImageInfo, MediaKind, TargetFormat};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AppContext, AppError};
use crate::converter::{TranscodedAsset, UploadRecord};

/// Name of the multipart field carrying the file.
const FILE_FIELD: &str = "file";

/// Name of the optional multipart field carrying the target format.
const FORMAT_FIELD: &str = "format";

pub fn convert_routes() -> Router<AppContext> {
    Router::new()
        .route("/:kind/uploads", post(create_upload))
        .route("/:kind/convert", post(convert_once))
        .route("/uploads/:id", get(get_upload).delete(delete_upload))
        .route("/uploads/:id/convert", post(convert_upload))
}

// ============================================================================
// Request / response types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ConvertQuery {
    /// Target format, e.g. `webp`.
    pub format: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    #[serde(flatten)]
    pub upload: UploadRecord,
    /// Formats this upload can be converted to.
    pub targets: Vec<TargetFormat>,
    /// Inspection result, for image uploads that could be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageInfo>,
}

/// A file received from a multipart body.
struct ReceivedFile {
    filename: String,
    data: Bytes,
    format: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Store an upload and describe it.
async fn create_upload(
    State(ctx): State<AppContext>,
    Path(kind): Path<String>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let kind = parse_kind(&kind)?;
    let file = read_upload(multipart, ctx.config.server.max_upload_bytes()).await?;

    let upload = ctx.converter.receive(kind, &file.filename, &file.data)?;

    // Inspection is informational; an unreadable image is still accepted.
    let image = match ctx.converter.inspect(&upload).await {
        Ok(info) => info,
        Err(e) => {
            tracing::warn!(upload_id = %upload.id(), "Could not inspect upload: {}", e);
            None
        }
    };

    let upload = ctx.uploads.insert(upload);

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            upload: upload.record(),
            targets: kind.targets(),
            image,
        }),
    ))
}

async fn get_upload(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<Json<UploadRecord>, AppError> {
    let id = parse_id(&id)?;
    let upload = ctx
        .uploads
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("Upload not found: {}", id)))?;
    Ok(Json(upload.record()))
}

async fn delete_upload(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    if ctx.uploads.remove(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Upload not found: {}", id)))
    }
}

/// Convert a stored upload and return the result as a download.
async fn convert_upload(
    State(ctx): State<AppContext>,
    Path(id): Path<String>,
    Query(query): Query<ConvertQuery>,
) -> Result<Response, AppError> {
    let id = parse_id(&id)?;
    let upload = ctx
        .uploads
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("Upload not found: {}", id)))?;

    let format = query
        .format
        .ok_or_else(|| AppError::BadRequest("Missing target format".to_string()))?;
    let target = TargetFormat::parse(upload.kind(), &format)?;

    let asset = ctx.converter.transcode(&upload, target).await?;
    Ok(download_response(asset))
}

/// Receive, convert and publish in a single request.
async fn convert_once(
    State(ctx): State<AppContext>,
    Path(kind): Path<String>,
    Query(query): Query<ConvertQuery>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let kind = parse_kind(&kind)?;
    let file = read_upload(multipart, ctx.config.server.max_upload_bytes()).await?;

    let format = query
        .format
        .or(file.format)
        .ok_or_else(|| AppError::BadRequest("Missing target format".to_string()))?;
    let target = TargetFormat::parse(kind, &format)?;

    // Dropped at the end of the request, which removes the stored copy.
    let upload = ctx.converter.receive(kind, &file.filename, &file.data)?;
    let asset = ctx.converter.transcode(&upload, target).await?;

    Ok(download_response(asset))
}

// ============================================================================
// Helpers
// ============================================================================

fn download_response(asset: TranscodedAsset) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, asset.content_type().to_string()),
            (header::CONTENT_DISPOSITION, asset.content_disposition()),
        ],
        Body::from(asset.bytes),
    )
        .into_response()
}

fn parse_kind(kind: &str) -> Result<MediaKind, AppError> {
    kind.parse::<MediaKind>()
        .map_err(|_| AppError::NotFound(format!("Unknown media kind: {}", kind)))
}

fn parse_id(id: &str) -> Result<Uuid, AppError> {
    id.parse::<Uuid>()
        .map_err(|_| AppError::BadRequest(format!("Invalid upload ID: {}", id)))
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::BadRequest(format!("Failed to read multipart body: {}", e.body_text()))
    }
}

/// Pull the `file` field (and an optional `format` field) out of a multipart body.
async fn read_upload(
    mut multipart: Multipart,
    max_bytes: usize,
) -> Result<ReceivedFile, AppError> {
    let mut file: Option<(String, Bytes)> = None;
    let mut format = None;

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(FILE_FIELD) => {
                if file.is_some() {
                    return Err(AppError::BadRequest(
                        "Only one file can be uploaded at a time".to_string(),
                    ));
                }

                let filename = field.file_name().map(str::to_string).ok_or_else(|| {
                    AppError::BadRequest("File field has no file name".to_string())
                })?;

                let mut data = BytesMut::new();
                while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
                    if data.len() + chunk.len() > max_bytes {
                        return Err(AppError::PayloadTooLarge(format!(
                            "File too large: exceeds maximum of {} bytes",
                            max_bytes
                        )));
                    }
                    data.extend_from_slice(&chunk);
                }

                tracing::debug!(
                    filename = %filename,
                    size_bytes = data.len(),
                    "Received multipart file"
                );
                file = Some((filename, data.freeze()));
            }
            Some(FORMAT_FIELD) => {
                format = Some(field.text().await.map_err(multipart_error)?);
            }
            other => {
                tracing::debug!("Ignoring multipart field {:?}", other);
            }
        }
    }

    let (filename, data) =
        file.ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;

    Ok(ReceivedFile {
        filename,
        data,
        format,
    })
}
