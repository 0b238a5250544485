use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;

use crate::{error::Result, storage::local::sanitize_filename, AppState};

#[utoipa::path(
    get,
    path = "/api/v1/files/resumes/{filename}",
    params(
        ("filename" = String, Path, description = "Stored resume filename")
    ),
    responses(
        (status = 200, description = "Resume file streamed as an attachment"),
        (status = 404, description = "File not found")
    )
)]
#[axum::debug_handler]
pub async fn download_resume(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse> {
    let (file, size) = state.files.open(&filename).await?;
    let filename = sanitize_filename(&filename);
    tracing::debug!(filename = %filename, size, "Serving resume");

    let mut response = Response::new(Body::from_stream(ReaderStream::new(file)));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(size));
    if let Ok(disposition) =
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
    {
        headers.insert(header::CONTENT_DISPOSITION, disposition);
    }
    Ok(response)
}
