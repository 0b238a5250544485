use axum::{
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Application already exists for this position")]
    AlreadyExists,

    #[error("Invalid file type: {0}")]
    InvalidFileType(String),

    #[error("File upload failed: {0}")]
    FileUploadFailed(String),

    #[error("File storage error: {0}")]
    FileStorage(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Multipart error: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("Invalid email address: {0}")]
    EmailAddress(#[from] lettre::address::AddressError),

    #[error("Email message error: {0}")]
    EmailMessage(#[from] lettre::error::Error),
}

impl Error {
    /// Machine-readable code sent to clients alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Config(_) => "CONFIG_ERROR",
            Error::BadRequest(_) | Error::Validation(_) | Error::Multipart(_) => {
                "VALIDATION_FAILED"
            }
            Error::NotFound(_) => "NOT_FOUND",
            Error::AlreadyExists => "ALREADY_EXISTS",
            Error::InvalidFileType(_) => "INVALID_FILE_TYPE",
            Error::FileUploadFailed(_) => "FILE_UPLOAD_FAILED",
            Error::FileStorage(_) => "FILE_STORAGE_ERROR",
            Error::Database(_) => "STORAGE_FAILURE",
            Error::Cancelled => "CANCELLED",
            Error::Smtp(_) | Error::EmailAddress(_) | Error::EmailMessage(_) => "EMAIL_ERROR",
            Error::Internal(_) | Error::Io(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let code = self.code();
        let (status, message) = match self {
            Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Error::AlreadyExists => (
                StatusCode::CONFLICT,
                "An application for this position already exists for this email".to_string(),
            ),
            Error::InvalidFileType(_) => (
                StatusCode::BAD_REQUEST,
                "Only PDF, DOC, and DOCX files are allowed".to_string(),
            ),
            Error::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Error::Multipart(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            Error::FileUploadFailed(err) => {
                tracing::error!(error = %err, "Resume upload failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to store resume file".to_string(),
                )
            }
            Error::Database(err) => {
                tracing::error!(error = ?err, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A storage error occurred".to_string(),
                )
            }
            Error::Cancelled => (
                StatusCode::SERVICE_UNAVAILABLE,
                "The request was cancelled before it completed".to_string(),
            ),
            err @ (Error::Smtp(_) | Error::EmailAddress(_) | Error::EmailMessage(_)) => {
                tracing::error!(error = %err, "Email delivery error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to send email".to_string(),
                )
            }
            other => {
                tracing::error!(error = %other, "Unhandled error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": code, "message": message }));
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(ref db) if db.is_unique_violation() => Error::AlreadyExists,
            other => Error::Database(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value as JsonValue;

    async fn render(err: Error) -> (StatusCode, JsonValue) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), 64 * 1024).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn storage_errors_do_not_leak_details() {
        let (status, body) = render(Error::Database(sqlx::Error::Protocol(
            "syntax error at or near SELECT".into(),
        )))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "STORAGE_FAILURE");
        assert!(!body["message"].as_str().unwrap().contains("SELECT"));
    }

    #[tokio::test]
    async fn client_errors_map_to_4xx() {
        let (status, body) = render(Error::AlreadyExists).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "ALREADY_EXISTS");

        let (status, body) = render(Error::InvalidFileType(".exe".into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "INVALID_FILE_TYPE");

        let (status, body) = render(Error::NotFound("Application not found".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Application not found");
    }

    #[test]
    fn row_not_found_becomes_not_found() {
        assert!(matches!(
            Error::from(sqlx::Error::RowNotFound),
            Error::NotFound(_)
        ));
        assert!(matches!(
            Error::from(sqlx::Error::PoolTimedOut),
            Error::Database(_)
        ));
    }
}
