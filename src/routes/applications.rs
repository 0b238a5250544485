use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, ConnectInfo, Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};
use bytes::Bytes;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::application_dto::{
        ApplicationResponse, CreateApplicationRequest, ListApplicationsQuery,
        ListApplicationsResponse, MessageResponse, ResumeUrlQuery, ResumeUrlResponse,
        TestEmailQuery, UpdateApplicationStatusRequest,
    },
    error::{Error, Result},
    models::application::RequestMetadata,
    services::application_service::{resume_extension, ResumeUpload},
    AppState,
};

const SOURCE_WEB: &str = "web";

fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| Error::BadRequest("Invalid application ID".into()))
}

/// First hop of `X-Forwarded-For`, then `X-Real-IP`, then the socket peer.
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    header_value("x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| header_value("x-real-ip").map(str::to_string))
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
}

#[utoipa::path(
    post,
    path = "/api/v1/applications",
    request_body(content = String, content_type = "multipart/form-data", description = "fullName, email, phone, position, coverLetter and a resume file"),
    responses(
        (status = 201, description = "Application submitted", body = ApplicationResponse),
        (status = 400, description = "Missing fields, invalid file type or oversized file"),
        (status = 409, description = "An application for this position already exists"),
        (status = 500, description = "Internal failure")
    )
)]
#[axum::debug_handler]
pub async fn submit_application(
    State(state): State<AppState>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let mut name = String::new();
    let mut email = String::new();
    let mut phone = String::new();
    let mut position = String::new();
    let mut cover_letter = String::new();
    let mut resume: Option<(String, Bytes)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to read multipart field");
        Error::BadRequest("Failed to parse form data".into())
    })? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "fullName" => name = field.text().await?,
            "email" => email = field.text().await?,
            "phone" => phone = field.text().await?,
            "position" => position = field.text().await?,
            "coverLetter" => cover_letter = field.text().await?,
            "resume" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(|e| {
                    tracing::error!(error = %e, "Failed to read resume file");
                    Error::BadRequest("Failed to read resume file".into())
                })?;
                resume = Some((filename, data));
            }
            _ => {}
        }
    }

    let (name, email, position) = (name.trim(), email.trim(), position.trim());
    if name.is_empty() || email.is_empty() || position.is_empty() {
        return Err(Error::BadRequest(
            "Missing required fields: fullName, email, and position are required".into(),
        ));
    }
    let (filename, content) = resume
        .filter(|(filename, _)| !filename.is_empty())
        .ok_or_else(|| Error::BadRequest("Resume file is required".into()))?;
    resume_extension(&filename)?;
    if content.len() > state.max_file_size {
        return Err(Error::BadRequest(format!(
            "File size exceeds maximum allowed size of {} bytes",
            state.max_file_size
        )));
    }

    let phone = phone.trim();
    let request = CreateApplicationRequest {
        position_id: position.to_string(),
        name: name.to_string(),
        email: email.to_string(),
        phone: (!phone.is_empty()).then(|| phone.to_string()),
        cover_letter: cover_letter.trim().to_string(),
    };
    request.validate()?;

    let metadata = RequestMetadata {
        ip_address: client_ip(&headers, peer.map(|ConnectInfo(addr)| addr)),
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        source: Some(SOURCE_WEB.to_string()),
    };

    // The task outlives a dropped handler so the upload and its cleanup finish.
    let service = state.application_service.clone();
    let token = cancel.clone();
    let application = tokio::spawn(async move {
        service
            .submit(
                request.into(),
                ResumeUpload { filename, content },
                metadata,
                &token,
            )
            .await
    })
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Submission task failed");
        Error::Internal("Submission task failed".into())
    })??;

    Ok((
        StatusCode::CREATED,
        Json(ApplicationResponse::from(application)),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/applications",
    params(
        ("position_id" = Option<String>, Query, description = "Filter by position"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("email" = Option<String>, Query, description = "Case-insensitive email substring"),
        ("date_from" = Option<String>, Query, description = "Created on or after (YYYY-MM-DD or RFC 3339)"),
        ("date_to" = Option<String>, Query, description = "Created on or before (YYYY-MM-DD or RFC 3339)"),
        ("page" = Option<i64>, Query, description = "Page number"),
        ("page_size" = Option<i64>, Query, description = "Items per page (1-100)"),
        ("sort_by" = Option<String>, Query, description = "created_at, updated_at, name, email or status"),
        ("sort_order" = Option<String>, Query, description = "asc or desc")
    ),
    responses(
        (status = 200, description = "Applications listed", body = ListApplicationsResponse),
        (status = 400, description = "Invalid filter")
    )
)]
#[axum::debug_handler]
pub async fn list_applications(
    State(state): State<AppState>,
    Query(query): Query<ListApplicationsQuery>,
) -> Result<impl IntoResponse> {
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let filter = query.into_filter()?;
    let list = state.application_service.list(filter, &cancel).await?;
    Ok(Json(ListApplicationsResponse::from(list)))
}

#[utoipa::path(
    get,
    path = "/api/v1/applications/{id}",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    responses(
        (status = 200, description = "Application found", body = ApplicationResponse),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn get_application(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let application = state.application_service.get(parse_id(&id)?, &cancel).await?;
    Ok(Json(ApplicationResponse::from(application)))
}

#[utoipa::path(
    put,
    path = "/api/v1/applications/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    request_body = UpdateApplicationStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApplicationResponse),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn update_application_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<UpdateApplicationStatusRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let id = parse_id(&id)?;
    let Json(payload) = payload.map_err(|e| Error::BadRequest(e.body_text()))?;
    payload.validate()?;
    payload.check_status()?;

    let application = state
        .application_service
        .update_status(
            id,
            payload.status,
            payload.processed_by.trim(),
            payload.notes,
            &cancel,
        )
        .await?;
    Ok(Json(ApplicationResponse::from(application)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/applications/{id}",
    params(
        ("id" = Uuid, Path, description = "Application ID")
    ),
    responses(
        (status = 200, description = "Application deleted", body = MessageResponse),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_application(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    state
        .application_service
        .delete(parse_id(&id)?, &cancel)
        .await?;
    Ok(Json(MessageResponse::new("Application deleted successfully")))
}

#[utoipa::path(
    get,
    path = "/api/v1/applications/{id}/resume-url",
    params(
        ("id" = Uuid, Path, description = "Application ID"),
        ("expires_in" = Option<u64>, Query, description = "Lifetime in seconds (default 3600)")
    ),
    responses(
        (status = 200, description = "Resume URL", body = ResumeUrlResponse),
        (status = 400, description = "Invalid expiry"),
        (status = 404, description = "Application not found")
    )
)]
#[axum::debug_handler]
pub async fn get_resume_url(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ResumeUrlQuery>,
) -> Result<impl IntoResponse> {
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let id = parse_id(&id)?;
    let expires_in = query.expiration_secs()?;
    let url = state
        .application_service
        .resume_url(id, Duration::from_secs(expires_in), &cancel)
        .await?;
    Ok(Json(ResumeUrlResponse { url, expires_in }))
}

#[utoipa::path(
    get,
    path = "/api/v1/test-email",
    params(
        ("email" = String, Query, description = "Recipient of the test message")
    ),
    responses(
        (status = 200, description = "Test email sent", body = MessageResponse),
        (status = 400, description = "Invalid email"),
        (status = 500, description = "Email delivery failed")
    )
)]
#[axum::debug_handler]
pub async fn test_email(
    State(state): State<AppState>,
    Query(query): Query<TestEmailQuery>,
) -> Result<impl IntoResponse> {
    query.validate()?;
    state
        .application_service
        .test_email_configuration(&query.email)
        .await?;
    Ok(Json(MessageResponse::new(format!(
        "Test email sent to {}",
        query.email
    ))))
}
