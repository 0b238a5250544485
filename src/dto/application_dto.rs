use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{Error, Result};
use crate::models::application::{Application, ApplicationStatus};
use crate::repositories::{
    ApplicationFilter, SortField, SortOrder, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
use crate::services::application_service::{ApplicationList, NewApplication};
use crate::utils::time;

pub const DEFAULT_SIGNED_URL_SECS: u64 = 3600;
pub const MAX_SIGNED_URL_SECS: u64 = 7 * 24 * 3600;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateApplicationRequest {
    #[validate(length(min = 1, max = 100))]
    pub position_id: String,
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 10, max = 20))]
    pub phone: Option<String>,
    #[validate(length(max = 2000))]
    pub cover_letter: String,
}

impl From<CreateApplicationRequest> for NewApplication {
    fn from(req: CreateApplicationRequest) -> Self {
        NewApplication {
            position_id: req.position_id,
            name: req.name,
            email: req.email,
            phone: req.phone,
            cover_letter: req.cover_letter,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationResponse {
    pub id: Uuid,
    pub position_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub cover_letter: String,
    pub resume_url: String,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl From<Application> for ApplicationResponse {
    fn from(app: Application) -> Self {
        Self {
            id: app.id,
            position_id: app.position_id,
            name: app.name,
            email: app.email,
            phone: app.phone,
            cover_letter: app.cover_letter,
            resume_url: app.resume_url,
            status: app.status,
            created_at: app.created_at,
            updated_at: app.updated_at,
            processed_at: app.processed_at,
            processed_by: app.processed_by,
            notes: app.notes,
        }
    }
}

/// Raw list query. Values stay strings so malformed paging can fall back to defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ListApplicationsQuery {
    pub position_id: Option<String>,
    pub status: Option<String>,
    pub email: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl ListApplicationsQuery {
    pub fn into_filter(self) -> Result<ApplicationFilter> {
        let page = non_empty(&self.page)
            .and_then(|p| p.parse::<i64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1);
        let page_size = non_empty(&self.page_size)
            .and_then(|p| p.parse::<i64>().ok())
            .filter(|p| (1..=MAX_PAGE_SIZE).contains(p))
            .unwrap_or(DEFAULT_PAGE_SIZE);

        let status = non_empty(&self.status)
            .map(|s| s.parse::<ApplicationStatus>().map_err(Error::BadRequest))
            .transpose()?;
        let sort_by = match non_empty(&self.sort_by) {
            Some(raw) => SortField::parse(raw)
                .ok_or_else(|| Error::BadRequest(format!("Invalid sort_by: {}", raw)))?,
            None => SortField::default(),
        };
        let sort_order = match non_empty(&self.sort_order) {
            Some(raw) => SortOrder::parse(raw)
                .ok_or_else(|| Error::BadRequest(format!("Invalid sort_order: {}", raw)))?,
            None => SortOrder::default(),
        };

        let date_from = non_empty(&self.date_from)
            .map(|raw| {
                time::parse_date_bound(raw, false)
                    .ok_or_else(|| Error::BadRequest(format!("Invalid date_from: {}", raw)))
            })
            .transpose()?;
        let date_to = non_empty(&self.date_to)
            .map(|raw| {
                time::parse_date_bound(raw, true)
                    .ok_or_else(|| Error::BadRequest(format!("Invalid date_to: {}", raw)))
            })
            .transpose()?;

        Ok(ApplicationFilter {
            position_id: non_empty(&self.position_id).map(str::to_string),
            status,
            email: non_empty(&self.email).map(str::to_string),
            date_from,
            date_to,
            page,
            page_size,
            sort_by,
            sort_order,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationResponse {
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

pub fn calculate_pagination(page: i64, page_size: i64, total: i64) -> PaginationResponse {
    let total_pages = if page_size > 0 {
        (total + page_size - 1) / page_size
    } else {
        0
    };
    PaginationResponse {
        page,
        page_size,
        total,
        total_pages,
        has_next: page < total_pages,
        has_prev: page > 1,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListApplicationsResponse {
    pub applications: Vec<ApplicationResponse>,
    pub pagination: PaginationResponse,
}

impl From<ApplicationList> for ListApplicationsResponse {
    fn from(list: ApplicationList) -> Self {
        Self {
            pagination: calculate_pagination(list.page, list.page_size, list.total),
            applications: list
                .applications
                .into_iter()
                .map(ApplicationResponse::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateApplicationStatusRequest {
    pub status: ApplicationStatus,
    #[validate(length(min = 1, max = 255))]
    pub processed_by: String,
    pub notes: Option<String>,
}

impl UpdateApplicationStatusRequest {
    /// Withdrawal is reserved for internal callers.
    pub fn check_status(&self) -> Result<()> {
        if self.status == ApplicationStatus::Withdrawn {
            return Err(Error::BadRequest(
                "status must be one of: pending, reviewing, interview, offered, rejected".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ResumeUrlQuery {
    pub expires_in: Option<u64>,
}

impl ResumeUrlQuery {
    pub fn expiration_secs(&self) -> Result<u64> {
        match self.expires_in {
            None => Ok(DEFAULT_SIGNED_URL_SECS),
            Some(secs) if (1..=MAX_SIGNED_URL_SECS).contains(&secs) => Ok(secs),
            Some(secs) => Err(Error::BadRequest(format!(
                "expires_in must be between 1 and {} seconds, got {}",
                MAX_SIGNED_URL_SECS, secs
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeUrlResponse {
    pub url: String,
    pub expires_in: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TestEmailQuery {
    #[validate(email)]
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_metadata() {
        let p = calculate_pagination(2, 20, 45);
        assert_eq!((p.total_pages, p.has_next, p.has_prev), (3, true, true));

        let p = calculate_pagination(1, 20, 5);
        assert_eq!((p.total_pages, p.has_next, p.has_prev), (1, false, false));

        let p = calculate_pagination(1, 20, 0);
        assert_eq!((p.total_pages, p.has_next, p.has_prev), (0, false, false));
    }

    #[test]
    fn malformed_paging_falls_back_to_defaults() {
        let filter = ListApplicationsQuery {
            page: Some("abc".into()),
            page_size: Some("1000".into()),
            ..Default::default()
        }
        .into_filter()
        .unwrap();
        assert_eq!((filter.page, filter.page_size), (1, DEFAULT_PAGE_SIZE));
        assert_eq!(filter.sort_by, SortField::CreatedAt);
        assert_eq!(filter.sort_order, SortOrder::Desc);
    }

    #[test]
    fn unknown_sort_and_status_are_rejected() {
        for query in [
            ListApplicationsQuery {
                sort_by: Some("salary".into()),
                ..Default::default()
            },
            ListApplicationsQuery {
                sort_order: Some("sideways".into()),
                ..Default::default()
            },
            ListApplicationsQuery {
                status: Some("archived".into()),
                ..Default::default()
            },
            ListApplicationsQuery {
                date_from: Some("yesterday".into()),
                ..Default::default()
            },
        ] {
            assert!(matches!(query.into_filter(), Err(Error::BadRequest(_))));
        }
    }

    #[test]
    fn parses_full_query() {
        let filter = ListApplicationsQuery {
            position_id: Some("backend-engineer".into()),
            status: Some("interview".into()),
            email: Some("EXAMPLE.com".into()),
            date_from: Some("2026-01-01".into()),
            date_to: Some("2026-01-31".into()),
            page: Some("3".into()),
            page_size: Some("50".into()),
            sort_by: Some("name".into()),
            sort_order: Some("ASC".into()),
        }
        .into_filter()
        .unwrap();
        assert_eq!(filter.status, Some(ApplicationStatus::Interview));
        assert_eq!(filter.email.as_deref(), Some("EXAMPLE.com"));
        assert_eq!((filter.page, filter.page_size), (3, 50));
        assert_eq!((filter.sort_by, filter.sort_order), (SortField::Name, SortOrder::Asc));
        assert!(filter.date_to.unwrap() > filter.date_from.unwrap());
    }

    #[test]
    fn create_request_rules() {
        let valid = CreateApplicationRequest {
            position_id: "backend-engineer".into(),
            name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            phone: Some("+15551234567".into()),
            cover_letter: "Hello".into(),
        };
        assert!(valid.validate().is_ok());

        let bad = CreateApplicationRequest {
            name: "J".into(),
            email: "not-an-email".into(),
            phone: Some("123".into()),
            ..valid.clone()
        };
        let errors = bad.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("phone"));

        let no_phone = CreateApplicationRequest { phone: None, ..valid };
        assert!(no_phone.validate().is_ok());
    }

    #[test]
    fn withdrawn_is_not_an_accepted_status_update() {
        let req: UpdateApplicationStatusRequest = serde_json::from_value(serde_json::json!({
            "status": "withdrawn",
            "processed_by": "hr@example.com"
        }))
        .unwrap();
        assert!(req.check_status().is_err());
    }

    #[test]
    fn resume_url_expiry_bounds() {
        assert_eq!(ResumeUrlQuery::default().expiration_secs().unwrap(), 3600);
        assert!(ResumeUrlQuery { expires_in: Some(0) }.expiration_secs().is_err());
        assert!(ResumeUrlQuery { expires_in: Some(MAX_SIGNED_URL_SECS + 1) }
            .expiration_secs()
            .is_err());
    }
}
