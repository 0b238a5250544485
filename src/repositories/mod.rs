pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::application::{Application, ApplicationStatus};

pub use memory::InMemoryApplicationRepository;
pub use postgres::PgApplicationRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Name,
    Email,
    Status,
}

impl SortField {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "created_at" => Some(SortField::CreatedAt),
            "updated_at" => Some(SortField::UpdatedAt),
            "name" => Some(SortField::Name),
            "email" => Some(SortField::Email),
            "status" => Some(SortField::Status),
            _ => None,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::Name => "name",
            SortField::Email => "email",
            SortField::Status => "status",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationFilter {
    pub position_id: Option<String>,
    pub status: Option<ApplicationStatus>,
    /// Case-insensitive substring of the candidate email.
    pub email: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub page: i64,
    pub page_size: i64,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

impl Default for ApplicationFilter {
    fn default() -> Self {
        Self {
            position_id: None,
            status: None,
            email: None,
            date_from: None,
            date_to: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
        }
    }
}

impl ApplicationFilter {
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1) * self.page_size
    }
}

/// Durable storage of application records.
///
/// Lookups return `Ok(None)` for a missing record; `delete` of a missing id
/// fails with `Error::NotFound`. A second non-withdrawn record for the same
/// (email, position) fails `create` or `update` with `Error::AlreadyExists`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    async fn create(&self, application: &Application) -> Result<()>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Application>>;

    async fn get_by_email_and_position(
        &self,
        email: &str,
        position_id: &str,
    ) -> Result<Option<Application>>;

    async fn list(&self, filter: &ApplicationFilter) -> Result<(Vec<Application>, i64)>;

    async fn update(&self, application: &Application) -> Result<()>;

    async fn delete(&self, id: Uuid) -> Result<()>;
}
