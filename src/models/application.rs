use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "text", rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Reviewing,
    Interview,
    Offered,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 6] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Reviewing,
        ApplicationStatus::Interview,
        ApplicationStatus::Offered,
        ApplicationStatus::Rejected,
        ApplicationStatus::Withdrawn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Reviewing => "reviewing",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Offered => "offered",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown application status: {}", s))
    }
}

/// Where a submission came from, captured at the HTTP edge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMetadata {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Application {
    pub id: Uuid,
    pub position_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub cover_letter: String,
    pub resume_url: String,
    pub status: ApplicationStatus,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub source: Option<String>,
    pub processed_at: Option<DateTime<Utc>>,
    pub processed_by: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    /// Any status may follow any other; processing fields are refreshed on every call.
    pub fn update_status(&mut self, status: ApplicationStatus, processed_by: &str) {
        let now = Utc::now();
        self.status = status;
        self.processed_at = Some(now);
        self.processed_by = Some(processed_by.to_string());
        self.updated_at = now;
    }

    /// A withdrawn application no longer blocks a new one for the same position.
    pub fn blocks_resubmission(&self) -> bool {
        self.status != ApplicationStatus::Withdrawn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Application {
        let now = Utc::now();
        Application {
            id: Uuid::new_v4(),
            position_id: "senior-ai-engineer".into(),
            name: "Jane Doe".into(),
            email: "jane@example.com".into(),
            phone: None,
            cover_letter: "Hello".into(),
            resume_url: "http://localhost/api/v1/files/resumes/jane.pdf".into(),
            status: ApplicationStatus::Pending,
            ip_address: None,
            user_agent: None,
            source: Some("web".into()),
            processed_at: None,
            processed_by: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in ApplicationStatus::ALL {
            assert_eq!(status.as_str().parse::<ApplicationStatus>().unwrap(), status);
        }
        assert!("archived".parse::<ApplicationStatus>().is_err());
        assert_eq!(
            serde_json::to_value(ApplicationStatus::Interview).unwrap(),
            serde_json::json!("interview")
        );
    }

    #[test]
    fn every_transition_is_allowed_and_stamps_processing() {
        let mut app = sample();
        app.update_status(ApplicationStatus::Rejected, "hr@example.com");
        assert_eq!(app.status, ApplicationStatus::Rejected);
        let first = app.processed_at.expect("processed_at set");

        app.update_status(ApplicationStatus::Pending, "lead@example.com");
        assert_eq!(app.status, ApplicationStatus::Pending);
        assert_eq!(app.processed_by.as_deref(), Some("lead@example.com"));
        assert!(app.processed_at.unwrap() >= first);
        assert_eq!(app.updated_at, app.processed_at.unwrap());
    }

    #[test]
    fn only_withdrawn_applications_allow_resubmission() {
        let mut app = sample();
        assert!(app.blocks_resubmission());
        app.update_status(ApplicationStatus::Withdrawn, "candidate");
        assert!(!app.blocks_resubmission());
    }
}
