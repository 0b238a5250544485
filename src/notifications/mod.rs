pub mod email;
mod templates;

use async_trait::async_trait;

use crate::error::Result;

pub use email::EmailNotifier;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Thanks the candidate for applying.
    async fn send_candidate_confirmation(
        &self,
        candidate_email: &str,
        candidate_name: &str,
        position: &str,
    ) -> Result<()>;

    /// Tells HR about a new application. The HR recipient is part of the
    /// notifier's own configuration.
    async fn send_hr_alert(
        &self,
        candidate_email: &str,
        candidate_name: &str,
        position: &str,
        resume_url: &str,
    ) -> Result<()>;
}
