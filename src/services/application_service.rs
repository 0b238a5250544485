use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::application::{Application, ApplicationStatus, RequestMetadata};
use crate::notifications::Notifier;
use crate::repositories::{ApplicationFilter, ApplicationRepository, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::services::background::BackgroundQueue;
use crate::storage::FileStore;
use crate::utils::time;

pub const ALLOWED_RESUME_EXTENSIONS: [&str; 3] = [".pdf", ".doc", ".docx"];

/// Candidate-supplied fields of a submission.
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub position_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub cover_letter: String,
}

#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub filename: String,
    pub content: Bytes,
}

pub struct ApplicationList {
    pub applications: Vec<Application>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

#[derive(Clone)]
pub struct ApplicationService {
    repo: Arc<dyn ApplicationRepository>,
    files: Arc<dyn FileStore>,
    notifier: Arc<dyn Notifier>,
    queue: BackgroundQueue,
}

impl ApplicationService {
    pub fn new(
        repo: Arc<dyn ApplicationRepository>,
        files: Arc<dyn FileStore>,
        notifier: Arc<dyn Notifier>,
        queue: BackgroundQueue,
    ) -> Self {
        Self {
            repo,
            files,
            notifier,
            queue,
        }
    }

    pub async fn submit(
        &self,
        input: NewApplication,
        resume: ResumeUpload,
        metadata: RequestMetadata,
        cancel: &CancellationToken,
    ) -> Result<Application> {
        let existing = until_cancelled(
            cancel,
            self.repo
                .get_by_email_and_position(&input.email, &input.position_id),
        )
        .await?;
        if let Some(existing) = existing.filter(Application::blocks_resubmission) {
            tracing::warn!(
                email = %input.email,
                position = %input.position_id,
                existing_id = %existing.id,
                "Duplicate application rejected"
            );
            return Err(Error::AlreadyExists);
        }

        let extension = resume_extension(&resume.filename)?;

        let now = time::now();
        let filename = format!(
            "{}_{}{}",
            input.email.replace('@', "_"),
            now.timestamp_millis(),
            extension
        );
        // Not raced: cleanup after cancellation needs the locator.
        let resume_url = self
            .files
            .upload(&filename, resume.content)
            .await
            .map_err(|e| {
                tracing::error!(filename = %filename, error = %e, "Resume upload failed");
                Error::FileUploadFailed(e.to_string())
            })?;

        if cancel.is_cancelled() {
            tracing::warn!(filename = %filename, "Submission cancelled after upload");
            self.remove_resume_now(&resume_url).await;
            return Err(Error::Cancelled);
        }

        let application = Application {
            id: Uuid::new_v4(),
            position_id: input.position_id,
            name: input.name,
            email: input.email,
            phone: input.phone.filter(|p| !p.is_empty()),
            cover_letter: input.cover_letter,
            resume_url,
            status: ApplicationStatus::Pending,
            ip_address: metadata.ip_address,
            user_agent: metadata.user_agent,
            source: metadata.source,
            processed_at: None,
            processed_by: None,
            notes: None,
            created_at: now,
            updated_at: now,
        };

        if let Err(e) = self.repo.create(&application).await {
            tracing::error!(
                application_id = %application.id,
                error = %e,
                "Failed to create application record"
            );
            self.remove_resume_now(&application.resume_url).await;
            return Err(e);
        }

        tracing::info!(
            application_id = %application.id,
            email = %application.email,
            position = %application.position_id,
            "Application submitted"
        );
        self.dispatch_notifications(&application);
        Ok(application)
    }

    pub async fn get(&self, id: Uuid, cancel: &CancellationToken) -> Result<Application> {
        until_cancelled(cancel, self.repo.get_by_id(id))
            .await?
            .ok_or_else(|| Error::NotFound("Application not found".into()))
    }

    pub async fn list(
        &self,
        mut filter: ApplicationFilter,
        cancel: &CancellationToken,
    ) -> Result<ApplicationList> {
        if filter.page < 1 {
            filter.page = 1;
        }
        if !(1..=MAX_PAGE_SIZE).contains(&filter.page_size) {
            filter.page_size = DEFAULT_PAGE_SIZE;
        }

        let (applications, total) = until_cancelled(cancel, self.repo.list(&filter)).await?;
        Ok(ApplicationList {
            applications,
            total,
            page: filter.page,
            page_size: filter.page_size,
        })
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
        processed_by: &str,
        notes: Option<String>,
        cancel: &CancellationToken,
    ) -> Result<Application> {
        let mut application = self.get(id, cancel).await?;
        let previous = application.status;

        application.update_status(status, processed_by);
        if let Some(notes) = notes.filter(|n| !n.is_empty()) {
            application.notes = Some(notes);
        }
        self.repo.update(&application).await?;

        tracing::info!(
            application_id = %id,
            from = %previous,
            to = %status,
            processed_by = %processed_by,
            "Application status updated"
        );
        Ok(application)
    }

    pub async fn delete(&self, id: Uuid, cancel: &CancellationToken) -> Result<()> {
        let application = self.get(id, cancel).await?;
        self.repo.delete(id).await?;
        tracing::info!(application_id = %id, "Application deleted");

        let files = self.files.clone();
        let locator = application.resume_url;
        self.queue.submit(format!("delete resume {}", id), async move {
            files.delete(&locator).await
        });
        Ok(())
    }

    pub async fn resume_url(
        &self,
        id: Uuid,
        expiration: Duration,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let application = self.get(id, cancel).await?;
        until_cancelled(
            cancel,
            self.files.signed_url(&application.resume_url, expiration),
        )
        .await
    }

    /// Sends a confirmation to `email` and waits for the outcome.
    pub async fn test_email_configuration(&self, email: &str) -> Result<()> {
        self.notifier
            .send_candidate_confirmation(email, "Test Candidate", "Test Position")
            .await
    }

    fn dispatch_notifications(&self, application: &Application) {
        let notifier = self.notifier.clone();
        let (email, name, position) = (
            application.email.clone(),
            application.name.clone(),
            application.position_id.clone(),
        );
        self.queue.submit(
            format!("candidate confirmation {}", application.id),
            async move {
                notifier
                    .send_candidate_confirmation(&email, &name, &position)
                    .await
            },
        );

        let notifier = self.notifier.clone();
        let (email, name, position, resume_url) = (
            application.email.clone(),
            application.name.clone(),
            application.position_id.clone(),
            application.resume_url.clone(),
        );
        self.queue.submit(format!("hr alert {}", application.id), async move {
            notifier
                .send_hr_alert(&email, &name, &position, &resume_url)
                .await
        });
    }

    async fn remove_resume_now(&self, locator: &str) {
        if let Err(e) = self.files.delete(locator).await {
            tracing::error!(locator = %locator, error = %e, "Failed to clean up uploaded resume");
        }
    }
}

/// Returns the lowercased extension, including the dot, if it is an accepted résumé type.
pub fn resume_extension(filename: &str) -> Result<String> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default();

    if ALLOWED_RESUME_EXTENSIONS.contains(&extension.as_str()) {
        Ok(extension)
    } else {
        Err(Error::InvalidFileType(if extension.is_empty() {
            "missing extension".to_string()
        } else {
            extension
        }))
    }
}

async fn until_cancelled<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        result = fut => result,
    }
}
