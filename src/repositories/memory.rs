use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use super::{ApplicationFilter, ApplicationRepository, SortField, SortOrder};
use crate::error::{Error, Result};
use crate::models::application::Application;

/// Process-local repository backed by a mutex-guarded map.
#[derive(Clone, Default)]
pub struct InMemoryApplicationRepository {
    records: Arc<Mutex<HashMap<Uuid, Application>>>,
}

impl InMemoryApplicationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, Application>> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn matches(app: &Application, filter: &ApplicationFilter) -> bool {
    if let Some(position_id) = &filter.position_id {
        if &app.position_id != position_id {
            return false;
        }
    }
    if let Some(status) = filter.status {
        if app.status != status {
            return false;
        }
    }
    if let Some(email) = &filter.email {
        if !app.email.to_lowercase().contains(&email.to_lowercase()) {
            return false;
        }
    }
    if let Some(from) = filter.date_from {
        if app.created_at < from {
            return false;
        }
    }
    if let Some(to) = filter.date_to {
        if app.created_at > to {
            return false;
        }
    }
    true
}

fn compare(a: &Application, b: &Application, field: SortField) -> Ordering {
    match field {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        SortField::Name => a.name.cmp(&b.name),
        SortField::Email => a.email.cmp(&b.email),
        SortField::Status => a.status.as_str().cmp(b.status.as_str()),
    }
    .then_with(|| a.id.cmp(&b.id))
}

/// Another non-withdrawn record holds the same (email, position).
fn conflicts_with_live(records: &HashMap<Uuid, Application>, application: &Application) -> bool {
    application.blocks_resubmission()
        && records.values().any(|existing| {
            existing.id != application.id
                && existing.email == application.email
                && existing.position_id == application.position_id
                && existing.blocks_resubmission()
        })
}

#[async_trait]
impl ApplicationRepository for InMemoryApplicationRepository {
    async fn create(&self, application: &Application) -> Result<()> {
        let mut records = self.lock();
        if records.contains_key(&application.id) {
            return Err(Error::AlreadyExists);
        }
        if conflicts_with_live(&records, application) {
            return Err(Error::AlreadyExists);
        }
        records.insert(application.id, application.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Application>> {
        Ok(self.lock().get(&id).cloned())
    }

    async fn get_by_email_and_position(
        &self,
        email: &str,
        position_id: &str,
    ) -> Result<Option<Application>> {
        let records = self.lock();
        let mut found: Vec<&Application> = records
            .values()
            .filter(|app| app.email == email && app.position_id == position_id)
            .collect();
        found.sort_by(|a, b| {
            a.blocks_resubmission()
                .cmp(&b.blocks_resubmission())
                .reverse()
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(found.first().map(|app| (*app).clone()))
    }

    async fn list(&self, filter: &ApplicationFilter) -> Result<(Vec<Application>, i64)> {
        let records = self.lock();
        let mut items: Vec<Application> = records
            .values()
            .filter(|app| matches(app, filter))
            .cloned()
            .collect();
        let total = items.len() as i64;

        items.sort_by(|a, b| {
            let ord = compare(a, b, filter.sort_by);
            match filter.sort_order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });

        let page = items
            .into_iter()
            .skip(filter.offset().max(0) as usize)
            .take(filter.page_size.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn update(&self, application: &Application) -> Result<()> {
        let mut records = self.lock();
        if conflicts_with_live(&records, application) {
            return Err(Error::AlreadyExists);
        }
        match records.get_mut(&application.id) {
            Some(existing) => {
                *existing = application.clone();
                Ok(())
            }
            None => Err(Error::NotFound("Application not found".into())),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        match self.lock().remove(&id) {
            Some(_) => Ok(()),
            None => Err(Error::NotFound("Application not found".into())),
        }
    }
}
