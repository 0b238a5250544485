pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod notifications;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod storage;
pub mod utils;

use std::sync::Arc;

use crate::services::application_service::ApplicationService;
use crate::storage::LocalStorage;

#[derive(Clone)]
pub struct AppState {
    pub application_service: ApplicationService,
    /// Serves résumé downloads from the same directory the workflow uploads to.
    pub files: Arc<LocalStorage>,
    pub max_file_size: usize,
}

impl AppState {
    pub fn new(
        application_service: ApplicationService,
        files: Arc<LocalStorage>,
        max_file_size: usize,
    ) -> Self {
        Self {
            application_service,
            files,
            max_file_size,
        }
    }
}
