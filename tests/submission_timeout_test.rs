mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::StatusCode;
use bytes::Bytes;
use careers_backend::{
    error::Result,
    repositories::{ApplicationFilter, ApplicationRepository, InMemoryApplicationRepository},
    routes,
    services::{application_service::ApplicationService, background::BackgroundQueue},
    storage::{FileStore, LocalStorage},
    AppState,
};
use common::{candidate_fields, multipart_body, submit_request, RecordingNotifier, MAX_FILE_SIZE};
use tempfile::TempDir;
use tower::ServiceExt;
use tower_http::timeout::TimeoutLayer;

#[derive(Default)]
struct SlowStore {
    started: AtomicUsize,
    finished: AtomicUsize,
    deleted: AtomicUsize,
}

#[async_trait]
impl FileStore for SlowStore {
    async fn upload(&self, filename: &str, _content: Bytes) -> Result<String> {
        self.started.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(200)).await;
        self.finished.fetch_add(1, Ordering::SeqCst);
        Ok(format!("http://localhost:8081/api/v1/files/resumes/{}", filename))
    }

    async fn delete(&self, _locator: &str) -> Result<()> {
        self.deleted.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn signed_url(&self, locator: &str, _expiration: Duration) -> Result<String> {
        Ok(locator.to_string())
    }
}

#[tokio::test]
async fn timed_out_submission_finishes_upload_and_removes_it() {
    let dir = TempDir::new().unwrap();
    let downloads = Arc::new(
        LocalStorage::new(dir.path().join("resumes"), "http://localhost:8081")
            .await
            .unwrap(),
    );
    let store = Arc::new(SlowStore::default());
    let repo = InMemoryApplicationRepository::new();
    let notifier = Arc::new(RecordingNotifier::default());
    let (queue, _worker) = BackgroundQueue::start();

    let service = ApplicationService::new(
        Arc::new(repo.clone()),
        store.clone(),
        notifier.clone(),
        queue,
    );
    let router = routes::router(AppState::new(service, downloads, MAX_FILE_SIZE))
        .layer(TimeoutLayer::new(Duration::from_millis(30)));

    let body = multipart_body(
        &candidate_fields("slow@example.com", "backend-engineer"),
        Some(("resume.pdf", &b"%PDF-1.4"[..])),
    );
    let resp = router.oneshot(submit_request(body)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::REQUEST_TIMEOUT);

    for _ in 0..100 {
        if store.deleted.load(Ordering::SeqCst) > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    // Give a stray create a chance to land before asserting on the repository.
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(store.started.load(Ordering::SeqCst), 1);
    assert_eq!(store.finished.load(Ordering::SeqCst), 1);
    assert_eq!(store.deleted.load(Ordering::SeqCst), 1);

    let (records, total) = repo.list(&ApplicationFilter::default()).await.unwrap();
    assert!(records.is_empty());
    assert_eq!(total, 0);
    assert!(notifier.sent.lock().unwrap().is_empty());
}
