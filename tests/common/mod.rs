#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, Response},
    Router,
};
use careers_backend::{
    error::Result,
    notifications::Notifier,
    repositories::InMemoryApplicationRepository,
    routes,
    services::{application_service::ApplicationService, background::BackgroundQueue},
    storage::LocalStorage,
    AppState,
};
use serde_json::Value as JsonValue;
use tempfile::TempDir;

pub const BOUNDARY: &str = "careers-test-boundary";
pub const MAX_FILE_SIZE: usize = 1024;

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Confirmation { email: String, name: String, position: String },
    HrAlert { email: String, resume_url: String },
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<Sent>>,
}

impl RecordingNotifier {
    pub async fn wait_for(&self, count: usize) -> Vec<Sent> {
        for _ in 0..100 {
            let sent = self.sent.lock().unwrap().clone();
            if sent.len() >= count {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_candidate_confirmation(
        &self,
        candidate_email: &str,
        candidate_name: &str,
        position: &str,
    ) -> Result<()> {
        self.sent.lock().unwrap().push(Sent::Confirmation {
            email: candidate_email.to_string(),
            name: candidate_name.to_string(),
            position: position.to_string(),
        });
        Ok(())
    }

    async fn send_hr_alert(
        &self,
        candidate_email: &str,
        _candidate_name: &str,
        _position: &str,
        resume_url: &str,
    ) -> Result<()> {
        self.sent.lock().unwrap().push(Sent::HrAlert {
            email: candidate_email.to_string(),
            resume_url: resume_url.to_string(),
        });
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub repo: InMemoryApplicationRepository,
    pub storage: Arc<LocalStorage>,
    pub notifier: Arc<RecordingNotifier>,
    _dir: TempDir,
}

pub async fn setup_app() -> TestApp {
    let dir = TempDir::new().expect("temp dir");
    let storage = Arc::new(
        LocalStorage::new(dir.path().join("resumes"), "http://localhost:8081")
            .await
            .expect("storage"),
    );
    let repo = InMemoryApplicationRepository::new();
    let notifier = Arc::new(RecordingNotifier::default());
    let (queue, _worker) = BackgroundQueue::start();

    let service = ApplicationService::new(
        Arc::new(repo.clone()),
        storage.clone(),
        notifier.clone(),
        queue,
    );
    let router = routes::router(AppState::new(service, storage.clone(), MAX_FILE_SIZE));

    TestApp {
        router,
        repo,
        storage,
        notifier,
        _dir: dir,
    }
}

/// Builds a multipart body from text fields and an optional `(filename, bytes)` résumé.
pub fn multipart_body(fields: &[(&str, &str)], resume: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((filename, bytes)) = resume {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"resume\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn candidate_fields<'a>(email: &'a str, position: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("fullName", "Jane Doe"),
        ("email", email),
        ("phone", "+15551234567"),
        ("position", position),
        ("coverLetter", "I have shipped Rust services for five years."),
    ]
}

pub fn submit_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/applications")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .header("user-agent", "careers-tests/1.0")
        .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
        .body(Body::from(body))
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: Option<JsonValue>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn body_json(resp: Response<Body>) -> JsonValue {
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
