use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::Result;

type Job = Pin<Box<dyn Future<Output = Result<()>> + Send + 'static>>;

struct Task {
    label: String,
    job: Job,
}

/// Fire-and-forget work that must not hold up the request that produced it.
#[derive(Clone)]
pub struct BackgroundQueue {
    sender: mpsc::UnboundedSender<Task>,
}

impl BackgroundQueue {
    /// Spawns the worker. It runs until every queue handle is dropped.
    pub fn start() -> (Self, JoinHandle<()>) {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Task>();
        let worker = tokio::spawn(async move {
            while let Some(Task { label, job }) = receiver.recv().await {
                tokio::spawn(async move {
                    match job.await {
                        Ok(()) => tracing::debug!(job = %label, "Background job finished"),
                        Err(e) => tracing::error!(job = %label, error = %e, "Background job failed"),
                    }
                });
            }
            tracing::info!("Background queue stopped");
        });
        (Self { sender }, worker)
    }

    pub fn submit<F>(&self, label: impl Into<String>, job: F)
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        let task = Task {
            label: label.into(),
            job: Box::pin(job),
        };
        if let Err(mpsc::error::SendError(task)) = self.sender.send(task) {
            tracing::warn!(job = %task.label, "Background queue is closed; dropping job");
        }
    }
}
