pub mod local;

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

pub use local::LocalStorage;

/// Durable storage for résumé bytes, addressed by an opaque locator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Stores `content` and returns the locator it can be retrieved by.
    async fn upload(&self, filename: &str, content: Bytes) -> Result<String>;

    /// Removes the object behind `locator`. Deleting a missing object succeeds.
    async fn delete(&self, locator: &str) -> Result<()>;

    /// Returns a retrievable URL for `locator`, valid for at most `expiration`.
    async fn signed_url(&self, locator: &str, expiration: Duration) -> Result<String>;
}
