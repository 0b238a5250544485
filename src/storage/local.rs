use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::fs;

use super::FileStore;
use crate::error::{Error, Result};

pub const RESUME_ROUTE: &str = "/api/v1/files/resumes";

/// Suffix of a file still being written.
const PARTIAL_SUFFIX: &str = ".part";

/// Filesystem-backed résumé store. Locators are public URLs served by the
/// résumé download route.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    upload_dir: PathBuf,
    base_url: String,
}

impl LocalStorage {
    pub async fn new(upload_dir: impl Into<PathBuf>, base_url: impl Into<String>) -> Result<Self> {
        let upload_dir = upload_dir.into();
        fs::create_dir_all(&upload_dir).await.map_err(|e| {
            Error::Config(format!(
                "Failed to create upload directory {}: {}",
                upload_dir.display(),
                e
            ))
        })?;

        Ok(Self {
            upload_dir,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn locator_for(&self, filename: &str) -> String {
        format!("{}{}/{}", self.base_url, RESUME_ROUTE, filename)
    }

    /// Opens a stored file for streaming, returning it with its size in bytes.
    pub async fn open(&self, filename: &str) -> Result<(fs::File, u64)> {
        let filename = sanitize_filename(filename);
        if filename.is_empty() || filename.ends_with(PARTIAL_SUFFIX) {
            return Err(Error::NotFound("File not found".into()));
        }

        let root = fs::canonicalize(&self.upload_dir).await?;
        let path = match fs::canonicalize(root.join(&filename)).await {
            Ok(path) => path,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NotFound("File not found".into()))
            }
            Err(e) => return Err(e.into()),
        };
        if !path.starts_with(&root) {
            tracing::warn!(filename = %filename, "Rejected file path outside upload directory");
            return Err(Error::NotFound("File not found".into()));
        }

        let file = fs::File::open(&path).await?;
        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Err(Error::NotFound("File not found".into()));
        }
        Ok((file, metadata.len()))
    }
}

#[async_trait]
impl FileStore for LocalStorage {
    async fn upload(&self, filename: &str, content: Bytes) -> Result<String> {
        let filename = sanitize_filename(filename);
        if filename.is_empty() {
            return Err(Error::FileStorage("Empty filename".into()));
        }
        let path = self.upload_dir.join(&filename);
        let partial = self.upload_dir.join(format!("{}{}", filename, PARTIAL_SUFFIX));

        fs::create_dir_all(&self.upload_dir).await?;
        if let Err(e) = fs::write(&partial, &content).await {
            tracing::error!(path = %partial.display(), error = %e, "Failed to write file");
            let _ = fs::remove_file(&partial).await;
            return Err(Error::FileStorage(format!("Failed to write file: {}", e)));
        }
        fs::rename(&partial, &path).await.map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "Failed to move file into place");
            Error::FileStorage(format!("Failed to store file: {}", e))
        })?;

        let locator = self.locator_for(&filename);
        tracing::info!(
            filename = %filename,
            path = %path.display(),
            url = %locator,
            size = content.len(),
            "File uploaded successfully"
        );
        Ok(locator)
    }

    async fn delete(&self, locator: &str) -> Result<()> {
        let filename = sanitize_filename(&filename_from_locator(locator));
        if filename.is_empty() {
            return Err(Error::FileStorage(
                "Invalid locator: cannot extract filename".into(),
            ));
        }

        let path = self.upload_dir.join(&filename);
        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(filename = %filename, path = %path.display(), "File deleted successfully");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "File does not exist");
                Ok(())
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Failed to delete file");
                Err(Error::FileStorage(format!("Failed to delete file: {}", e)))
            }
        }
    }

    // No expiry is enforced for files served from local disk.
    async fn signed_url(&self, locator: &str, _expiration: Duration) -> Result<String> {
        Ok(locator.to_string())
    }
}

/// Replaces path separators, `..` and characters unsafe in filenames with `_`.
pub fn sanitize_filename(filename: &str) -> String {
    let mut out = filename.replace(['/', '\\'], "_").replace("..", "_");
    out = out.replace(['<', '>', ':', '"', '|', '?', '*'], "_");
    out.trim().to_string()
}

/// Last path segment of a locator, which may be an absolute URL or a bare path.
pub fn filename_from_locator(locator: &str) -> String {
    let path = locator.split(['?', '#']).next().unwrap_or_default();
    path.rsplit('/').next().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn storage() -> (TempDir, LocalStorage) {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path().join("resumes"), "http://localhost:8081/")
            .await
            .unwrap();
        (dir, storage)
    }

    #[test]
    fn sanitizes_dangerous_names() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "____etc_passwd");
        assert_eq!(sanitize_filename("a<b>c:d\"e|f?g*h.pdf"), "a_b_c_d_e_f_g_h.pdf");
        assert_eq!(sanitize_filename("jane_example.com_1.pdf"), "jane_example.com_1.pdf");
    }

    #[test]
    fn extracts_filename_from_locators() {
        assert_eq!(
            filename_from_locator("http://localhost:8081/api/v1/files/resumes/jane_example.com_17.pdf"),
            "jane_example.com_17.pdf"
        );
        assert_eq!(filename_from_locator("resumes/cv.docx"), "cv.docx");
        assert_eq!(filename_from_locator("http://localhost:8081/"), "");
    }

    #[tokio::test]
    async fn upload_open_delete() {
        let (_dir, storage) = storage().await;
        let locator = storage
            .upload("jane_example.com_1.pdf", Bytes::from_static(b"%PDF-1.4 test"))
            .await
            .unwrap();
        assert_eq!(
            locator,
            "http://localhost:8081/api/v1/files/resumes/jane_example.com_1.pdf"
        );
        assert!(!storage
            .upload_dir()
            .join("jane_example.com_1.pdf.part")
            .exists());

        let (_file, size) = storage.open("jane_example.com_1.pdf").await.unwrap();
        assert_eq!(size, 13);

        storage.delete(&locator).await.unwrap();
        assert!(matches!(
            storage.open("jane_example.com_1.pdf").await,
            Err(Error::NotFound(_))
        ));
        // second delete is a no-op
        storage.delete(&locator).await.unwrap();
    }

    #[tokio::test]
    async fn open_refuses_traversal() {
        let (dir, storage) = storage().await;
        std::fs::write(dir.path().join("secret.txt"), b"secret").unwrap();
        assert!(matches!(
            storage.open("../secret.txt").await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn open_hides_partial_uploads() {
        let (_dir, storage) = storage().await;
        std::fs::write(storage.upload_dir().join("jane_example.com_2.pdf.part"), b"%PDF").unwrap();
        assert!(matches!(
            storage.open("jane_example.com_2.pdf.part").await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn signed_url_is_the_locator() {
        let (_dir, storage) = storage().await;
        let url = storage
            .signed_url("http://localhost:8081/api/v1/files/resumes/a.pdf", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(url, "http://localhost:8081/api/v1/files/resumes/a.pdf");
    }
}
