//! Flat on-disk storage for ticket attachments.
//!
//! Files are stored under their sanitized client-supplied name directly in
//! the configured directory. Two uploads with the same name overwrite each
//! other (last write wins); each write lands via a temp file and rename so a
//! reader never sees a partially written file.

use std::io;
use std::path::PathBuf;

use axum::body::Bytes;
use deskline_core::error::CoreError;
use deskline_core::upload::{parse_extension_list, validate_upload, DEFAULT_ALLOWED_EXTENSIONS};
use uuid::Uuid;

/// Default request body limit for uploads (10 MiB).
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Attachment storage settings.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Directory attachments are written to and served from.
    pub dir: PathBuf,
    /// Lowercase extensions (without the dot) accepted for upload.
    pub allowed_extensions: Vec<String>,
    /// Maximum accepted request body size in bytes.
    pub max_bytes: usize,
}

impl UploadConfig {
    /// Load upload configuration from environment variables.
    ///
    /// | Env Var              | Default                |
    /// |----------------------|------------------------|
    /// | `UPLOAD_DIR`         | `uploads`              |
    /// | `ALLOWED_EXTENSIONS` | `png,jpg,jpeg,gif,pdf` |
    /// | `MAX_UPLOAD_BYTES`   | `10485760`             |
    pub fn from_env() -> Self {
        let dir = PathBuf::from(std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".into()));

        let allowed_extensions = match std::env::var("ALLOWED_EXTENSIONS") {
            Ok(raw) => parse_extension_list(&raw),
            Err(_) => DEFAULT_ALLOWED_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
        };
        assert!(
            !allowed_extensions.is_empty(),
            "ALLOWED_EXTENSIONS must name at least one extension"
        );

        let max_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_BYTES.to_string())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        Self {
            dir,
            allowed_extensions,
            max_bytes,
        }
    }
}

/// A validated file waiting to be written alongside its database row.
#[derive(Debug, Clone)]
pub struct PendingUpload {
    /// Sanitized filename, as stored in `attachments.filename`.
    pub filename: String,
    pub bytes: Bytes,
}

/// Handle to the upload directory.
#[derive(Debug)]
pub struct UploadStore {
    dir: PathBuf,
    allowed_extensions: Vec<String>,
}

impl UploadStore {
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            allowed_extensions: config.allowed_extensions.clone(),
        }
    }

    /// Create the upload directory if it does not exist.
    pub async fn ensure_dir(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    pub fn allowed_extensions(&self) -> &[String] {
        &self.allowed_extensions
    }

    /// Sanitize a client filename and check its extension.
    ///
    /// Nothing is written; a rejected file leaves no trace.
    pub fn accept(&self, raw_filename: &str, bytes: Bytes) -> Result<PendingUpload, CoreError> {
        let filename = validate_upload(raw_filename, &self.allowed_extensions)?;
        Ok(PendingUpload { filename, bytes })
    }

    /// Full path of a stored file.
    pub fn path_of(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    /// Whether a file with this name is already stored.
    pub async fn exists(&self, filename: &str) -> bool {
        tokio::fs::try_exists(self.path_of(filename))
            .await
            .unwrap_or(false)
    }

    /// Write an accepted upload, replacing any file of the same name.
    pub async fn write(&self, upload: &PendingUpload) -> io::Result<PathBuf> {
        let target = self.path_of(&upload.filename);
        let temp = self
            .dir
            .join(format!(".{}.{}.tmp", upload.filename, Uuid::new_v4()));

        if let Err(e) = tokio::fs::write(&temp, &upload.bytes).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e);
        }
        if let Err(e) = tokio::fs::rename(&temp, &target).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e);
        }
        Ok(target)
    }

    /// Remove a stored file. A missing file is not an error.
    pub async fn remove(&self, filename: &str) -> io::Result<()> {
        match tokio::fs::remove_file(self.path_of(filename)).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn store(dir: &Path) -> UploadStore {
        UploadStore::new(&UploadConfig {
            dir: dir.to_path_buf(),
            allowed_extensions: vec!["png".into(), "pdf".into()],
            max_bytes: 1024,
        })
    }

    #[tokio::test]
    async fn accepted_upload_is_written_under_sanitized_name() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());

        let upload = store
            .accept("../../evil dir/shot.png", Bytes::from_static(b"PNG"))
            .unwrap();
        assert_eq!(upload.filename, "evil_dir_shot.png");

        let path = store.write(&upload).await.unwrap();
        assert_eq!(path, tmp.path().join("evil_dir_shot.png"));
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"PNG");
    }

    #[tokio::test]
    async fn rejected_upload_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());

        assert!(store.accept("setup.exe", Bytes::from_static(b"MZ")).is_err());

        let mut entries = tokio::fs::read_dir(tmp.path()).await.unwrap();
        assert!(entries.next_entry().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn same_name_last_write_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());

        let first = store.accept("a.pdf", Bytes::from_static(b"one")).unwrap();
        let second = store.accept("a.pdf", Bytes::from_static(b"two")).unwrap();
        store.write(&first).await.unwrap();
        store.write(&second).await.unwrap();

        let contents = tokio::fs::read(store.path_of("a.pdf")).await.unwrap();
        assert_eq!(contents, b"two");
    }

    #[tokio::test]
    async fn remove_missing_file_is_ok() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store(tmp.path());
        assert!(!store.exists("ghost.png").await);
        store.remove("ghost.png").await.unwrap();
    }
}
