use crate::config::Config;
use crate::error::AppError;
use crate::store::ServerStore;
use crate::utils::path_utils::resolve_in_dir;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, instrument};

/// File CRUD confined to a single session's directory. All filenames pass
/// through the traversal guard before touching the disk.
pub struct FileManager {
    store: ServerStore,
}

impl FileManager {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            store: ServerStore::new(config),
        }
    }

    /// Entry names in the session directory, sorted. A missing directory is
    /// an empty listing, not an error.
    #[instrument(skip(self))]
    pub async fn list(&self, server: &str) -> Result<Vec<String>, AppError> {
        let dir = self.store.session_dir(server)?;
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        let mut read_dir = fs::read_dir(&dir).await?;
        while let Some(entry) = read_dir.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        names.sort();
        Ok(names)
    }

    /// Lossy UTF-8 read; undecodable bytes are replaced rather than failing.
    /// `None` when the file does not exist.
    #[instrument(skip(self))]
    pub async fn read(&self, server: &str, filename: &str) -> Result<Option<String>, AppError> {
        let path = resolve_in_dir(&self.store.session_dir(server)?, filename)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Create or overwrite with UTF-8 text.
    #[instrument(skip(self, content))]
    pub async fn write(&self, server: &str, filename: &str, content: &str) -> Result<(), AppError> {
        let path = resolve_in_dir(&self.store.session_dir(server)?, filename)?;
        debug!(path = %path.display(), bytes = content.len(), "Writing file");
        fs::write(&path, content).await?;
        Ok(())
    }

    /// Remove the file if present; reports whether it was.
    #[instrument(skip(self))]
    pub async fn delete(&self, server: &str, filename: &str) -> Result<bool, AppError> {
        let path = resolve_in_dir(&self.store.session_dir(server)?, filename)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Binary-safe write; creates the session directory if absent.
    #[instrument(skip(self, bytes))]
    pub async fn upload(&self, server: &str, filename: &str, bytes: &[u8]) -> Result<(), AppError> {
        let dir = self.store.ensure_dir(server).await?;
        let path = resolve_in_dir(&dir, filename)?;
        debug!(path = %path.display(), bytes = bytes.len(), "Storing upload");
        fs::write(&path, bytes).await?;
        Ok(())
    }
}
