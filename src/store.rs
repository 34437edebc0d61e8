use crate::config::Config;
use crate::error::AppError;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info, instrument};

/// Filesystem-backed registry of session names. Every session owns exactly
/// `<servers_root>/<name>`; there is no metadata beyond the directory itself.
#[derive(Debug)]
pub struct ServerStore {
    config: Arc<Config>,
}

impl ServerStore {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Resolve the directory for a session name. Names that are empty or
    /// could resolve outside the root (path separators, `.`/`..`) are
    /// rejected before anything touches the disk.
    pub fn session_dir(&self, name: &str) -> Result<PathBuf, AppError> {
        validate_session_name(name)?;
        Ok(self.config.servers_root.join(name))
    }

    /// Wipe-and-recreate semantics: creating a session by an existing name
    /// destroys all prior files in its directory.
    #[instrument(skip(self))]
    pub async fn create_or_reset(&self, name: &str) -> Result<PathBuf, AppError> {
        let dir = self.session_dir(name)?;
        if dir.exists() {
            info!(server = %name, "Resetting existing server directory");
            fs::remove_dir_all(&dir).await?;
        }
        fs::create_dir_all(&dir).await?;
        debug!(dir = %dir.display(), "Server directory ready");
        Ok(dir)
    }

    /// Create the directory if absent, without wiping. Used by upload.
    pub async fn ensure_dir(&self, name: &str) -> Result<PathBuf, AppError> {
        let dir = self.session_dir(name)?;
        fs::create_dir_all(&dir).await?;
        Ok(dir)
    }

    /// Immediate subdirectories of the root, sorted for stable output.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<String>, AppError> {
        let mut names = Vec::new();
        let mut read_dir = fs::read_dir(&self.config.servers_root).await?;
        while let Some(entry) = read_dir.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                let name = entry.file_name().to_string_lossy().to_string();
                if !name.starts_with('.') {
                    names.push(name);
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

fn validate_session_name(name: &str) -> Result<(), AppError> {
    if name.is_empty() {
        return Err(AppError::MissingServerName);
    }
    // Dot-prefixed directories are reserved for the panel's own state
    // (command logs) and are skipped by list(); a session there would be
    // invisible and could clobber that state.
    if name.starts_with('.') || name.contains('/') || name.contains('\\') {
        return Err(AppError::InvalidServerName(name.to_string()));
    }
    Ok(())
}
