use crate::config::Config;
use anyhow::Result;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::error;

/// Append-only record of every command forwarded to a session, rotated by
/// size. Logging failures are reported to tracing and swallowed; the panel
/// never fails a request over its own bookkeeping.
pub struct CommandLog {
    log_file_path: PathBuf,
    max_size_bytes: u64,
}

impl CommandLog {
    pub fn new(config: Arc<Config>) -> Self {
        if let Some(parent_dir) = config.command_log_file.parent() {
            if !parent_dir.exists() {
                if let Err(e) = std::fs::create_dir_all(parent_dir) {
                    error!(path = %parent_dir.display(), error = %e, "Failed to create command log directory");
                }
            }
        }
        Self {
            log_file_path: config.command_log_file.clone(),
            max_size_bytes: config.command_log_max_size_bytes,
        }
    }

    pub async fn log_command(&self, server: &str, command: &str) {
        if let Err(e) = self.try_log_command(server, command).await {
            error!(server = %server, error = %e, "Failed to write command log");
        }
    }

    async fn try_log_command(&self, server: &str, command: &str) -> Result<()> {
        self.rotate_log_if_needed().await?;

        let timestamp = Utc::now().to_rfc3339();
        let log_entry = format!("{} | {:<20} | {}\n", timestamp, server, command);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file_path)
            .await?;
        file.write_all(log_entry.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    async fn rotate_log_if_needed(&self) -> Result<()> {
        if !self.log_file_path.exists() {
            return Ok(());
        }

        let metadata = fs::metadata(&self.log_file_path).await?;
        if metadata.len() >= self.max_size_bytes {
            let timestamp = Utc::now().format("%Y-%m-%d_%H-%M-%S").to_string();
            let file_stem = self
                .log_file_path
                .file_stem()
                .unwrap_or_default()
                .to_string_lossy();
            let extension = self
                .log_file_path
                .extension()
                .unwrap_or_default()
                .to_string_lossy();

            let backup_file_name = format!("{}_{}.{}", file_stem, timestamp, extension);
            let backup_path = self.log_file_path.with_file_name(backup_file_name);

            fs::rename(&self.log_file_path, backup_path).await?;
        }
        Ok(())
    }
}
