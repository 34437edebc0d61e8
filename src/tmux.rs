use crate::error::AppError;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command as TokioCommand;
use tracing::{debug, warn};

/// The four multiplexer primitives the panel needs. Kept as a trait so the
/// external tmux dependency can be swapped for an in-memory fake in tests.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Whether a live session with this name exists. Never errors; a failed
    /// query (including a missing binary) reads as "does not exist".
    async fn has_session(&self, name: &str) -> bool;

    /// Launch a detached session named `name`, rooted at `start_dir`,
    /// running `shell`.
    async fn new_session(&self, name: &str, start_dir: &Path, shell: &str)
        -> Result<(), AppError>;

    async fn kill_session(&self, name: &str) -> Result<(), AppError>;

    /// Forward a line of text as if typed at the keyboard, followed by an
    /// Enter keystroke.
    async fn send_keys(&self, name: &str, text: &str) -> Result<(), AppError>;

    /// Snapshot of the currently visible pane contents.
    async fn capture_pane(&self, name: &str) -> Result<String, AppError>;
}

/// Real backend shelling out to the tmux binary. Invocations are awaited to
/// completion with no timeout; a hung tmux stalls only the request that
/// invoked it.
#[derive(Debug)]
pub struct TmuxBackend {
    bin: String,
}

impl TmuxBackend {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    async fn run(&self, args: &[&str]) -> Result<(), AppError> {
        debug!(bin = %self.bin, ?args, "Invoking tmux");
        let status = TokioCommand::new(&self.bin)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| AppError::Tmux(format!("Failed to run {}: {}", self.bin, e)))?;
        // Non-zero exits are logged but not surfaced; has-session is the
        // only primitive whose status the panel interprets.
        if !status.success() {
            warn!(bin = %self.bin, ?args, code = ?status.code(), "tmux exited non-zero");
        }
        Ok(())
    }
}

#[async_trait]
impl SessionBackend for TmuxBackend {
    async fn has_session(&self, name: &str) -> bool {
        TokioCommand::new(&self.bin)
            .args(["has-session", "-t", name])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }

    async fn new_session(
        &self,
        name: &str,
        start_dir: &Path,
        shell: &str,
    ) -> Result<(), AppError> {
        let dir = start_dir.to_string_lossy();
        self.run(&["new-session", "-d", "-s", name, "-c", &dir, shell])
            .await
    }

    async fn kill_session(&self, name: &str) -> Result<(), AppError> {
        self.run(&["kill-session", "-t", name]).await
    }

    async fn send_keys(&self, name: &str, text: &str) -> Result<(), AppError> {
        self.run(&["send-keys", "-t", name, text, "Enter"]).await
    }

    async fn capture_pane(&self, name: &str) -> Result<String, AppError> {
        let output = TokioCommand::new(&self.bin)
            .args(["capture-pane", "-pt", name])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|e| AppError::Tmux(format!("Failed to run {}: {}", self.bin, e)))?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
