use crate::config::Config;
use crate::error::AppError;
use crate::sanitize::{CommandSanitizer, Verdict};
use crate::store::ServerStore;
use crate::tmux::SessionBackend;
use crate::utils::command_log::CommandLog;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Bridges logical session names to persistent shells held by the
/// multiplexer. Session liveness is always re-queried from the backend,
/// never cached in memory, so the panel cannot drift from the real process
/// table. Concurrent requests against the same name are racy by design; the
/// multiplexer's check-then-act primitives are not atomic across callers.
pub struct TerminalManager {
    config: Arc<Config>,
    backend: Arc<dyn SessionBackend>,
    sanitizer: CommandSanitizer,
    command_log: CommandLog,
}

impl TerminalManager {
    pub fn new(config: Arc<Config>, backend: Arc<dyn SessionBackend>) -> Self {
        Self {
            sanitizer: CommandSanitizer::new(config.clone()),
            command_log: CommandLog::new(config.clone()),
            config,
            backend,
        }
    }

    pub async fn exists(&self, name: &str) -> bool {
        self.backend.has_session(name).await
    }

    /// Idempotent: a live session by this name makes this a no-op. The
    /// session's working directory is the server directory; the directory is
    /// not created here (create wipes, start must not).
    #[instrument(skip(self))]
    pub async fn create(&self, name: &str) -> Result<(), AppError> {
        if self.backend.has_session(name).await {
            debug!(server = %name, "Session already exists, create is a no-op");
            return Ok(());
        }
        let store = ServerStore::new(self.config.clone());
        let dir = store.session_dir(name)?;
        info!(server = %name, dir = %dir.display(), "Creating session");
        self.backend
            .new_session(name, &dir, &self.config.default_shell)
            .await
    }

    #[instrument(skip(self))]
    pub async fn kill(&self, name: &str) -> Result<(), AppError> {
        if !self.backend.has_session(name).await {
            debug!(server = %name, "No session to kill");
            return Ok(());
        }
        info!(server = %name, "Killing session");
        self.backend.kill_session(name).await
    }

    /// Screen and forward one command line. Blocked commands error without
    /// touching the backend; escape attempts are silently rewritten to a
    /// warning echo and still count as accepted. Liveness is not checked
    /// here — callers gate on `exists`.
    #[instrument(skip(self, command))]
    pub async fn send(&self, name: &str, command: &str) -> Result<(), AppError> {
        let outgoing = match self.sanitizer.screen(command) {
            Verdict::Rejected(pattern) => return Err(AppError::CommandBlocked(pattern)),
            Verdict::Rewritten(replacement) => replacement,
            Verdict::Send(cmd) => cmd,
        };
        self.command_log.log_command(name, &outgoing).await;
        self.backend.send_keys(name, &outgoing).await
    }

    /// Snapshot of the visible buffer; empty when no live session exists.
    /// Pull-based polling only — fast-scrolling output between polls is not
    /// guaranteed to be observed.
    pub async fn capture(&self, name: &str) -> Result<String, AppError> {
        if !self.backend.has_session(name).await {
            return Ok(String::new());
        }
        self.backend.capture_pane(name).await
    }
}
