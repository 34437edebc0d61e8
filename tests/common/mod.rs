use async_trait::async_trait;
use muxpanel::error::AppError;
use muxpanel::tmux::SessionBackend;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// In-memory stand-in for the tmux binary: named sessions whose "pane" is a
/// plain line buffer. Lets the manager and router tests run without a real
/// multiplexer.
#[derive(Debug, Default)]
pub struct FakeSession {
    pub start_dir: PathBuf,
    pub shell: String,
    pub buffer: Vec<String>,
}

#[derive(Debug, Default)]
pub struct FakeBackend {
    pub sessions: Mutex<HashMap<String, FakeSession>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn alive(&self, name: &str) -> bool {
        self.sessions.lock().await.contains_key(name)
    }

    pub async fn buffer(&self, name: &str) -> Vec<String> {
        self.sessions
            .lock()
            .await
            .get(name)
            .map(|s| s.buffer.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SessionBackend for FakeBackend {
    async fn has_session(&self, name: &str) -> bool {
        self.sessions.lock().await.contains_key(name)
    }

    async fn new_session(
        &self,
        name: &str,
        start_dir: &Path,
        shell: &str,
    ) -> Result<(), AppError> {
        let mut sessions = self.sessions.lock().await;
        sessions.entry(name.to_string()).or_insert_with(|| FakeSession {
            start_dir: start_dir.to_path_buf(),
            shell: shell.to_string(),
            buffer: Vec::new(),
        });
        Ok(())
    }

    async fn kill_session(&self, name: &str) -> Result<(), AppError> {
        self.sessions.lock().await.remove(name);
        Ok(())
    }

    async fn send_keys(&self, name: &str, text: &str) -> Result<(), AppError> {
        // Like tmux, sending to a dead session is not surfaced to the caller.
        if let Some(session) = self.sessions.lock().await.get_mut(name) {
            session.buffer.push(text.to_string());
        }
        Ok(())
    }

    async fn capture_pane(&self, name: &str) -> Result<String, AppError> {
        let sessions = self.sessions.lock().await;
        Ok(sessions
            .get(name)
            .map(|s| s.buffer.join("\n"))
            .unwrap_or_default())
    }
}
