pub mod routes;

use crate::config::Config;
use crate::files::FileManager;
use crate::store::ServerStore;
use crate::terminal::TerminalManager;
use crate::tmux::SessionBackend;
use std::sync::Arc;

/// All managers the HTTP facade dispatches into, wired once at startup.
/// Each manager holds its own handle to the shared config.
pub struct AppManagers {
    pub store: ServerStore,
    pub terminal: TerminalManager,
    pub files: FileManager,
}

impl AppManagers {
    pub fn new(config: Arc<Config>, backend: Arc<dyn SessionBackend>) -> Self {
        Self {
            store: ServerStore::new(config.clone()),
            terminal: TerminalManager::new(config.clone(), backend),
            files: FileManager::new(config),
        }
    }
}

/// Application state shared across routes.
#[derive(Clone)]
pub struct AppState {
    pub managers: Arc<AppManagers>,
}
