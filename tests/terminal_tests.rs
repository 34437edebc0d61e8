mod common;

use common::FakeBackend;
use muxpanel::config::Config;
use muxpanel::error::AppError;
use muxpanel::sanitize::ESCAPE_WARNING;
use muxpanel::store::ServerStore;
use muxpanel::terminal::TerminalManager;
use std::sync::Arc;
use tempfile::TempDir;

fn setup(tmp: &TempDir) -> (TerminalManager, Arc<FakeBackend>, Arc<Config>) {
    let config = Arc::new(Config::with_root(tmp.path()));
    let backend = Arc::new(FakeBackend::new());
    let manager = TerminalManager::new(config.clone(), backend.clone());
    (manager, backend, config)
}

#[tokio::test]
async fn exists_is_false_until_created() {
    let tmp = TempDir::new().unwrap();
    let (manager, _, _) = setup(&tmp);

    assert!(!manager.exists("alpha").await);
    manager.create("alpha").await.unwrap();
    assert!(manager.exists("alpha").await);
}

#[tokio::test]
async fn create_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let (manager, backend, _) = setup(&tmp);

    manager.create("alpha").await.unwrap();
    manager.send("alpha", "echo hi").await.unwrap();
    // Second create must not replace the live session
    manager.create("alpha").await.unwrap();
    assert_eq!(backend.buffer("alpha").await, vec!["echo hi".to_string()]);
}

#[tokio::test]
async fn create_roots_the_session_in_its_directory() {
    let tmp = TempDir::new().unwrap();
    let (manager, backend, config) = setup(&tmp);

    manager.create("alpha").await.unwrap();
    let sessions = backend.sessions.lock().await;
    let session = sessions.get("alpha").unwrap();
    assert_eq!(session.start_dir, config.servers_root.join("alpha"));
    assert_eq!(session.shell, "bash");
}

#[tokio::test]
async fn kill_is_a_noop_without_a_session() {
    let tmp = TempDir::new().unwrap();
    let (manager, _, _) = setup(&tmp);

    manager.kill("ghost").await.unwrap();
    assert!(!manager.exists("ghost").await);
}

#[tokio::test]
async fn kill_ends_the_session() {
    let tmp = TempDir::new().unwrap();
    let (manager, _, _) = setup(&tmp);

    manager.create("alpha").await.unwrap();
    manager.kill("alpha").await.unwrap();
    assert!(!manager.exists("alpha").await);
}

#[tokio::test]
async fn blocked_editor_command_sends_nothing() {
    let tmp = TempDir::new().unwrap();
    let (manager, backend, _) = setup(&tmp);

    manager.create("alpha").await.unwrap();
    let err = manager.send("alpha", "nano file.txt").await.unwrap_err();
    assert!(matches!(err, AppError::CommandBlocked(_)));
    assert_eq!(err.to_string(), "nano is disabled or invalid command");
    assert!(backend.buffer("alpha").await.is_empty());
}

#[tokio::test]
async fn escape_attempts_are_rewritten_to_a_warning() {
    let tmp = TempDir::new().unwrap();
    let (manager, backend, _) = setup(&tmp);

    manager.create("alpha").await.unwrap();
    manager.send("alpha", "cd ../etc").await.unwrap();
    manager.send("alpha", "cd /etc").await.unwrap();

    let buffer = backend.buffer("alpha").await;
    assert_eq!(buffer.len(), 2);
    for line in &buffer {
        assert!(line.contains(ESCAPE_WARNING));
        assert!(!line.contains("etc"));
    }
}

#[tokio::test]
async fn capture_is_empty_without_a_session() {
    let tmp = TempDir::new().unwrap();
    let (manager, _, _) = setup(&tmp);

    assert_eq!(manager.capture("ghost").await.unwrap(), "");
}

#[tokio::test]
async fn capture_returns_the_buffer() {
    let tmp = TempDir::new().unwrap();
    let (manager, _, _) = setup(&tmp);

    manager.create("alpha").await.unwrap();
    manager.send("alpha", "echo one").await.unwrap();
    manager.send("alpha", "echo two").await.unwrap();
    assert_eq!(manager.capture("alpha").await.unwrap(), "echo one\necho two");
}

#[tokio::test]
async fn sent_commands_are_audit_logged() {
    let tmp = TempDir::new().unwrap();
    let (manager, _, config) = setup(&tmp);

    manager.create("alpha").await.unwrap();
    manager.send("alpha", "echo hi").await.unwrap();

    let log = std::fs::read_to_string(&config.command_log_file).unwrap();
    assert!(log.contains("echo hi"));
    assert!(log.contains("alpha"));
}

#[tokio::test]
async fn session_survives_directory_reset() {
    // Directory state and multiplexer state diverge independently: wiping
    // the directory does not touch the live session.
    let tmp = TempDir::new().unwrap();
    let (manager, _, config) = setup(&tmp);
    let store = ServerStore::new(config.clone());

    store.create_or_reset("alpha").await.unwrap();
    manager.create("alpha").await.unwrap();
    store.create_or_reset("alpha").await.unwrap();
    assert!(manager.exists("alpha").await);
}
