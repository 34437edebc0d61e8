use anyhow::{Context, Result};
use regex::Regex;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub servers_root: PathBuf,
    pub blocked_commands: Vec<Regex>,
    pub default_shell: String,
    pub tmux_bin: String,
    pub log_level: String,
    pub http_host: String,
    pub http_port: u16,
    pub static_dir: Option<PathBuf>,
    pub command_log_file: PathBuf,
    pub command_log_max_size_bytes: u64,
}

// Tilde expansion is infallible; the Result keeps call sites uniform with
// the other config parsing steps.
fn expand_tilde(path_str: &str) -> Result<PathBuf> {
    Ok(PathBuf::from(shellexpand::tilde(path_str).into_owned()))
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let servers_root_str =
            std::env::var("SERVERS_ROOT").unwrap_or_else(|_| "servers".to_string());
        let servers_root = expand_tilde(&servers_root_str)?;
        std::fs::create_dir_all(&servers_root)
            .context(format!("Failed to create SERVERS_ROOT: {}", servers_root_str))?;
        let servers_root = dunce::canonicalize(&servers_root)
            .context(format!("Failed to canonicalize SERVERS_ROOT: {}", servers_root_str))?;

        let blocked_commands_str =
            std::env::var("BLOCKED_COMMANDS").unwrap_or_else(|_| "nano".to_string());
        let blocked_commands = blocked_commands_str
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            // Unanchored: a command mentioning the pattern anywhere is blocked
            .map(|s| {
                Regex::new(&regex::escape(s))
                    .context(format!("Invalid regex for blocked command: {}", s))
            })
            .collect::<Result<Vec<Regex>>>()?;

        let default_shell = std::env::var("DEFAULT_SHELL").unwrap_or_else(|_| "bash".to_string());
        let tmux_bin = std::env::var("TMUX_BIN").unwrap_or_else(|_| "tmux".to_string());
        let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let http_host = std::env::var("HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let http_port = std::env::var("HTTP_PORT")
            .unwrap_or_else(|_| "5001".to_string())
            .parse::<u16>()
            .context("Invalid HTTP_PORT")?;

        let static_dir = std::env::var("STATIC_DIR")
            .ok()
            .filter(|s| !s.is_empty())
            .and_then(|s| expand_tilde(&s).ok());

        let log_dir_base = std::env::var("PANEL_LOG_DIR")
            .ok()
            .and_then(|s| expand_tilde(&s).ok())
            .unwrap_or_else(|| servers_root.join(".muxpanel-logs"));

        let command_log_file = log_dir_base.join("commands.log");
        let command_log_max_size_bytes = std::env::var("COMMAND_LOG_MAX_SIZE_MB")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u64>()
            .map(|mb| mb * 1024 * 1024)
            .unwrap_or(10 * 1024 * 1024);

        Ok(Config {
            servers_root,
            blocked_commands,
            default_shell,
            tmux_bin,
            log_level,
            http_host,
            http_port,
            static_dir,
            command_log_file,
            command_log_max_size_bytes,
        })
    }

    /// Config rooted at the given directory with defaults for everything
    /// else. Lets embedders and tests skip the environment entirely.
    pub fn with_root(servers_root: impl Into<PathBuf>) -> Self {
        let servers_root = servers_root.into();
        Config {
            blocked_commands: vec![Regex::new("nano").expect("static regex")],
            default_shell: "bash".to_string(),
            tmux_bin: "tmux".to_string(),
            log_level: "info".to_string(),
            http_host: "127.0.0.1".to_string(),
            http_port: 5001,
            static_dir: None,
            command_log_file: servers_root.join(".muxpanel-logs").join("commands.log"),
            command_log_max_size_bytes: 10 * 1024 * 1024,
            servers_root,
        }
    }
}
