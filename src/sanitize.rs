use crate::config::Config;
use std::sync::Arc;
use tracing::warn;

pub const ESCAPE_WARNING: &str = "Cannot leave server root directory";

/// What the sanitizer decided to do with an outbound command.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Forward the command as-is.
    Send(String),
    /// Forward a harmless replacement instead (directory-escape rewrite).
    Rewritten(String),
    /// Do not forward anything; the matched blocked pattern is carried for
    /// the error message.
    Rejected(String),
}

/// Screens commands before they reach a live session. Two policies, both
/// heuristic text inspection of the command line, not a real sandbox:
/// full-screen editors are rejected outright (they hijack the pane and break
/// capture-based output), and directory changes that look like they leave
/// the session root are swapped for a warning echo.
#[derive(Debug)]
pub struct CommandSanitizer {
    config: Arc<Config>,
}

impl CommandSanitizer {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    pub fn screen(&self, command: &str) -> Verdict {
        if let Some(pattern) = self.blocked_pattern(command) {
            warn!(command = %command, pattern = %pattern, "Command rejected by editor block");
            return Verdict::Rejected(pattern);
        }
        if looks_like_directory_escape(command) {
            warn!(command = %command, "Directory-escape command rewritten");
            return Verdict::Rewritten(format!("echo '{}'", ESCAPE_WARNING));
        }
        Verdict::Send(command.to_string())
    }

    fn blocked_pattern(&self, command: &str) -> Option<String> {
        self.config
            .blocked_commands
            .iter()
            .find(|re| re.is_match(command))
            .map(|re| re.as_str().to_string())
    }
}

/// A command is treated as a directory escape when it contains `cd ` and
/// either a `..` parent reference or a `/` anywhere past the third
/// character. Inspects text only; chained commands or piecewise-assembled
/// paths can slip through.
fn looks_like_directory_escape(command: &str) -> bool {
    if !command.contains("cd ") {
        return false;
    }
    if command.contains("../") {
        return true;
    }
    command.chars().skip(3).any(|c| c == '/')
}
