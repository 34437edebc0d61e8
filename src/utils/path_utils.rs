use crate::error::AppError;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Resolve a caller-supplied filename inside a session directory, rejecting
/// anything that would land outside it. The filename is normalized lexically
/// (parent references collapsed, absolute/prefix components refused) before
/// joining, so `../../etc/passwd` and friends fail with `PathTraversal`
/// instead of escaping the session root.
pub fn resolve_in_dir(session_dir: &Path, filename: &str) -> Result<PathBuf, AppError> {
    if filename.is_empty() {
        return Err(AppError::InvalidRequest("Empty filename".to_string()));
    }

    let supplied = Path::new(filename);
    let mut components: Vec<&std::ffi::OsStr> = Vec::new();
    for component in supplied.components() {
        match component {
            Component::Normal(part) => components.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if components.pop().is_none() {
                    return Err(AppError::PathTraversal(filename.to_string()));
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(AppError::PathTraversal(filename.to_string()));
            }
        }
    }
    if components.is_empty() {
        return Err(AppError::InvalidRequest("Empty filename".to_string()));
    }

    let session_dir = dunce::canonicalize(session_dir).unwrap_or_else(|_| session_dir.to_path_buf());
    let mut resolved = session_dir.clone();
    for part in components {
        resolved.push(part);
    }

    // Canonicalize when possible (symlinks); fall back to the lexical path
    // for files that do not exist yet.
    let checked = dunce::canonicalize(&resolved).unwrap_or_else(|_| resolved.clone());
    if !checked.starts_with(&session_dir) {
        debug!(path = %checked.display(), dir = %session_dir.display(), "Resolved path left the session directory");
        return Err(AppError::PathTraversal(filename.to_string()));
    }

    Ok(resolved)
}
