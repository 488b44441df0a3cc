use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Environment variable that overrides the default storage root
pub const STORAGE_ROOT_ENV: &str = "CLAUDE_PROJECTS_DIR";

/// Resolve the conversation storage root (~/.claude/projects by default)
///
/// Precedence: explicit override, then [`STORAGE_ROOT_ENV`], then the home directory.
pub fn resolve_storage_root(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    if let Some(path) = env::var_os(STORAGE_ROOT_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(path));
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".claude").join("projects"))
}

/// Current working directory as an absolute project path
pub fn current_project_path() -> Result<PathBuf> {
    env::current_dir().context("Failed to determine current working directory")
}
