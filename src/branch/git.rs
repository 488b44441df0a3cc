use std::fs;
use std::path::{Path, PathBuf};

const HEAD_REF_PREFIX: &str = "ref:";
const BRANCH_REF_PREFIX: &str = "refs/heads/";
const GITDIR_PREFIX: &str = "gitdir:";

/// Current branch of the git checkout at `project_path`, read from `.git/HEAD`
///
/// A detached HEAD yields the commit hash. Worktrees, where `.git` is a file
/// pointing at the real git directory, are followed. Returns `None` when the
/// project is not a checkout or HEAD cannot be read; git itself is never run.
pub fn detect_git_branch(project_path: &Path) -> Option<String> {
    let git_dir = resolve_git_dir(&project_path.join(".git"))?;
    let head = fs::read_to_string(git_dir.join("HEAD")).ok()?;
    parse_head(&head)
}

fn resolve_git_dir(dot_git: &Path) -> Option<PathBuf> {
    let metadata = fs::metadata(dot_git).ok()?;
    if metadata.is_dir() {
        return Some(dot_git.to_path_buf());
    }

    let contents = fs::read_to_string(dot_git).ok()?;
    let target = contents.trim().strip_prefix(GITDIR_PREFIX)?.trim();
    if target.is_empty() {
        return None;
    }
    let target = Path::new(target);
    Some(if target.is_absolute() { target.to_path_buf() } else { dot_git.parent()?.join(target) })
}

fn parse_head(contents: &str) -> Option<String> {
    let head = contents.trim();
    if head.is_empty() {
        return None;
    }

    match head.strip_prefix(HEAD_REF_PREFIX) {
        Some(reference) => {
            let reference = reference.trim();
            let branch = reference.strip_prefix(BRANCH_REF_PREFIX).unwrap_or(reference);
            (!branch.is_empty()).then(|| branch.to_string())
        }
        None => Some(head.to_string()),
    }
}
