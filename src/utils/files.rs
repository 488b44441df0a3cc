use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

/// Open a transcript read-only without following symlinks
///
/// On Unix the open uses `O_NOFOLLOW`, so a symlink swapped in after discovery
/// cannot redirect the read. Non-regular files are rejected.
pub fn safe_open_file(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.read(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.custom_flags(libc::O_NOFOLLOW);
    }

    let file = options.open(path)?;
    if !file.metadata()?.is_file() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"));
    }

    Ok(file)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Read;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_safe_open_file_reads_regular_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.jsonl");
        fs::write(&path, "{}\n").unwrap();

        let mut contents = String::new();
        safe_open_file(&path).unwrap().read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "{}\n");
    }

    #[test]
    fn test_safe_open_file_rejects_directory() {
        let dir = TempDir::new().unwrap();
        assert!(safe_open_file(dir.path()).is_err());
    }

    #[test]
    fn test_safe_open_file_missing() {
        let dir = TempDir::new().unwrap();
        let err = safe_open_file(&dir.path().join("missing.jsonl")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[cfg(unix)]
    #[test]
    fn test_safe_open_file_rejects_symlink() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("target.jsonl");
        fs::write(&target, "{}\n").unwrap();
        let link = dir.path().join("link.jsonl");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        assert!(safe_open_file(&link).is_err());
    }
}
