//! Atomic creation of transcript files
//!
//! Content goes to a hidden temporary file in the destination directory. Only
//! [`PendingTranscript::commit`] makes it visible, by linking it to its final name
//! without replacing anything already there. Dropping a pending transcript before
//! commit removes the temporary file.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::{Builder, NamedTempFile};
use tracing::debug;

use crate::error::BranchError;

const TEMP_PREFIX: &str = ".bushwack-";
const TEMP_SUFFIX: &str = ".jsonl.tmp";

/// A transcript being written, not yet visible under its final name
#[derive(Debug)]
pub struct PendingTranscript {
    temp: NamedTempFile,
    final_path: PathBuf,
}

impl PendingTranscript {
    /// Start a transcript that will become `final_path`
    ///
    /// The temporary file is created next to `final_path` so the commit never
    /// crosses a filesystem boundary.
    pub fn create(final_path: &Path) -> Result<Self, BranchError> {
        let dir = final_path.parent().ok_or_else(|| {
            BranchError::io(final_path, io::Error::new(io::ErrorKind::InvalidInput, "destination has no parent directory"))
        })?;

        let temp = Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(dir)
            .map_err(|e| BranchError::io(dir, e))?;

        Ok(Self { temp, final_path: final_path.to_path_buf() })
    }

    /// Location of the temporary file while uncommitted
    pub fn temp_path(&self) -> &Path {
        self.temp.path()
    }

    pub fn final_path(&self) -> &Path {
        &self.final_path
    }

    pub fn write_all(&mut self, bytes: &[u8]) -> Result<(), BranchError> {
        self.temp.write_all(bytes).map_err(|e| BranchError::io(self.temp.path(), e))
    }

    /// Flush to disk and link the file under its final name
    ///
    /// # Errors
    ///
    /// - [`BranchError::BranchConflict`] if the final name already exists
    /// - [`BranchError::Io`] if syncing or linking fails
    ///
    /// The temporary file is removed on every error path.
    pub fn commit(mut self) -> Result<PathBuf, BranchError> {
        self.temp.flush().map_err(|e| BranchError::io(self.temp.path(), e))?;
        self.temp.as_file().sync_all().map_err(|e| BranchError::io(self.temp.path(), e))?;

        let final_path = self.final_path;
        match self.temp.persist_noclobber(&final_path) {
            Ok(_) => {
                debug!(path = %final_path.display(), "committed transcript");
                Ok(final_path)
            }
            Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                Err(BranchError::BranchConflict { path: final_path })
            }
            Err(e) => Err(BranchError::io(&final_path, e.error)),
        }
    }
}
