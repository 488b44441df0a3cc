//! Error types for the conversation engine.
//!
//! Discovery problems are not errors: they are collected as
//! [`ScanWarning`](crate::models::ScanWarning)s on the catalog. The types here cover
//! codec misuse, a storage root that cannot be listed at all, and branch failures,
//! which are always fatal to the single operation that raised them.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Failures of the project directory name codec.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("invalid project path {path}: {reason}")]
    InvalidPath { path: PathBuf, reason: &'static str },

    #[error("invalid project directory name {name:?}: {reason}")]
    InvalidDirName { name: String, reason: &'static str },
}

impl CodecError {
    pub(crate) fn invalid_path(path: &Path, reason: &'static str) -> Self {
        CodecError::InvalidPath { path: path.to_path_buf(), reason }
    }

    pub(crate) fn invalid_dir_name(name: &str, reason: &'static str) -> Self {
        CodecError::InvalidDirName { name: name.to_string(), reason }
    }
}

/// The storage root itself could not be listed.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("failed to read storage root {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failures of a branch or copy operation.
#[derive(Error, Debug)]
pub enum BranchError {
    #[error("no conversation found with ID: {id}")]
    SourceNotFound { id: String },

    #[error("ambiguous conversation ID '{query}': {} matches", matches.len())]
    AmbiguousIdentifier { query: String, matches: Vec<String> },

    #[error("invalid conversation ID format: {0}")]
    InvalidIdentifier(String),

    #[error("destination already exists: {path}")]
    BranchConflict { path: PathBuf },

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize rewritten record for {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl BranchError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        BranchError::Io { path: path.to_path_buf(), source }
    }
}
