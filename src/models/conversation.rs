use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A discovered conversation, synthesized from its transcript on every scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationRecord {
    pub id: String,
    pub parent_id: Option<String>,
    pub project_path: PathBuf,
    /// Storage directory holding the transcript
    pub project_dir: PathBuf,
    pub file_path: PathBuf,
    pub created_at: DateTime<Utc>,
    pub last_modified_at: DateTime<Utc>,
    pub first_user_message: String,
    pub summary: Option<String>,
    pub git_branch: Option<String>,
    pub record_count: usize,
    pub message_count: usize,
    pub malformed_lines: usize,
}

impl ConversationRecord {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// First eight characters of the identifier, as shown in listings
    pub fn short_id(&self) -> &str {
        self.id.get(..8).unwrap_or(&self.id)
    }

    /// Summary if present, otherwise the first user message
    pub fn title(&self) -> &str {
        self.summary.as_deref().filter(|s| !s.trim().is_empty()).unwrap_or(&self.first_user_message)
    }
}
