use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::warn;

use super::ConversationRecord;
use crate::error::BranchError;

/// Which project directories a scan covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Only the project at this absolute path
    CurrentProject(PathBuf),
    AllProjects,
}

/// A non-fatal problem found while scanning
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanWarning {
    UnresolvedProjectDir { dir: PathBuf, reason: String },
    UnreadableEntry { path: PathBuf, reason: String },
    MalformedLines { path: PathBuf, count: usize },
    DuplicateIdentifier { id: String, kept: PathBuf, replaced: PathBuf },
}

impl fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanWarning::UnresolvedProjectDir { dir, reason } => {
                write!(f, "skipping project directory {}: {}", dir.display(), reason)
            }
            ScanWarning::UnreadableEntry { path, reason } => {
                write!(f, "skipping unreadable entry {}: {}", path.display(), reason)
            }
            ScanWarning::MalformedLines { path, count } => {
                write!(f, "{} malformed line(s) skipped in {}", count, path.display())
            }
            ScanWarning::DuplicateIdentifier { id, kept, replaced } => write!(
                f,
                "duplicate conversation ID {}: using {} over {}",
                id,
                kept.display(),
                replaced.display()
            ),
        }
    }
}

/// Source of identifiers that a newly generated one must not reuse
pub trait IdRegistry {
    fn is_known(&self, id: &str) -> bool;

    /// Storage directory already holding conversations of `project_path`, if known
    fn project_dir(&self, _project_path: &Path) -> Option<PathBuf> {
        None
    }
}

impl IdRegistry for HashSet<String> {
    fn is_known(&self, id: &str) -> bool {
        self.contains(id)
    }
}

impl IdRegistry for BTreeSet<String> {
    fn is_known(&self, id: &str) -> bool {
        self.contains(id)
    }
}

/// Flat result of one discovery scan
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    conversations: BTreeMap<String, ConversationRecord>,
    projects: BTreeMap<PathBuf, BTreeSet<String>>,
    warnings: Vec<ScanWarning>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record; a record with the same id replaces the earlier one
    pub fn insert(&mut self, record: ConversationRecord) {
        let id = record.id.clone();
        self.projects.entry(record.project_path.clone()).or_default().insert(id.clone());

        let kept = record.file_path.clone();
        if let Some(previous) = self.conversations.insert(id.clone(), record) {
            if previous.project_path != self.conversations[&id].project_path
                && let Some(ids) = self.projects.get_mut(&previous.project_path)
            {
                ids.remove(&id);
                if ids.is_empty() {
                    self.projects.remove(&previous.project_path);
                }
            }
            self.push_warning(ScanWarning::DuplicateIdentifier { id, kept, replaced: previous.file_path });
        }
    }

    /// Record a warning and log it
    pub fn push_warning(&mut self, warning: ScanWarning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub fn get(&self, id: &str) -> Option<&ConversationRecord> {
        self.conversations.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.conversations.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    /// Records in identifier order
    pub fn iter(&self) -> impl Iterator<Item = &ConversationRecord> {
        self.conversations.values()
    }

    pub fn warnings(&self) -> &[ScanWarning] {
        &self.warnings
    }

    /// Project paths with the identifiers found under each
    pub fn projects(&self) -> &BTreeMap<PathBuf, BTreeSet<String>> {
        &self.projects
    }

    pub fn project_conversations(&self, project_path: &Path) -> Vec<&ConversationRecord> {
        self.projects
            .get(project_path)
            .map(|ids| ids.iter().filter_map(|id| self.conversations.get(id)).collect())
            .unwrap_or_default()
    }

    /// All records sorted by last modification, newest first
    pub fn conversations_newest_first(&self) -> Vec<&ConversationRecord> {
        let mut records: Vec<_> = self.conversations.values().collect();
        records.sort_by(|a, b| b.last_modified_at.cmp(&a.last_modified_at).then_with(|| a.id.cmp(&b.id)));
        records
    }

    /// Find a conversation by full identifier or unique prefix
    ///
    /// # Errors
    ///
    /// - [`BranchError::InvalidIdentifier`] if the query is not made of hex digits and hyphens
    /// - [`BranchError::SourceNotFound`] if nothing matches
    /// - [`BranchError::AmbiguousIdentifier`] if the prefix matches more than one conversation
    pub fn resolve(&self, query: &str) -> Result<&ConversationRecord, BranchError> {
        let query = query.trim().to_ascii_lowercase();
        if query.is_empty() || !query.chars().all(|c| c.is_ascii_hexdigit() || c == '-') {
            return Err(BranchError::InvalidIdentifier(query));
        }

        if let Some(record) = self.conversations.get(&query) {
            return Ok(record);
        }

        let matches: Vec<&ConversationRecord> =
            self.conversations.range(query.clone()..).take_while(|(id, _)| id.starts_with(&query)).map(|(_, r)| r).collect();

        match matches.as_slice() {
            [] => Err(BranchError::SourceNotFound { id: query }),
            [single] => Ok(single),
            _ => Err(BranchError::AmbiguousIdentifier {
                matches: matches.iter().map(|r| r.id.clone()).collect(),
                query,
            }),
        }
    }

    /// Parent chain of a conversation, root first and ending with the conversation
    ///
    /// Stops at a parent missing from the catalog or at the first repeated id.
    pub fn ancestry(&self, id: &str) -> Vec<&ConversationRecord> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self.conversations.get(id);

        while let Some(record) = current {
            if !seen.insert(record.id.as_str()) {
                break;
            }
            chain.push(record);
            current = record.parent_id.as_deref().and_then(|parent| self.conversations.get(parent));
        }

        chain.reverse();
        chain
    }
}

impl IdRegistry for Catalog {
    fn is_known(&self, id: &str) -> bool {
        self.contains(id)
    }

    fn project_dir(&self, project_path: &Path) -> Option<PathBuf> {
        self.project_conversations(project_path).first().map(|record| record.project_dir.clone())
    }
}
