//! Field sets that drive project metadata recovery and rewriting.
//!
//! Transcripts carry the project they belong to in several differently named
//! fields. The sets below are data, so a new field name only needs adding here.

use std::collections::BTreeSet;

/// Fields holding an absolute project path (working directory, workspace root, ...)
pub const DEFAULT_PROJECT_PATH_FIELDS: &[&str] = &[
    "cwd",
    "projectPath",
    "workspaceRoot",
    "workspacePath",
    "projectRoot",
    "workingDirectory",
    "repoPath",
];

/// Fields holding the storage directory name of the project
pub const DEFAULT_PROJECT_DIR_FIELDS: &[&str] = &["projectDir", "projectDirectory"];

/// Fields holding the name of the checked-out git branch
pub const DEFAULT_BRANCH_NAME_FIELDS: &[&str] = &["gitBranch"];

/// Number of leading records inspected when recovering a project path from metadata
pub const DEFAULT_METADATA_SCAN_LINES: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteConfig {
    pub project_path_fields: BTreeSet<String>,
    pub project_dir_fields: BTreeSet<String>,
    pub branch_name_fields: BTreeSet<String>,
    pub metadata_scan_lines: usize,
}

impl RewriteConfig {
    pub fn is_project_path_field(&self, key: &str) -> bool {
        self.project_path_fields.contains(key)
    }

    pub fn is_project_dir_field(&self, key: &str) -> bool {
        self.project_dir_fields.contains(key)
    }

    pub fn is_branch_name_field(&self, key: &str) -> bool {
        self.branch_name_fields.contains(key)
    }

    /// Add another project-path-bearing field name
    pub fn with_project_path_field(mut self, field: impl Into<String>) -> Self {
        self.project_path_fields.insert(field.into());
        self
    }

    pub fn with_project_dir_field(mut self, field: impl Into<String>) -> Self {
        self.project_dir_fields.insert(field.into());
        self
    }

    pub fn with_branch_name_field(mut self, field: impl Into<String>) -> Self {
        self.branch_name_fields.insert(field.into());
        self
    }
}

impl Default for RewriteConfig {
    fn default() -> Self {
        let to_set = |fields: &[&str]| fields.iter().map(|f| f.to_string()).collect();
        Self {
            project_path_fields: to_set(DEFAULT_PROJECT_PATH_FIELDS),
            project_dir_fields: to_set(DEFAULT_PROJECT_DIR_FIELDS),
            branch_name_fields: to_set(DEFAULT_BRANCH_NAME_FIELDS),
            metadata_scan_lines: DEFAULT_METADATA_SCAN_LINES,
        }
    }
}
