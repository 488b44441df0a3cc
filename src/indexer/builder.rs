//! Catalog builder for the conversation store.
//!
//! # Error Handling Strategy
//!
//! Scanning follows a **graceful degradation** approach:
//!
//! - **Directory-level problems**: undecodable or unlistable project directories are
//!   skipped and recorded as [`ScanWarning`]s
//! - **File-level problems**: unreadable transcripts (permission denied, vanished
//!   mid-scan) are skipped with a warning
//! - **Line-level problems**: malformed lines are counted by the parser and reported
//!   once per file
//!
//! Only a storage root that exists but cannot be listed fails the scan.

use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::RewriteConfig;
use crate::error::ScanError;
use crate::indexer::project_discovery::{ProjectDirectory, discover_projects, resolve_project_path};
use crate::models::{Catalog, ScanWarning, Scope};
use crate::parsers::{ParsedTranscript, conversation_from_transcript, parse_transcript_file};

/// Scan the storage root into a fresh [`Catalog`]
///
/// Uses the default [`RewriteConfig`] to recognise project-path metadata.
///
/// # Errors
///
/// Returns [`ScanError::Io`] if the storage root exists but cannot be listed.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use claude_bushwack::{Scope, scan};
///
/// let catalog = scan(Path::new("/Users/alice/.claude/projects"), &Scope::AllProjects)?;
/// println!("Found {} conversations", catalog.len());
/// # Ok::<(), claude_bushwack::ScanError>(())
/// ```
pub fn scan(storage_root: &Path, scope: &Scope) -> Result<Catalog, ScanError> {
    scan_with_config(storage_root, scope, &RewriteConfig::default())
}

/// [`scan`] with explicit metadata field configuration
///
/// # Errors
///
/// Returns [`ScanError::Io`] if the storage root exists but cannot be listed.
pub fn scan_with_config(storage_root: &Path, scope: &Scope, config: &RewriteConfig) -> Result<Catalog, ScanError> {
    let discovery = discover_projects(storage_root, scope)?;
    let mut catalog = Catalog::new();

    for warning in discovery.warnings {
        catalog.push_warning(warning);
    }

    let mut files_parsed = 0;
    let mut files_skipped = 0;

    for project in &discovery.projects {
        let transcripts = read_transcripts(project, &mut catalog);
        files_skipped += project.transcripts.len() - transcripts.len();

        let parsed_refs: Vec<&ParsedTranscript> = transcripts.iter().map(|(_, parsed)| parsed).collect();
        let project_path = match resolve_project_path(&project.dir_name, &parsed_refs, config) {
            Ok(path) => path,
            Err(e) => {
                catalog.push_warning(ScanWarning::UnresolvedProjectDir { dir: project.dir.clone(), reason: e.to_string() });
                files_skipped += transcripts.len();
                continue;
            }
        };

        for (path, parsed) in &transcripts {
            if parsed.malformed_lines > 0 {
                catalog.push_warning(ScanWarning::MalformedLines { path: path.clone(), count: parsed.malformed_lines });
            }
            catalog.insert(conversation_from_transcript(path, &project_path, parsed));
            files_parsed += 1;
        }
    }

    info!(
        conversations = catalog.len(),
        projects = catalog.projects().len(),
        files_parsed,
        files_skipped,
        warnings = catalog.warnings().len(),
        "scan complete"
    );

    Ok(catalog)
}

fn read_transcripts(project: &ProjectDirectory, catalog: &mut Catalog) -> Vec<(PathBuf, ParsedTranscript)> {
    let mut transcripts = Vec::with_capacity(project.transcripts.len());

    for path in &project.transcripts {
        match parse_transcript_file(path) {
            Ok(parsed) => transcripts.push((path.clone(), parsed)),
            Err(e) => {
                let reason =
                    if e.kind() == io::ErrorKind::NotFound { "removed during scan".to_string() } else { e.to_string() };
                catalog.push_warning(ScanWarning::UnreadableEntry { path: path.clone(), reason });
            }
        }
    }

    transcripts
}
