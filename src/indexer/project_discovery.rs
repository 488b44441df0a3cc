use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use uuid::Uuid;

use crate::config::RewriteConfig;
use crate::error::{CodecError, ScanError};
use crate::models::{ScanWarning, Scope};
use crate::parsers::ParsedTranscript;
use crate::utils::{decode_path, encode_path, legacy_dir_name};

const TRANSCRIPT_EXTENSION: &str = "jsonl";

/// A project directory under the storage root and the transcripts it holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDirectory {
    pub dir_name: String,
    pub dir: PathBuf,
    pub transcripts: Vec<PathBuf>,
}

/// Project directories found by [`discover_projects`], plus what had to be skipped
#[derive(Debug, Default)]
pub struct Discovery {
    pub projects: Vec<ProjectDirectory>,
    pub warnings: Vec<ScanWarning>,
}

/// List the project directories under `storage_root` that fall inside `scope`
///
/// Directories are returned in name order, transcripts in file name order. A
/// missing storage root yields an empty result. Symlinked directories and project
/// directories that cannot be listed are skipped with a warning.
///
/// # Errors
///
/// Returns [`ScanError::Io`] only if the storage root exists but cannot be read.
pub fn discover_projects(storage_root: &Path, scope: &Scope) -> Result<Discovery, ScanError> {
    let mut discovery = Discovery::default();

    let entries = match fs::read_dir(storage_root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(discovery),
        Err(source) => return Err(ScanError::Io { path: storage_root.to_path_buf(), source }),
    };

    let accepted_names = scope_dir_names(scope);
    let mut dirs = Vec::new();

    for entry in entries {
        // Entries can vanish between listing and inspection
        let Ok(entry) = entry else { continue };
        let Ok(file_type) = entry.file_type() else { continue };
        let path = entry.path();
        let dir_name = entry.file_name().to_string_lossy().into_owned();

        if let Some(names) = &accepted_names
            && !names.contains(&dir_name)
        {
            continue;
        }

        if file_type.is_symlink() {
            discovery.warnings.push(ScanWarning::UnreadableEntry {
                path,
                reason: "symlinked project directories are not followed".to_string(),
            });
            continue;
        }
        if !file_type.is_dir() {
            continue;
        }

        dirs.push((dir_name, path));
    }

    dirs.sort();

    for (dir_name, dir) in dirs {
        match list_transcripts(&dir) {
            Ok(transcripts) => {
                debug!(dir = %dir.display(), count = transcripts.len(), "found transcripts");
                discovery.projects.push(ProjectDirectory { dir_name, dir, transcripts });
            }
            Err(e) => {
                discovery.warnings.push(ScanWarning::UnreadableEntry { path: dir, reason: e.to_string() });
            }
        }
    }

    Ok(discovery)
}

/// Directory names a scope can match, or `None` for every directory
fn scope_dir_names(scope: &Scope) -> Option<Vec<String>> {
    match scope {
        Scope::AllProjects => None,
        Scope::CurrentProject(path) => {
            let mut names = vec![legacy_dir_name(path)];
            if let Ok(encoded) = encode_path(path) {
                names.push(encoded);
            }
            Some(names)
        }
    }
}

fn list_transcripts(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut transcripts: Vec<PathBuf> = fs::read_dir(dir)?
        .flatten()
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .map(|entry| entry.path())
        .filter(|path| is_transcript_path(path))
        .collect();
    transcripts.sort();
    Ok(transcripts)
}

/// Transcript files are named `<uuid>.jsonl` with a lowercase hyphenated UUID
///
/// Sub-agent logs (`agent-*.jsonl`) and temporary files share the directory and
/// are not conversations.
pub fn is_transcript_path(path: &Path) -> bool {
    if path.extension().and_then(|e| e.to_str()) != Some(TRANSCRIPT_EXTENSION) {
        return false;
    }
    path.file_stem().and_then(|s| s.to_str()).is_some_and(is_conversation_id)
}

/// Whether `id` is a lowercase hyphenated UUID
pub fn is_conversation_id(id: &str) -> bool {
    Uuid::try_parse(id).is_ok_and(|uuid| uuid.hyphenated().to_string() == id)
}

/// Work out which project a storage directory belongs to
///
/// Project-path metadata in the leading records of the transcripts wins when it
/// names a path whose encoded or legacy directory name is exactly `dir_name`; that
/// recovers paths the lossy legacy naming cannot express. Otherwise the directory
/// name is decoded.
///
/// # Errors
///
/// Returns [`CodecError::InvalidDirName`] if no metadata matches and the name does
/// not decode.
pub fn resolve_project_path(
    dir_name: &str,
    transcripts: &[&ParsedTranscript],
    config: &RewriteConfig,
) -> Result<PathBuf, CodecError> {
    let hints = transcripts
        .iter()
        .flat_map(|parsed| parsed.records.iter().take(config.metadata_scan_lines))
        .filter_map(|record| record.project_path_hint(config))
        .map(Path::new)
        .filter(|candidate| candidate.is_absolute());

    for candidate in hints {
        let encoded_matches = encode_path(candidate).is_ok_and(|name| name == dir_name);
        if encoded_matches || legacy_dir_name(candidate) == dir_name {
            return Ok(candidate.to_path_buf());
        }
    }

    decode_path(dir_name)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Write;

    use tempfile::TempDir;

    use super::*;
    use crate::parsers::parse_transcript_bytes;

    const ID_A: &str = "11111111-1111-1111-1111-111111111111";
    const ID_B: &str = "22222222-2222-2222-2222-222222222222";

    fn create_project_dir(root: &Path, encoded_name: &str, files: &[&str]) -> PathBuf {
        let project_dir = root.join(encoded_name);
        fs::create_dir_all(&project_dir).expect("Failed to create project dir");

        for filename in files {
            let mut file = fs::File::create(project_dir.join(filename)).expect("Failed to create file");
            file.write_all(b"{}\n").expect("Failed to write file");
        }

        project_dir
    }

    fn transcript_name(id: &str) -> String {
        format!("{id}.jsonl")
    }

    #[test]
    fn test_discover_projects_with_valid_structure() {
        let root = TempDir::new().unwrap();
        create_project_dir(root.path(), "-Users-test-project2", &[&transcript_name(ID_B)]);
        create_project_dir(root.path(), "-Users-test-project1", &[&transcript_name(ID_A)]);

        let discovery = discover_projects(root.path(), &Scope::AllProjects).unwrap();
        assert!(discovery.warnings.is_empty());
        assert_eq!(discovery.projects.len(), 2);
        assert_eq!(discovery.projects[0].dir_name, "-Users-test-project1");
        assert_eq!(discovery.projects[0].dir, root.path().join("-Users-test-project1"));
        assert!(discovery.projects[0].transcripts[0].ends_with(transcript_name(ID_A)));
        assert_eq!(discovery.projects[1].dir_name, "-Users-test-project2");
    }

    #[test]
    fn test_discover_projects_missing_root() {
        let root = TempDir::new().unwrap();
        let discovery = discover_projects(&root.path().join("missing"), &Scope::AllProjects).unwrap();
        assert!(discovery.projects.is_empty());
    }

    #[test]
    fn test_discover_projects_skips_non_transcript_files() {
        let root = TempDir::new().unwrap();
        create_project_dir(
            root.path(),
            "-Users-test-project",
            &[
                &transcript_name(ID_A),
                "agent-1234.jsonl",
                "readme.txt",
                ".11111111-1111-1111-1111-111111111112.jsonl.tmp",
                "11111111-1111-1111-1111-11111111111.jsonl",
                "AAAAAAAA-1111-1111-1111-111111111111.jsonl",
            ],
        );
        fs::write(root.path().join("stray-file.txt"), "x").unwrap();

        let discovery = discover_projects(root.path(), &Scope::AllProjects).unwrap();
        assert_eq!(discovery.projects.len(), 1);
        assert_eq!(discovery.projects[0].transcripts.len(), 1);
    }

    #[test]
    fn test_discover_projects_current_scope() {
        let root = TempDir::new().unwrap();
        create_project_dir(root.path(), "-home-u-proj", &[&transcript_name(ID_A)]);
        create_project_dir(root.path(), "-home-u-other", &[&transcript_name(ID_B)]);
        create_project_dir(root.path(), "-home-u-my-app", &[]);

        let scope = Scope::CurrentProject(PathBuf::from("/home/u/proj"));
        let discovery = discover_projects(root.path(), &scope).unwrap();
        assert_eq!(discovery.projects.len(), 1);
        assert_eq!(discovery.projects[0].dir_name, "-home-u-proj");

        // Legacy lossy directory names are matched too
        let scope = Scope::CurrentProject(PathBuf::from("/home/u/my-app"));
        let discovery = discover_projects(root.path(), &scope).unwrap();
        assert_eq!(discovery.projects.len(), 1);
        assert_eq!(discovery.projects[0].dir_name, "-home-u-my-app");
    }

    #[cfg(unix)]
    #[test]
    fn test_discover_projects_skips_symlinked_directories() {
        let root = TempDir::new().unwrap();
        let real = create_project_dir(root.path(), "-home-u-real", &[&transcript_name(ID_A)]);
        std::os::unix::fs::symlink(&real, root.path().join("-home-u-link")).unwrap();

        let discovery = discover_projects(root.path(), &Scope::AllProjects).unwrap();
        assert_eq!(discovery.projects.len(), 1);
        assert_eq!(discovery.warnings.len(), 1);
    }

    #[test]
    fn test_is_conversation_id() {
        assert!(is_conversation_id(ID_A));
        assert!(!is_conversation_id("11111111111111111111111111111111"));
        assert!(!is_conversation_id("AAAAAAAA-1111-1111-1111-111111111111"));
        assert!(!is_conversation_id("agent-1234"));
    }

    #[test]
    fn test_resolve_project_path_from_legacy_metadata() {
        let parsed = parse_transcript_bytes(
            br#"{"type":"summary"}
{"cwd":"/Users/kyle/Code/my-projects/claude-bushwack","type":"user"}"#,
            Path::new("mem"),
        );
        let config = RewriteConfig::default();

        let resolved =
            resolve_project_path("-Users-kyle-Code-my-projects-claude-bushwack", &[&parsed], &config).unwrap();
        assert_eq!(resolved, PathBuf::from("/Users/kyle/Code/my-projects/claude-bushwack"));
    }

    #[test]
    fn test_resolve_project_path_ignores_unrelated_metadata() {
        let parsed = parse_transcript_bytes(br#"{"cwd":"/somewhere/else"}"#, Path::new("mem"));
        let config = RewriteConfig::default();

        let resolved = resolve_project_path("-home-u-proj", &[&parsed], &config).unwrap();
        assert_eq!(resolved, PathBuf::from("/home/u/proj"));

        assert!(resolve_project_path("-home-u--config", &[&parsed], &config).is_err());
    }

    #[test]
    fn test_resolve_project_path_recovers_dot_directories() {
        let parsed = parse_transcript_bytes(br#"{"cwd":"/home/u/.config"}"#, Path::new("mem"));
        let resolved = resolve_project_path("-home-u--config", &[&parsed], &RewriteConfig::default()).unwrap();
        assert_eq!(resolved, PathBuf::from("/home/u/.config"));
    }
}
