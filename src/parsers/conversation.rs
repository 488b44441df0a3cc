use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};

use super::preview::user_text;
use super::transcript::{ParsedTranscript, parse_transcript_file};
use crate::models::ConversationRecord;

/// Parse a conversation transcript into a [`ConversationRecord`]
///
/// The identifier is the file stem. Timestamps come from the first and last
/// timestamped records, falling back to file metadata when there are none.
///
/// # Errors
///
/// Returns an error only if the file cannot be opened or read.
pub fn parse_conversation_file(path: &Path, project_path: &Path) -> io::Result<ConversationRecord> {
    let parsed = parse_transcript_file(path)?;
    Ok(conversation_from_transcript(path, project_path, &parsed))
}

/// Build a record from an already parsed transcript
pub fn conversation_from_transcript(
    path: &Path,
    project_path: &Path,
    parsed: &ParsedTranscript,
) -> ConversationRecord {
    let id = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();

    let mut created_at = None;
    let mut last_modified_at = None;
    let mut git_branch = None;
    let mut first_user_message = None;
    let mut message_count = 0;

    for record in &parsed.records {
        if let Some(ts) = record.timestamp() {
            created_at.get_or_insert(ts);
            last_modified_at = Some(ts);
        }
        if git_branch.is_none() {
            git_branch = record.git_branch().map(str::to_string);
        }
        if record.message().is_some() {
            message_count += 1;
        }
        if first_user_message.is_none() {
            first_user_message = user_text(record);
        }
    }

    let first = parsed.records.first();
    let summary = first.filter(|r| r.is_summary()).and_then(|r| r.summary_text()).map(str::to_string);
    let parent_id = first.and_then(|r| r.parent_id()).map(str::to_string);

    let (created_at, last_modified_at) = match (created_at, last_modified_at) {
        (Some(created), Some(last)) => (created, last.max(created)),
        _ => file_times(path),
    };

    ConversationRecord {
        id,
        parent_id,
        project_path: project_path.to_path_buf(),
        project_dir: path.parent().map(Path::to_path_buf).unwrap_or_default(),
        file_path: path.to_path_buf(),
        created_at,
        last_modified_at,
        first_user_message: first_user_message.unwrap_or_default(),
        summary,
        git_branch,
        record_count: parsed.records.len(),
        message_count,
        malformed_lines: parsed.malformed_lines,
    }
}

/// Creation and modification time from file metadata, or now if unavailable
fn file_times(path: &Path) -> (DateTime<Utc>, DateTime<Utc>) {
    let now = Utc::now();
    let Ok(metadata) = fs::metadata(path) else {
        return (now, now);
    };

    let modified = metadata.modified().map(DateTime::<Utc>::from).unwrap_or(now);
    let created = metadata.created().map(DateTime::<Utc>::from).unwrap_or(modified);
    (created.min(modified), modified)
}
