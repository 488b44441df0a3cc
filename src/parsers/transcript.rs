use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::models::TranscriptRecord;
use crate::utils::safe_open_file;

/// Parseable records of a transcript plus the number of lines that were not
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedTranscript {
    pub records: Vec<TranscriptRecord>,
    pub malformed_lines: usize,
}

/// Read and parse a transcript file
///
/// Only I/O failures are errors. Malformed lines are counted and skipped so one
/// corrupt line never invalidates the rest of the file.
pub fn parse_transcript_file(path: &Path) -> std::io::Result<ParsedTranscript> {
    let mut bytes = Vec::new();
    safe_open_file(path)?.read_to_end(&mut bytes)?;
    Ok(parse_transcript_bytes(&bytes, path))
}

/// Parse transcript contents already in memory; `path` is only used for logging
pub fn parse_transcript_bytes(bytes: &[u8], path: &Path) -> ParsedTranscript {
    let mut parsed = ParsedTranscript::default();

    for (line_num, raw_line) in bytes.split(|b| *b == b'\n').enumerate() {
        let Some(record) = parse_line(raw_line) else {
            if !raw_line.trim_ascii().is_empty() {
                debug!(path = %path.display(), line = line_num + 1, "skipping malformed transcript line");
                parsed.malformed_lines += 1;
            }
            continue;
        };
        parsed.records.push(record);
    }

    parsed
}

/// Parse one raw line; `None` for blank, non-UTF-8 or non-object lines
pub fn parse_line(raw_line: &[u8]) -> Option<TranscriptRecord> {
    let line = std::str::from_utf8(raw_line).ok()?.trim();
    if line.is_empty() {
        return None;
    }
    serde_json::from_str(line).ok()
}
