//! Line-level rewriting of a transcript into its branch
//!
//! Lines that need no change are copied byte for byte, including their line
//! endings. Lines that do not parse are never touched.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value, json};

use crate::config::RewriteConfig;
use crate::models::TranscriptRecord;
use crate::models::record::MESSAGE_KEY;
use crate::parsers::parse_line;

/// What the first record of the new transcript says about its origin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentLink {
    /// `parentUuid` names the source conversation
    Source,
    /// `parentUuid` is removed; the copy stands on its own
    Detached,
}

/// Moving a conversation to another project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    pub from_path: PathBuf,
    pub to_path: PathBuf,
    pub from_dir: PathBuf,
    pub to_dir: PathBuf,
    /// Branch checked out at the destination, if known
    pub git_branch: Option<String>,
}

impl Relocation {
    fn rewrite_project_path(&self, value: &str) -> Option<String> {
        if self.from_path == self.to_path {
            return None;
        }
        let current = Path::new(value);
        let rewritten = match current.strip_prefix(&self.from_path) {
            Ok(rest) if rest.as_os_str().is_empty() => self.to_path.clone(),
            Ok(rest) => self.to_path.join(rest),
            Err(_) => self.to_path.clone(),
        };
        let rewritten = rewritten.to_string_lossy().into_owned();
        (rewritten != value).then_some(rewritten)
    }

    fn rewrite_project_dir(&self, value: &str) -> Option<String> {
        let (from_name, to_name) = (self.from_dir.file_name()?, self.to_dir.file_name()?);
        let rewritten = if value == from_name.to_string_lossy() {
            to_name.to_string_lossy().into_owned()
        } else if Path::new(value) == self.from_dir {
            self.to_dir.to_string_lossy().into_owned()
        } else {
            return None;
        };
        (rewritten != value).then_some(rewritten)
    }

    fn rewrite_branch_name(&self, value: &str) -> Option<String> {
        self.git_branch.as_deref().filter(|branch| *branch != value).map(str::to_string)
    }
}

/// Everything needed to turn source records into branch records
#[derive(Debug, Clone)]
pub struct RewritePlan<'a> {
    pub config: &'a RewriteConfig,
    pub source_id: String,
    pub new_id: String,
    pub parent: ParentLink,
    pub relocation: Option<Relocation>,
}

impl RewritePlan<'_> {
    /// Rewrite one record in place; returns whether anything changed
    pub fn apply(&self, record: &mut TranscriptRecord, is_first: bool) -> bool {
        let mut changed = record.replace_session_id(&self.source_id, &self.new_id);

        if is_first {
            changed |= match self.parent {
                ParentLink::Source => record.set_parent_id(&self.source_id),
                ParentLink::Detached => record.remove_parent(),
            };
        }

        if let Some(relocation) = &self.relocation {
            changed |= self.rewrite_fields(record.fields_mut(), relocation);
        }

        changed
    }

    /// Record written ahead of a transcript that has no parseable records
    pub fn marker_record(&self) -> Option<Value> {
        match self.parent {
            ParentLink::Source => Some(json!({ "parentUuid": self.source_id, "sessionId": self.new_id })),
            ParentLink::Detached => None,
        }
    }

    fn rewrite_fields(&self, map: &mut Map<String, Value>, relocation: &Relocation) -> bool {
        let mut changed = false;
        for (key, value) in map.iter_mut() {
            if key == MESSAGE_KEY {
                continue;
            }
            changed |= self.rewrite_value(key, value, relocation);
        }
        changed
    }

    fn rewrite_value(&self, key: &str, value: &mut Value, relocation: &Relocation) -> bool {
        match value {
            Value::Object(map) => self.rewrite_fields(map, relocation),
            Value::Array(items) => {
                let mut changed = false;
                for item in items {
                    changed |= self.rewrite_value(key, item, relocation);
                }
                changed
            }
            Value::String(text) => {
                let rewritten = if self.config.is_branch_name_field(key) {
                    relocation.rewrite_branch_name(text)
                } else if self.config.is_project_dir_field(key) {
                    relocation.rewrite_project_dir(text)
                } else if self.config.is_project_path_field(key) && !text.trim().is_empty() {
                    relocation.rewrite_project_path(text)
                } else {
                    None
                };
                match rewritten {
                    Some(new_text) => {
                        *text = new_text;
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        }
    }
}

/// Produce the branch transcript from the source bytes
///
/// # Errors
///
/// Fails only if a rewritten record cannot be serialized.
pub fn rewrite_transcript(source: &[u8], plan: &RewritePlan<'_>) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = Vec::with_capacity(source.len() + 256);
    let mut seen_record = false;

    for segment in source.split_inclusive(|b| *b == b'\n') {
        let (body, ending) = split_line_ending(segment);
        let Some(mut record) = parse_line(body) else {
            out.extend_from_slice(segment);
            continue;
        };

        let is_first = !seen_record;
        seen_record = true;

        if plan.apply(&mut record, is_first) {
            serde_json::to_writer(&mut out, &record)?;
            out.extend_from_slice(ending);
        } else {
            out.extend_from_slice(segment);
        }
    }

    if !seen_record && let Some(marker) = plan.marker_record() {
        let mut prefixed = serde_json::to_vec(&marker)?;
        prefixed.push(b'\n');
        if !out.is_empty() && !source.ends_with(b"\n") {
            out.push(b'\n');
        }
        prefixed.extend_from_slice(&out);
        return Ok(prefixed);
    }

    Ok(out)
}

fn split_line_ending(segment: &[u8]) -> (&[u8], &[u8]) {
    let ending_len = if segment.ends_with(b"\r\n") {
        2
    } else if segment.ends_with(b"\n") {
        1
    } else {
        0
    };
    segment.split_at(segment.len() - ending_len)
}
