use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::RewriteConfig;
use crate::parsers::deserializers::parse_timestamp;

pub const RECORD_TYPE_SUMMARY: &str = "summary";

pub const TYPE_KEY: &str = "type";
pub const PARENT_UUID_KEY: &str = "parentUuid";
pub const SESSION_ID_KEY: &str = "sessionId";
pub const TIMESTAMP_KEY: &str = "timestamp";
pub const MESSAGE_KEY: &str = "message";

/// One line of a transcript: any JSON object
///
/// The record is the object itself, in its original key order. Accessors read
/// the keys the engine cares about and tolerate any value type, so a record with
/// unexpected types is still a record, and writing it back never drops or
/// reorders keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranscriptRecord {
    fields: Map<String, Value>,
}

impl TranscriptRecord {
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.fields
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn record_type(&self) -> Option<&str> {
        self.get_str(TYPE_KEY)
    }

    /// Conversation this transcript was branched from, when recorded on this line
    pub fn parent_id(&self) -> Option<&str> {
        self.get_str(PARENT_UUID_KEY).filter(|id| !id.is_empty())
    }

    pub fn session_id(&self) -> Option<&str> {
        self.get_str(SESSION_ID_KEY)
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.fields.get(TIMESTAMP_KEY).and_then(parse_timestamp)
    }

    /// The message payload, if present and not `null`
    pub fn message(&self) -> Option<&Value> {
        self.fields.get(MESSAGE_KEY).filter(|m| !m.is_null())
    }

    pub fn is_summary(&self) -> bool {
        self.record_type() == Some(RECORD_TYPE_SUMMARY)
    }

    pub fn summary_text(&self) -> Option<&str> {
        self.get_str("summary")
    }

    pub fn is_meta(&self) -> bool {
        self.fields.get("isMeta").and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn git_branch(&self) -> Option<&str> {
        self.get_str("gitBranch").map(str::trim).filter(|b| !b.is_empty())
    }

    /// Point the record at a parent conversation; returns whether it changed
    ///
    /// An existing `parentUuid` keeps its position, a new one is appended.
    pub fn set_parent_id(&mut self, parent_id: &str) -> bool {
        if self.get_str(PARENT_UUID_KEY) == Some(parent_id) {
            return false;
        }
        self.fields.insert(PARENT_UUID_KEY.to_string(), Value::from(parent_id));
        true
    }

    /// Drop the parent link entirely; returns whether one was present
    pub fn remove_parent(&mut self) -> bool {
        self.fields.shift_remove(PARENT_UUID_KEY).is_some()
    }

    /// Replace `sessionId` when it equals `from`; returns whether it changed
    pub fn replace_session_id(&mut self, from: &str, to: &str) -> bool {
        match self.fields.get_mut(SESSION_ID_KEY) {
            Some(Value::String(current)) if *current == from && from != to => {
                *current = to.to_string();
                true
            }
            _ => false,
        }
    }

    /// First project path named by a configured field, at top level or inside a
    /// nested `metadata` object
    pub fn project_path_hint(&self, config: &RewriteConfig) -> Option<&str> {
        fn lookup<'m>(map: &'m Map<String, Value>, config: &RewriteConfig) -> Option<&'m str> {
            config
                .project_path_fields
                .iter()
                .filter_map(|field| map.get(field).and_then(Value::as_str))
                .map(str::trim)
                .find(|value| !value.is_empty())
        }

        lookup(&self.fields, config).or_else(|| match self.fields.get("metadata") {
            Some(Value::Object(metadata)) => lookup(metadata, config),
            _ => None,
        })
    }
}

impl From<Map<String, Value>> for TranscriptRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}
