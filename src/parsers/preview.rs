//! Preview text extraction.
//!
//! The preview is the first piece of genuine user input in a transcript. Tool
//! results, hook output, slash-command echoes and meta records look like user
//! messages on disk but are noise for this purpose.

use serde_json::Value;

use crate::models::TranscriptRecord;

const ROLE_USER: &str = "user";

/// Prefixes of user-role text injected by the client rather than typed by a person
const NOISE_PREFIXES: &[&str] = &[
    "<session-start-hook>",
    "<user-prompt-submit-hook>",
    "<command-name>",
    "<command-message>",
    "<local-command-stdout>",
    "<system-reminder>",
    "Caveat: The messages below were generated by the user while running local commands",
    "[Request interrupted by user",
];

/// Returns the user-typed text of a record, or `None` if it is not genuine user input
pub fn user_text(record: &TranscriptRecord) -> Option<String> {
    if record.is_meta() {
        return None;
    }

    let text = match record.message() {
        Some(Value::Object(message)) => {
            if message.get("role").and_then(Value::as_str) != Some(ROLE_USER) {
                return None;
            }
            coerce_text(message)
        }
        Some(_) => return None,
        // Some older clients flatten the message onto the record itself
        None if record.get("role").and_then(Value::as_str) == Some(ROLE_USER) => coerce_text(record.fields()),
        None => return None,
    };

    let trimmed = text.trim();
    if trimmed.is_empty() || is_noise(trimmed) {
        return None;
    }
    Some(trimmed.to_string())
}

fn is_noise(text: &str) -> bool {
    NOISE_PREFIXES.iter().any(|prefix| text.starts_with(prefix))
}

/// Flatten the text of a message object, skipping tool results and non-text blocks
fn coerce_text(message: &serde_json::Map<String, Value>) -> String {
    match message.get("content") {
        Some(Value::String(content)) => return content.clone(),
        Some(Value::Array(blocks)) => {
            let segments: Vec<&str> = blocks.iter().filter_map(block_text).collect();
            if !segments.is_empty() {
                return segments.join(" ");
            }
            // A content array made only of tool results has no user text
            if !blocks.is_empty() {
                return String::new();
            }
        }
        _ => {}
    }

    match message.get("text") {
        Some(Value::String(text)) => return text.clone(),
        Some(Value::Object(inner)) => {
            if let Some(text) = inner.get("text").and_then(Value::as_str) {
                return text.to_string();
            }
        }
        Some(Value::Array(items)) => {
            let segments: Vec<&str> = items.iter().filter_map(block_text).collect();
            if !segments.is_empty() {
                return segments.join(" ");
            }
        }
        _ => {}
    }

    message.get("body").and_then(Value::as_str).map(str::to_string).unwrap_or_default()
}

fn block_text(block: &Value) -> Option<&str> {
    match block {
        Value::String(text) => Some(text.as_str()),
        Value::Object(block) => match block.get("type").and_then(Value::as_str) {
            Some("text") | None => block
                .get("text")
                .or_else(|| block.get("content"))
                .and_then(Value::as_str),
            _ => None,
        },
        _ => None,
    }
}
