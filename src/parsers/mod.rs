//! Transcript parsing
//!
//! # Error Handling Strategy
//!
//! Parsing degrades gracefully: a line that is not a JSON object is counted and
//! skipped, never fatal. Only failing to open or read the file is an error, and the
//! discovery layer turns that into a skip-with-warning as well.

pub mod conversation;
pub mod deserializers;
pub mod preview;
pub mod transcript;

pub use conversation::{conversation_from_transcript, parse_conversation_file};
pub use transcript::{ParsedTranscript, parse_line, parse_transcript_bytes, parse_transcript_file};
