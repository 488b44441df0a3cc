//! Data models for the conversation store.
//!
//! - [`TranscriptRecord`] - One JSON object line of a transcript, kept in its
//!   original key order with accessors for the keys the engine reads or writes
//! - [`ConversationRecord`] - A discovered conversation, built from its transcript
//! - [`Catalog`] - The flat result of a discovery scan, plus its [`ScanWarning`]s

pub mod catalog;
pub mod conversation;
pub mod record;

pub use catalog::{Catalog, IdRegistry, ScanWarning, Scope};
pub use conversation::ConversationRecord;
pub use record::TranscriptRecord;
