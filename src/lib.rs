//! Claude Bushwack - Browse and branch Claude Code conversations
//!
//! This library manages the store of conversation transcripts kept under
//! `~/.claude/projects/`, one directory per project. It supports:
//!
//! - Encoding and decoding project paths to and from storage directory names
//! - Discovering conversations into a [`Catalog`], tolerating damaged files
//! - Rebuilding the branch forest from parent links, including broken ones
//! - Branching or copying a conversation, optionally into another project, with
//!   project metadata rewritten and the new file committed atomically
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use claude_bushwack::{Scope, branch_conversation, build, scan};
//!
//! let root = Path::new("/Users/alice/.claude/projects");
//! let catalog = scan(root, &Scope::AllProjects)?;
//! let forest = build(&catalog);
//! println!("{} conversations in {} trees", forest.len(), forest.roots().count());
//!
//! let branch = branch_conversation(root, &catalog, "550e8400", Some(Path::new("/Users/alice/other")))?;
//! println!("Created {}", branch.id);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod branch;
pub mod cli;
pub mod config;
pub mod error;
pub mod indexer;
pub mod models;
pub mod parsers;
pub mod tree;
pub mod utils;

// Re-export commonly used types
pub use branch::{BranchEngine, branch, branch_conversation, copy_conversation};
pub use config::RewriteConfig;
pub use error::{BranchError, CodecError, ScanError};
pub use indexer::{scan, scan_with_config};
pub use models::{Catalog, ConversationRecord, IdRegistry, ScanWarning, Scope, TranscriptRecord};
pub use tree::{Forest, build};
pub use utils::paths::{decode_path, encode_path, format_path_with_tilde};
