//! Branching and copying conversations
//!
//! # Error Handling Strategy
//!
//! Unlike discovery, every problem here is fatal to the operation and returned
//! as a [`BranchError`](crate::error::BranchError). A silently partial branch
//! would corrupt the conversation graph, so:
//!
//! - the source transcript is opened read-only and never written
//! - the new transcript is only linked under its final name once fully written
//!   and synced; failures before that remove the temporary file
//! - an existing file at the final name is never overwritten

pub mod commit;
pub mod engine;
pub mod git;
pub mod rewrite;

pub use commit::PendingTranscript;
pub use engine::{BranchEngine, DEFAULT_MAX_ID_ATTEMPTS, branch, branch_conversation, copy_conversation};
pub use git::detect_git_branch;
pub use rewrite::{ParentLink, Relocation, RewritePlan, rewrite_transcript};
