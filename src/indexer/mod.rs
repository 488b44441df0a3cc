//! Discovery of conversations under the storage root
//!
//! Every call rebuilds the [`Catalog`](crate::models::Catalog) from disk; nothing
//! is cached between scans. Problems with individual directories, files or lines
//! become [`ScanWarning`](crate::models::ScanWarning)s on the catalog instead of
//! failing the scan.

pub mod builder;
pub mod project_discovery;

pub use builder::{scan, scan_with_config};
pub use project_discovery::{
    Discovery, ProjectDirectory, discover_projects, is_conversation_id, is_transcript_path, resolve_project_path,
};
