pub mod environment;
pub mod files;
pub mod paths;
pub mod terminal;

pub use environment::{current_project_path, resolve_storage_root};
pub use files::safe_open_file;
pub use paths::{decode_path, encode_path, format_path_with_tilde, legacy_dir_name};
