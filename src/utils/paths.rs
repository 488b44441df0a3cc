use std::borrow::Cow;
use std::env;
use std::path::{Component, Path, PathBuf};

use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};

use crate::error::CodecError;

/// Character that stands in for a path separator in project directory names
pub const SENTINEL: char = '-';

// A segment may never contain a bare sentinel, so the sentinel and the escape
// character itself are always percent-escaped, along with control characters.
const SEGMENT_ESCAPES: &AsciiSet = &CONTROLS.add(b'%').add(b'-');

/// Encodes an absolute file system path into a project directory name
///
/// Every separator becomes [`SENTINEL`]; literal `-` and `%` inside a segment are
/// escaped as `%2D` and `%25`.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use claude_bushwack::encode_path;
///
/// assert_eq!(encode_path(Path::new("/Users/foo/bar")).unwrap(), "-Users-foo-bar");
/// assert_eq!(encode_path(Path::new("/srv/my-app")).unwrap(), "-srv-my%2Dapp");
/// ```
///
/// # Errors
///
/// Returns [`CodecError::InvalidPath`] if the path is relative, contains a `..`
/// component, or is not valid UTF-8.
pub fn encode_path(path: &Path) -> Result<String, CodecError> {
    if !path.is_absolute() {
        return Err(CodecError::invalid_path(path, "path must be absolute"));
    }

    let mut encoded = String::new();
    for component in path.components() {
        match component {
            Component::RootDir | Component::CurDir => {}
            Component::Normal(segment) => {
                let segment = segment
                    .to_str()
                    .ok_or_else(|| CodecError::invalid_path(path, "path is not valid UTF-8"))?;
                encoded.push(SENTINEL);
                encoded.extend(utf8_percent_encode(segment, SEGMENT_ESCAPES));
            }
            Component::ParentDir => {
                return Err(CodecError::invalid_path(path, "path contains '..' component"));
            }
            Component::Prefix(_) => {
                return Err(CodecError::invalid_path(path, "path prefixes are not supported"));
            }
        }
    }

    // The file system root has no segments
    if encoded.is_empty() {
        encoded.push(SENTINEL);
    }

    Ok(encoded)
}

/// Decodes a project directory name back to the absolute path it was encoded from
///
/// Only canonical names are accepted: re-encoding the result must reproduce the
/// input exactly, so two directory names can never decode to the same path.
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use claude_bushwack::decode_path;
///
/// assert_eq!(decode_path("-Users-foo-bar").unwrap(), PathBuf::from("/Users/foo/bar"));
/// assert!(decode_path("Users-foo").is_err());
/// ```
///
/// # Errors
///
/// Returns [`CodecError::InvalidDirName`] if the name does not start with the
/// sentinel, contains escapes that are not valid UTF-8, or is not canonical
/// (empty segments, escaped separators, `..` segments, lowercase escapes).
pub fn decode_path(dir_name: &str) -> Result<PathBuf, CodecError> {
    let Some(rest) = dir_name.strip_prefix(SENTINEL) else {
        return Err(CodecError::invalid_dir_name(dir_name, "name must start with '-'"));
    };

    let mut path = PathBuf::from("/");
    if !rest.is_empty() {
        for segment in rest.split(SENTINEL) {
            let decoded = percent_decode_str(segment).decode_utf8().map_err(|_| {
                CodecError::invalid_dir_name(dir_name, "escape sequence is not valid UTF-8")
            })?;
            path.push(&*decoded);
        }
    }

    match encode_path(&path) {
        Ok(canonical) if canonical == dir_name => Ok(path),
        _ => Err(CodecError::invalid_dir_name(dir_name, "name is not in canonical form")),
    }
}

/// Directory name the upstream tool derives for a path
///
/// Every character other than an ASCII letter or digit becomes `-`. The mapping is
/// lossy, so it is only used to recognise directories that already exist.
pub fn legacy_dir_name(path: &Path) -> String {
    path.to_string_lossy().chars().map(|c| if c.is_ascii_alphanumeric() { c } else { '-' }).collect()
}

/// Formats a path with ~ substitution for the home directory
pub fn format_path_with_tilde(path: &Path) -> String {
    format_path_with_tilde_internal(path, None)
}

pub(crate) fn format_path_with_tilde_internal(path: &Path, home_override: Option<&str>) -> String {
    let home_from_env = env::var("HOME").ok();
    let home = home_override.or(home_from_env.as_deref());

    let path_str = path.to_string_lossy();
    if let Some(home) = home
        && !home.is_empty()
        && Path::new(path_str.as_ref()).starts_with(home)
    {
        return path_str.replacen(home, "~", 1);
    }

    match path_str {
        Cow::Borrowed(s) => s.to_string(),
        Cow::Owned(s) => s,
    }
}
