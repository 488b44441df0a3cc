//! Terminal-safe rendering of transcript text
//!
//! Previews come straight from transcript files, so escape sequences and control
//! characters are removed before anything is printed.

/// Reduce free-form transcript text to a single sanitized line of at most
/// `max_chars` characters
///
/// ANSI CSI sequences are dropped, control characters and runs of whitespace
/// collapse to one space, and truncated output ends with `…`.
///
/// # Examples
///
/// ```
/// use claude_bushwack::utils::terminal::preview_line;
///
/// assert_eq!(preview_line("\x1b[31mfix\x1b[0m the\n\nbuild", 40), "fix the build");
/// assert_eq!(preview_line("abcdef", 4), "abc…");
/// ```
pub fn preview_line(text: &str, max_chars: usize) -> String {
    let mut cleaned = String::with_capacity(text.len().min(max_chars * 4));
    let mut chars = text.chars().peekable();
    let mut pending_space = false;

    while let Some(ch) = chars.next() {
        if ch == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            for next_ch in chars.by_ref() {
                if next_ch.is_ascii_alphabetic() {
                    break;
                }
            }
            continue;
        }

        if ch.is_whitespace() || ch.is_control() {
            pending_space = !cleaned.is_empty();
            continue;
        }

        if pending_space {
            cleaned.push(' ');
            pending_space = false;
        }
        cleaned.push(ch);
    }

    if cleaned.chars().count() <= max_chars {
        return cleaned;
    }

    let mut truncated: String = cleaned.chars().take(max_chars.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}
