//! Context-excerpt rendering for diagnostics.
//!
//! The lexer points errors at a byte offset; this module turns that offset
//! into a small window of surrounding source with a caret under the
//! offending character:
//!
//! ```text
//! ...let x = @y + 1...
//!               ^
//! ```

/// Returns a window of `radius` characters around `offset` with a caret
/// pointing at the character at `offset`.
///
/// `offset` is a byte index into `source`; it is clamped to the nearest
/// character boundary so multi-byte UTF-8 input never panics.
///
/// # Examples
///
/// ```
/// use mscc_util::excerpt;
///
/// let out = excerpt("let x = @y", 8, 20);
/// assert!(out.starts_with("...let x = @y..."));
/// assert!(out.ends_with("^"));
/// ```
pub fn excerpt(source: &str, offset: usize, radius: usize) -> String {
    let offset = clamp_to_boundary(source, offset.min(source.len()));
    let mut start = offset.saturating_sub(radius);
    while start > 0 && !source.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = (offset + radius).min(source.len());
    while end < source.len() && !source.is_char_boundary(end) {
        end += 1;
    }

    let window = &source[start..end];
    // Caret lands under the offending char: 3 for the leading "..." plus
    // one column per character before the offset.
    let pointer = source[start..offset].chars().count();
    format!("...{}...\n{}^", window, " ".repeat(3 + pointer))
}

fn clamp_to_boundary(source: &str, mut offset: usize) -> usize {
    while offset > 0 && !source.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}
