//! @ai:module:intent Low-level text scanning primitives shared by the walkers
//! @ai:module:layer domain
//! @ai:module:public_api normalize_newlines, strip_comments, balance_check, find_open_brace, matching_end_brace, find_until, rest_of_line, count_newlines
//! @ai:module:depends_on error
//! @ai:module:stateless true

use crate::error::ScanError;
use std::borrow::Cow;

/// @ai:intent Convert CRLF line endings to LF so line-anchored rules see plain '\n'
/// @ai:effects pure
pub fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if text.contains("\r\n") {
        Cow::Owned(text.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// @ai:intent Blank out every line whose first non-space character is '#'
/// @ai:post line count is unchanged
/// @ai:example ("a\n  # note\nb") -> "a\n\nb"
/// @ai:effects pure
pub fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());

    for line in text.split_inclusive('\n') {
        if line.trim_start_matches(' ').starts_with('#') {
            if line.ends_with('\n') {
                out.push('\n');
            }
        } else {
            out.push_str(line);
        }
    }

    out
}

/// Index of the first '{' not nested inside parentheses, so hash defaults in
/// class parameters do not end a header early.
pub fn find_open_brace(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (index, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            '{' if depth == 0 => return Some(index),
            _ => {}
        }
    }
    None
}

/// @ai:intent Net brace count of the text: opens minus closes
/// @ai:post 0 means balanced, > 0 missing '}', < 0 missing '{'
/// @ai:effects pure
pub fn balance_check(text: &str) -> isize {
    text.bytes().fold(0, |count, byte| match byte {
        b'{' => count + 1,
        b'}' => count - 1,
        _ => count,
    })
}

/// @ai:intent Index immediately after the brace matching the '{' at `open`
/// @ai:pre text[open] is '{' and the text is globally balanced
/// @ai:example ("{ { } }", 0) -> Ok(7)
/// @ai:effects pure
pub fn matching_end_brace(text: &str, open: usize) -> Result<usize, ScanError> {
    let bytes = text.as_bytes();
    if bytes.get(open) != Some(&b'{') {
        return Err(ScanError::NotAnOpenBrace {
            index: open,
            found: text.get(open..).and_then(|rest| rest.chars().next()),
        });
    }

    let mut depth = 0usize;
    for (offset, byte) in bytes[open..].iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(open + offset + 1);
                }
            }
            _ => {}
        }
    }

    Err(ScanError::Unterminated { start: open, depth })
}

/// @ai:intent Prefix of the text before the first `target` (or `alt`, whichever comes first)
/// @ai:post returns the prefix and its byte length
/// @ai:effects pure
pub fn find_until(text: &str, target: char, alt: Option<char>) -> Result<(&str, usize), ScanError> {
    let found = match alt {
        Some(alt) => text.find(|c| c == target || c == alt),
        None => text.find(target),
    };

    match found {
        Some(size) => Ok((&text[..size], size)),
        None => Err(ScanError::Missing { target }),
    }
}

/// @ai:intent Prefix up to the next newline, or the whole text on the last line
/// @ai:effects pure
pub fn rest_of_line(text: &str) -> &str {
    match text.find('\n') {
        Some(end) => &text[..end],
        None => text,
    }
}

/// @ai:intent Number of line breaks plus one
/// @ai:example ("a\nb") -> 2
/// @ai:effects pure
pub fn count_newlines(text: &str) -> usize {
    text.bytes().filter(|&b| b == b'\n').count() + 1
}
