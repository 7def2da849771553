//! Locating JSON literals embedded in inline scripts.

use regex::Regex;

/// Find the JSON literal assigned right after `assignment`.
///
/// `assignment` must match up to and including the `=`; the literal is the
/// first balanced `{...}` or `[...]` that follows, with string contents and
/// escapes skipped so braces inside strings do not affect nesting.
#[must_use]
pub fn assigned_literal<'a>(script: &'a str, assignment: &Regex) -> Option<&'a str> {
    assignment
        .find_iter(script)
        .find_map(|m| balanced_prefix(script[m.end()..].trim_start()))
}

/// Return the balanced object or array at the start of `text`.
#[must_use]
pub fn balanced_prefix(text: &str) -> Option<&str> {
    let close = match text.as_bytes().first()? {
        b'{' => b'}',
        b'[' => b']',
        _ => return None,
    };
    let open = text.as_bytes()[0];

    let mut depth = 0usize;
    let mut in_string: Option<u8> = None;
    let mut escaped = false;

    for (i, &byte) in text.as_bytes().iter().enumerate() {
        if let Some(quote) = in_string {
            if escaped {
                escaped = false;
            } else if byte == b'\\' {
                escaped = true;
            } else if byte == quote {
                in_string = None;
            }
            continue;
        }

        match byte {
            b'"' | b'\'' => in_string = Some(byte),
            b if b == open => depth += 1,
            b if b == close => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[..=i]);
                }
            }
            _ => {}
        }
    }

    None
}
