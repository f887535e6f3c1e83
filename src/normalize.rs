//! Whitespace normalization for marker fields.
//!
//! Collapses whitespace runs outside double-quoted strings and
//! single-quoted char literals to a single space, elides backslash-newline
//! continuations, and trims the result. Literal contents pass through
//! verbatim.

use regex::Regex;
use std::sync::LazyLock;

static RE_CONTINUATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\\r?\n").unwrap());
/// One leading separator comma left over in front of the parameter list.
static RE_LEADING_COMMA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*,\s*").unwrap());

fn is_space(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r')
}

/// Normalize a raw field. `is_param` additionally strips one leading
/// separator comma.
///
/// Total: an unterminated string simply runs to the end of the input.
pub fn normalize(raw: &str, is_param: bool) -> String {
    let joined = RE_CONTINUATION.replace_all(raw, "");

    let mut out = String::with_capacity(joined.len());
    // The quote char that opened the current literal
    let mut quote: Option<char> = None;
    let mut last_was_space = false;
    // Consecutive backslashes immediately before the current char. Odd = escaped.
    let mut backslashes = 0usize;

    for ch in joined.chars() {
        let escaped = backslashes % 2 == 1;
        if let Some(open) = quote {
            out.push(ch);
            if ch == open && !escaped {
                quote = None;
            }
        } else if is_space(ch) {
            if !last_was_space {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            if matches!(ch, '"' | '\'') && !escaped {
                quote = Some(ch);
            }
            out.push(ch);
            last_was_space = false;
        }

        if ch == '\\' {
            backslashes += 1;
        } else {
            backslashes = 0;
        }
        if quote.is_some() {
            last_was_space = false;
        }
    }

    let out = if is_param {
        match RE_LEADING_COMMA.find(&out) {
            Some(m) => &out[m.end()..],
            None => out.trim_start(),
        }
    } else {
        out.as_str()
    };
    out.trim().to_string()
}
