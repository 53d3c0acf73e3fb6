//! Bounded JSON recovery for responses produced without a schema constraint.

use serde_json::Value;

/// Upper bound on `{` positions tried before giving up on a response.
const MAX_CANDIDATES: usize = 64;

/// Removes a surrounding markdown code fence (with or without a language tag).
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(body) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string (`json`, `JSON`, ...) up to the end of the opening fence line.
    let body = match body.find('\n') {
        Some(newline) if !body[..newline].contains('{') => &body[newline + 1..],
        _ => body.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };
    body.trim().strip_suffix("```").unwrap_or(body).trim()
}

/// Returns the first balanced `{...}` span in `text` that parses as a JSON object.
///
/// Models sometimes wrap JSON in prose or fences. Braces inside string literals
/// are ignored while matching. At most `MAX_CANDIDATES` opening braces are tried.
pub fn extract_first_json_object(text: &str) -> Option<&str> {
    let mut search_from = 0;
    for _ in 0..MAX_CANDIDATES {
        let start = search_from + text[search_from..].find('{')?;
        if let Some(end) = matching_brace(&text[start..]) {
            let candidate = &text[start..=start + end];
            let is_object = serde_json::from_str::<Value>(candidate)
                .map(|v| v.is_object())
                .unwrap_or(false);
            if is_object {
                return Some(candidate);
            }
        }
        search_from = start + 1;
    }
    None
}

/// Byte offset of the `}` closing the `{` at the start of `s`.
fn matching_brace(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in s.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
