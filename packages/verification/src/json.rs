//! Helpers for digging JSON out of free-form model replies.

/// Extract the first balanced `{...}` substring from a text.
///
/// Model replies often wrap their JSON in prose or code fences; this scans
/// from the first `{` and returns the slice up to its matching brace.
/// String literals are honoured so braces inside values do not unbalance the
/// scan.
pub(crate) fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Slice `text` around a byte range, expanded by `window` chars on each
/// side, respecting char boundaries.
pub(crate) fn context_window(text: &str, range: std::ops::Range<usize>, window: usize) -> &str {
    let before: usize = text[..range.start]
        .chars()
        .rev()
        .take(window)
        .map(char::len_utf8)
        .sum();
    let after: usize = text[range.end..]
        .chars()
        .take(window)
        .map(char::len_utf8)
        .sum();
    &text[range.start - before..range.end + after]
}

/// Truncate to at most `max` chars on a char boundary.
pub(crate) fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_first_balanced_object() {
        let text = "Here you go:\n```json\n{\"a\": {\"b\": 1}, \"c\": \"x}y\"}\n``` done";
        assert_eq!(
            extract_json_object(text),
            Some(r#"{"a": {"b": 1}, "c": "x}y"}"#)
        );
    }

    #[test]
    fn test_no_object() {
        assert_eq!(extract_json_object("no braces here"), None);
        assert_eq!(extract_json_object("unbalanced { start"), None);
    }

    #[test]
    fn test_escaped_quotes_inside_strings() {
        let text = r#"prefix {"k": "va\"l}ue"} suffix"#;
        assert_eq!(extract_json_object(text), Some(r#"{"k": "va\"l}ue"}"#));
    }

    #[test]
    fn test_context_window_respects_boundaries() {
        let text = "aaaa MATCH bbbb";
        let start = text.find("MATCH").unwrap();
        let ctx = context_window(text, start..start + 5, 2);
        assert_eq!(ctx, "a MATCH b");

        let whole = context_window(text, start..start + 5, 100);
        assert_eq!(whole, text);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("héllo", 2), "hé");
    }
}
