//! Locates the JSON payload inside free-form model output.
//!
//! Models wrap JSON in prose or code fences. Only the first balanced
//! bracket span is decoded; quotes and escapes inside string literals are
//! honoured so `"]"` in a summary does not end the span early.

use serde_json::Value;

/// Returns the first balanced span opened by `open` (`[` or `{`).
///
/// Returns `None` when there is no such opener or the span never closes.
pub fn first_balanced_span(text: &str, open: char) -> Option<&str> {
    let start = text.find(open)?;
    let mut stack: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
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
            '[' => stack.push(']'),
            '{' => stack.push('}'),
            ']' | '}' => {
                if stack.pop() != Some(c) {
                    return None;
                }
                if stack.is_empty() {
                    return Some(&text[start..start + offset + c.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Decodes the first JSON array in `text`; absent or undecodable is empty.
pub fn extract_array(text: &str) -> Vec<Value> {
    first_balanced_span(text, '[')
        .and_then(|span| serde_json::from_str::<Vec<Value>>(span).ok())
        .unwrap_or_default()
}

/// Decodes the first JSON object in `text`; absent or undecodable is empty.
pub fn extract_object(text: &str) -> serde_json::Map<String, Value> {
    first_balanced_span(text, '{')
        .and_then(|span| serde_json::from_str::<serde_json::Map<String, Value>>(span).ok())
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn finds_array_inside_prose_and_fences() {
        let text = "Here you go:\n```json\n[{\"a\": 1}]\n```\nAnything else? [x]";
        assert_eq!(first_balanced_span(text, '['), Some("[{\"a\": 1}]"));
    }

    #[test]
    fn brackets_inside_strings_are_ignored() {
        let text = r#"[{"summary": "closes ] early? no \" still ] inside"}] trailing ]"#;
        assert_eq!(
            first_balanced_span(text, '['),
            Some(r#"[{"summary": "closes ] early? no \" still ] inside"}]"#)
        );
    }

    #[test]
    fn nested_object_span() {
        let text = r#"Verdict: {"verdict": "VERIFIED", "meta": {"x": [1, 2]}} done {"other": 1}"#;
        assert_eq!(
            first_balanced_span(text, '{'),
            Some(r#"{"verdict": "VERIFIED", "meta": {"x": [1, 2]}}"#)
        );
    }

    #[test]
    fn unbalanced_or_missing_is_none() {
        assert_eq!(first_balanced_span("no json here", '['), None);
        assert_eq!(first_balanced_span("[1, 2", '['), None);
        assert_eq!(first_balanced_span("[1, 2}", '['), None);
    }

    #[test]
    fn undecodable_span_is_empty() {
        assert!(extract_array("[not json]").is_empty());
        assert!(extract_object("{verdict: VERIFIED}").is_empty());
        assert!(extract_array("").is_empty());
    }

    #[test]
    fn greedy_match_would_have_failed() {
        let text = r#"["a", "b"] and later ["c"]"#;
        let values = extract_array(text);
        assert_eq!(values.len(), 2);
        assert_eq!(values[0], "a");
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn span_search_never_panics(s in "\\PC*") {
                let _ = first_balanced_span(&s, '[');
                let _ = first_balanced_span(&s, '{');
            }

            #[test]
            fn array_survives_surrounding_prose(
                prefix in "[a-zA-Z ,.:]{0,20}",
                items in proptest::collection::vec("[a-z\\[\\]{} \"\\\\]{0,10}", 0..5)
            ) {
                let json = serde_json::to_string(&items).unwrap();
                let text = format!("{prefix}{json} hope this helps ]");
                let values = extract_array(&text);
                let decoded: Vec<&str> = values.iter().filter_map(Value::as_str).collect();
                prop_assert_eq!(decoded, items.iter().map(String::as_str).collect::<Vec<_>>());
            }
        }
    }
}
