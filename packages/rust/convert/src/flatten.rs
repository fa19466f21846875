//! Recursive reduction of nested verse content to plain text.

use serde_json::Value;

/// Flatten a nested content value into a single string.
///
/// Strings pass through unchanged. Objects yield their `content` (flattened)
/// or, failing that, their `text`. Arrays join their non-empty flattened
/// elements with a single space. Other scalars print as JSON does and
/// `null` is empty.
pub fn flatten_content(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(map) => {
            if let Some(content) = map.get("content") {
                flatten_content(content)
            } else if let Some(text) = map.get("text") {
                flatten_content(text)
            } else {
                String::new()
            }
        }
        Value::Array(items) => {
            let parts: Vec<String> = items
                .iter()
                .map(flatten_content)
                .filter(|part| !part.is_empty())
                .collect();
            parts.join(" ")
        }
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_string_is_unchanged() {
        let s = "  In the beginning  ";
        assert_eq!(flatten_content(&json!(s)), s);
    }

    #[test]
    fn flattening_is_idempotent_on_flat_strings() {
        let once = flatten_content(&json!(["In", {"text": "the"}, ["beginning"]]));
        let twice = flatten_content(&json!(once.clone()));
        assert_eq!(once, "In the beginning");
        assert_eq!(twice, once);
    }

    #[test]
    fn object_prefers_content_over_text() {
        let node = json!({"content": ["nested"], "text": "direct"});
        assert_eq!(flatten_content(&node), "nested");

        let node = json!({"text": "direct", "poem": 1});
        assert_eq!(flatten_content(&node), "direct");

        let node = json!({"lineBreak": true});
        assert_eq!(flatten_content(&node), "");
    }

    #[test]
    fn sequence_drops_empty_parts() {
        let content = json!([
            "God said,",
            {"lineBreak": true},
            "",
            {"text": "“Let there be light,”", "poem": 1},
            {"noteId": 3},
            "and there was light."
        ]);
        assert_eq!(
            flatten_content(&content),
            "God said, “Let there be light,” and there was light."
        );
    }

    #[test]
    fn deep_nesting_recurses() {
        let content = json!({"content": [{"content": [{"content": ["a"]}, "b"]}, [["c"]]]});
        assert_eq!(flatten_content(&content), "a b c");
    }

    #[test]
    fn scalars_degrade_to_text() {
        assert_eq!(flatten_content(&json!(12)), "12");
        assert_eq!(flatten_content(&json!(true)), "true");
        assert_eq!(flatten_content(&Value::Null), "");
        assert_eq!(flatten_content(&json!([])), "");
    }
}
