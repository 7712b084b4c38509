use serde_json::{json, Value};

/// Extract plain text from Jira's Atlassian Document Format (ADF).
pub fn extract_text_from_adf(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(arr) => {
            let parts: Vec<String> = arr.iter().filter_map(extract_text_from_adf).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join("\n"))
            }
        }
        Value::Object(obj) => {
            if obj.get("type").and_then(|v| v.as_str()) == Some("text") {
                return obj.get("text").and_then(|v| v.as_str()).map(String::from);
            }
            if let Some(content) = obj.get("content") {
                return extract_text_from_adf(content);
            }
            None
        }
        _ => None,
    }
}

/// Wrap plain text into a single-paragraph ADF document.
///
/// An empty input produces a paragraph with no content nodes, which Jira
/// accepts as a cleared description; empty text nodes it does not.
pub fn text_to_adf(text: &str) -> Value {
    let paragraph = if text.is_empty() {
        json!({ "type": "paragraph", "content": [] })
    } else {
        json!({
            "type": "paragraph",
            "content": [{ "type": "text", "text": text }]
        })
    };
    json!({ "type": "doc", "version": 1, "content": [paragraph] })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_text_from_doc() {
        let doc = json!({
            "type": "doc",
            "version": 1,
            "content": [{
                "type": "paragraph",
                "content": [{ "type": "text", "text": "client: Acme" }]
            }]
        });
        assert_eq!(extract_text_from_adf(&doc), Some("client: Acme".to_string()));
    }

    #[test]
    fn joins_paragraphs_with_newlines() {
        let doc = json!({
            "type": "doc",
            "version": 1,
            "content": [
                { "type": "paragraph", "content": [{ "type": "text", "text": "client: Acme" }] },
                { "type": "paragraph", "content": [{ "type": "text", "text": "description: broken" }] },
            ]
        });
        assert_eq!(
            extract_text_from_adf(&doc),
            Some("client: Acme\ndescription: broken".to_string())
        );
    }

    #[test]
    fn plain_string_passes_through() {
        assert_eq!(
            extract_text_from_adf(&json!("client: Acme")),
            Some("client: Acme".to_string())
        );
    }

    #[test]
    fn null_and_empty_are_none() {
        assert_eq!(extract_text_from_adf(&Value::Null), None);
        assert_eq!(extract_text_from_adf(&json!({ "type": "doc", "content": [] })), None);
    }

    #[test]
    fn wraps_text_in_single_paragraph() {
        let doc = text_to_adf("fix the login flow");
        assert_eq!(doc["type"], "doc");
        assert_eq!(doc["version"], 1);
        assert_eq!(doc["content"][0]["type"], "paragraph");
        assert_eq!(doc["content"][0]["content"][0]["text"], "fix the login flow");
    }

    #[test]
    fn empty_text_has_no_text_nodes() {
        let doc = text_to_adf("");
        assert_eq!(doc["content"][0]["content"].as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn wrapped_text_extracts_back() {
        let doc = text_to_adf("client: Acme\ndescription: broken");
        assert_eq!(
            extract_text_from_adf(&doc),
            Some("client: Acme\ndescription: broken".to_string())
        );
    }
}
