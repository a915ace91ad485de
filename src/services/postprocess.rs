use serde_json::{Map, Value};

/// Removes surrounding whitespace and a markdown code fence (```` ```json ````
/// in any case, or a bare ```` ``` ````) from completion output.
pub fn strip_code_fences(raw: &str) -> String {
    let mut clean = raw.trim();

    if let Some(rest) = clean.strip_prefix("```") {
        clean = match rest.get(..4) {
            Some(lang) if lang.eq_ignore_ascii_case("json") => &rest[4..],
            _ => rest,
        };
    }
    if let Some(rest) = clean.strip_suffix("```") {
        clean = rest;
    }

    clean.trim().to_string()
}

/// Decodes cleaned completion output into the response payload.
///
/// Only JSON objects are decoded; anything else is passed through as a string.
pub fn decode_completion(raw: &str) -> Value {
    let clean = strip_code_fences(raw);
    match serde_json::from_str::<Map<String, Value>>(&clean) {
        Ok(object) => Value::Object(object),
        Err(e) => {
            tracing::debug!(error = %e, "Completion output is not a JSON object, returning raw text");
            Value::String(clean)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strips_json_fences() {
        let raw = "\n```json\n{\"card_last_4\": \"1234\"}\n```\n";
        assert_eq!(strip_code_fences(raw), "{\"card_last_4\": \"1234\"}");
    }

    #[test]
    fn strips_uppercase_and_bare_fences() {
        assert_eq!(strip_code_fences("```JSON\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("```Json {} ```"), "{}");
        assert_eq!(strip_code_fences("```\n{\"a\":1}\n```"), "{\"a\":1}");
    }

    #[test]
    fn stripping_is_idempotent() {
        for input in [
            "{\"card_last_4\":\"1234\"}",
            "no structured data found",
            "",
            "```json\n{}\n```",
        ] {
            let once = strip_code_fences(input);
            assert_eq!(strip_code_fences(&once), once);
        }
    }

    #[test]
    fn multibyte_text_after_fence_does_not_panic() {
        assert_eq!(strip_code_fences("```₹5,342```"), "₹5,342");
    }

    #[test]
    fn decodes_objects() {
        let value = decode_completion("```json\n{\"card_last_4\":\"1234\",\"transactions\":null}\n```");
        assert_eq!(value, json!({"card_last_4": "1234", "transactions": null}));
    }

    #[test]
    fn non_json_falls_back_to_trimmed_text() {
        let value = decode_completion("  no structured data found \n");
        assert_eq!(value, Value::String("no structured data found".to_string()));
    }

    #[test]
    fn json_that_is_not_an_object_stays_text() {
        assert_eq!(decode_completion("[1, 2]"), Value::String("[1, 2]".to_string()));
        assert_eq!(decode_completion("42"), Value::String("42".to_string()));
    }
}
