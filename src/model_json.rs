//! Best-effort extraction of a JSON object from free-text model output.
//!
//! Even with a JSON response mode requested, model replies occasionally
//! arrive wrapped in markdown code fences or surrounded by prose. This
//! module is the fallback path: it strips fence markers, slices between the
//! outermost braces, and parses the result.
//!
//! This is a heuristic, not a true JSON extractor. It assumes the reply
//! contains at most one well-formed object and that no stray `{` or `}`
//! appears in prose before or after the real object.

use crate::errors::AppError;
use serde_json::{Map, Value};

/// Parses a JSON object out of raw model output.
///
/// # Arguments
///
/// * `raw_text` - The text returned by the model, possibly fenced or
///   surrounded by prose.
///
/// # Returns
///
/// * `Result<Map<String, Value>, AppError>` - The parsed object, or
///   `MalformedModelResponse` if no object delimiters are found or the slice
///   does not parse as a JSON object.
pub fn parse_model_json(raw_text: &str) -> Result<Map<String, Value>, AppError> {
    let mut text = raw_text.trim().to_string();

    // Strip markdown code fences, with or without a language tag.
    if text.starts_with("```json") {
        text = text.replace("```json", "").replace("```", "");
    } else if text.starts_with("```") {
        text = text.replace("```", "");
    }

    let start = text.find('{');
    let end = text.rfind('}');

    let slice = match (start, end) {
        (Some(start), Some(end)) if end > start => &text[start..=end],
        _ => {
            return Err(AppError::MalformedModelResponse(
                "no JSON object found in model output".to_string(),
            ))
        }
    };

    match serde_json::from_str::<Value>(slice) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(AppError::MalformedModelResponse(
            "model output parsed but is not a JSON object".to_string(),
        )),
        Err(e) => Err(AppError::MalformedModelResponse(format!(
            "failed to parse model output as JSON: {}",
            e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_object() {
        let parsed = parse_model_json(r#"{"match_score": 87}"#).unwrap();
        assert_eq!(parsed.get("match_score"), Some(&json!(87)));
    }

    #[test]
    fn test_fenced_with_language_tag() {
        let raw = "```json\n{\"skills\": [\"rust\"]}\n```";
        let fenced = parse_model_json(raw).unwrap();
        let bare = parse_model_json("{\"skills\": [\"rust\"]}").unwrap();
        assert_eq!(fenced, bare);
    }

    #[test]
    fn test_fenced_without_language_tag() {
        let raw = "```\n{\"experience_years\": 4}\n```";
        let parsed = parse_model_json(raw).unwrap();
        assert_eq!(parsed.get("experience_years"), Some(&json!(4)));
    }

    #[test]
    fn test_prose_around_object() {
        let raw = "Here is the analysis you asked for:\n{\"match_score\": 55}\nHope this helps!";
        let parsed = parse_model_json(raw).unwrap();
        assert_eq!(parsed.get("match_score"), Some(&json!(55)));
    }

    #[test]
    fn test_surrounding_whitespace() {
        let parsed = parse_model_json("  \n {\"a\": 1} \n ").unwrap();
        assert_eq!(parsed.get("a"), Some(&json!(1)));
    }

    #[test]
    fn test_prose_without_object_is_malformed() {
        let err = parse_model_json("I am unable to analyze this resume.").unwrap_err();
        assert!(matches!(err, AppError::MalformedModelResponse(_)));
    }

    #[test]
    fn test_unbalanced_braces_are_malformed() {
        let err = parse_model_json("{\"match_score\": ").unwrap_err();
        assert!(matches!(err, AppError::MalformedModelResponse(_)));
    }

    #[test]
    fn test_top_level_array_is_malformed() {
        // An array containing an object still slices to the inner object,
        // but a brace-free array has no delimiters at all.
        let err = parse_model_json("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, AppError::MalformedModelResponse(_)));
    }
}
