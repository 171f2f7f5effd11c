//! Parsing of the model's per-contact verdicts

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResponseError {
    #[error("no JSON object with a contacts array in response: {0:?}")]
    NoJson(String),

    #[error("model returned {got} items, expected {expected}")]
    CountMismatch { expected: usize, got: usize },

    #[error("item indices do not cover 1..={expected}")]
    BadIndices { expected: usize },
}

/// One verdict from the model
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResultItem {
    pub index: usize,

    #[serde(default, deserialize_with = "truthy")]
    pub valid: bool,

    #[serde(default, deserialize_with = "text_or_empty")]
    pub description: String,

    #[serde(default, deserialize_with = "text_or_empty")]
    pub reason: String,
}

#[derive(Deserialize)]
struct ResultEnvelope {
    contacts: Vec<ResultItem>,
}

/// Removes a surrounding ``` or ```json fence
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    trimmed
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Extracts exactly `expected` verdicts, ordered by index
///
/// The cleaned text is parsed as a whole first; failing that, the span from
/// the first `{` to the last `}` is tried. Indices must be a permutation of
/// `1..=expected`.
pub fn parse_contacts_response(text: &str, expected: usize) -> Result<Vec<ResultItem>, ResponseError> {
    let cleaned = strip_code_fences(text);

    let mut candidates = vec![cleaned];
    if let (Some(start), Some(end)) = (cleaned.find('{'), cleaned.rfind('}')) {
        if start < end && &cleaned[start..=end] != cleaned {
            candidates.push(&cleaned[start..=end]);
        }
    }

    let envelope = candidates
        .into_iter()
        .find_map(|candidate| serde_json::from_str::<ResultEnvelope>(candidate).ok())
        .ok_or_else(|| ResponseError::NoJson(text.chars().take(200).collect()))?;

    let mut items = envelope.contacts;
    if items.len() != expected {
        return Err(ResponseError::CountMismatch {
            expected,
            got: items.len(),
        });
    }

    items.sort_by_key(|item| item.index);
    let covers_batch = items
        .iter()
        .enumerate()
        .all(|(position, item)| item.index == position + 1);
    if !covers_batch {
        return Err(ResponseError::BadIndices { expected });
    }

    Ok(items)
}

fn truthy<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(s.trim().to_lowercase().as_str(), "true" | "yes" | "1"),
        _ => false,
    })
}

fn text_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO: &str = r#"{"contacts":[
        {"index":1,"valid":true,"description":"Press email","reason":""},
        {"index":2,"valid":false,"description":"","reason":"Looks like a tracking number"}
    ]}"#;

    #[test]
    fn test_parse_plain_json() {
        let items = parse_contacts_response(TWO, 2).unwrap();
        assert_eq!(items.len(), 2);
        assert!(items[0].valid);
        assert_eq!(items[0].description, "Press email");
        assert!(!items[1].valid);
        assert_eq!(items[1].reason, "Looks like a tracking number");
    }

    #[test]
    fn test_parse_fenced_json() {
        let fenced = format!("```json\n{}\n```", TWO);
        assert_eq!(parse_contacts_response(&fenced, 2).unwrap().len(), 2);
    }

    #[test]
    fn test_parse_json_inside_prose() {
        let prose = format!("Here you go:\n{}\nHope it helps!", TWO);
        assert_eq!(parse_contacts_response(&prose, 2).unwrap().len(), 2);
    }

    #[test]
    fn test_count_mismatch() {
        assert_eq!(
            parse_contacts_response(TWO, 3),
            Err(ResponseError::CountMismatch {
                expected: 3,
                got: 2
            })
        );
    }

    #[test]
    fn test_items_sorted_by_index() {
        let text = r#"{"contacts":[{"index":2,"valid":true},{"index":1,"valid":false}]}"#;
        let items = parse_contacts_response(text, 2).unwrap();
        assert_eq!(items[0].index, 1);
        assert_eq!(items[1].index, 2);
    }

    #[test]
    fn test_duplicate_indices_rejected() {
        let text = r#"{"contacts":[{"index":1,"valid":true},{"index":1,"valid":true}]}"#;
        assert_eq!(
            parse_contacts_response(text, 2),
            Err(ResponseError::BadIndices { expected: 2 })
        );
    }

    #[test]
    fn test_no_json() {
        assert!(matches!(
            parse_contacts_response("I cannot help with that.", 1),
            Err(ResponseError::NoJson(_))
        ));
    }

    #[test]
    fn test_lenient_field_types() {
        let text = r#"{"contacts":[{"index":1,"valid":"yes","description":null,"reason":null}]}"#;
        let items = parse_contacts_response(text, 1).unwrap();
        assert!(items[0].valid);
        assert!(items[0].description.is_empty());
    }
}
