use serde_json::{Map, Value};
use tracing::warn;

use crate::api::QueryPayload;
use crate::core::config::validate::RESERVED_QUERY_KEY;
use crate::core::error::ValidationError;

/// Assemble the payload for one submission.
///
/// The query text is trimmed. Control values never replace the `text` key.
pub fn compose(
    service: &str,
    query_text: &str,
    control_values: Map<String, Value>,
    streamable: bool,
) -> Result<QueryPayload, ValidationError> {
    if service.is_empty() {
        return Err(ValidationError::MissingService);
    }
    let text = query_text.trim();
    if text.is_empty() {
        return Err(ValidationError::EmptyQuery);
    }

    let mut query = Map::with_capacity(control_values.len() + 1);
    query.insert(RESERVED_QUERY_KEY.to_string(), Value::String(text.to_string()));
    for (name, value) in control_values {
        if name == RESERVED_QUERY_KEY {
            warn!(service, "ignoring form value that would replace the query text");
            continue;
        }
        query.insert(name, value);
    }

    Ok(QueryPayload {
        service: service.to_string(),
        query,
        stream: streamable,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn values(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn merges_control_values_next_to_text() {
        let payload = compose(
            "translate",
            "  bonjour ",
            values(json!({"target": "de", "temperature": 0.5})),
            false,
        )
        .unwrap();
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "service": "translate",
                "query": {"text": "bonjour", "target": "de", "temperature": 0.5},
                "stream": false
            })
        );
    }

    #[test]
    fn echo_payload_matches_wire_shape() {
        let payload = compose("echo", "hi", Map::new(), false).unwrap();
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({"service": "echo", "query": {"text": "hi"}, "stream": false})
        );
    }

    #[test]
    fn rejects_missing_service_and_blank_query() {
        assert_eq!(
            compose("", "hi", Map::new(), false),
            Err(ValidationError::MissingService)
        );
        assert_eq!(
            compose("echo", " \n\t ", Map::new(), true),
            Err(ValidationError::EmptyQuery)
        );
    }

    #[test]
    fn control_named_text_cannot_replace_query() {
        let payload = compose("echo", "real", values(json!({"text": "fake"})), true).unwrap();
        assert_eq!(payload.text(), "real");
        assert!(payload.stream);
    }
}
