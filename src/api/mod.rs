use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod services;

/// Body POSTed to the backend for one query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryPayload {
    pub service: String,
    /// `text` plus one entry per form control.
    pub query: Map<String, Value>,
    pub stream: bool,
}

impl QueryPayload {
    pub fn text(&self) -> &str {
        self.query
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
pub struct ServicesResponse {
    #[serde(default)]
    pub services: Vec<String>,
}

/// How a result should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultKind {
    #[default]
    Text,
    Image,
    Audio,
}

impl ResultKind {
    /// Anything other than `image` or `audio` renders as text.
    pub fn from_wire(kind: Option<&str>) -> Self {
        match kind {
            Some("image") => ResultKind::Image,
            Some("audio") => ResultKind::Audio,
            _ => ResultKind::Text,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ResultKind::Text => "text",
            ResultKind::Image => "image",
            ResultKind::Audio => "audio",
        }
    }
}

/// One decoded unit of a response, streamed or not.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// What a [`StreamEvent`] means to the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome<'a> {
    Result(&'a str, ResultKind),
    Error(&'a str),
    /// Neither a non-empty `result` nor an `error`.
    Empty,
}

impl StreamEvent {
    pub fn text(result: impl Into<String>) -> Self {
        Self {
            result: Some(result.into()),
            ..Self::default()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn result_kind(&self) -> ResultKind {
        ResultKind::from_wire(self.kind.as_deref())
    }

    /// A non-empty `result` takes precedence over `error`.
    pub fn outcome(&self) -> EventOutcome<'_> {
        match (self.result.as_deref(), self.error.as_deref()) {
            (Some(result), _) if !result.is_empty() => {
                EventOutcome::Result(result, self.result_kind())
            }
            (_, Some(error)) => EventOutcome::Error(error),
            _ => EventOutcome::Empty,
        }
    }

    /// Interpret a complete non-streaming response body.
    ///
    /// A string `result` is used as-is; an `error`-only object becomes an
    /// error event; anything else is shown as its JSON text.
    pub fn from_response_value(value: &Value) -> Self {
        let kind = value.get("type").and_then(Value::as_str).map(str::to_owned);
        match value.get("result") {
            Some(Value::String(result)) if !result.is_empty() => {
                return Self {
                    result: Some(result.clone()),
                    error: None,
                    kind,
                };
            }
            _ => {}
        }

        if let Some(error) = value.get("error").and_then(Value::as_str) {
            return Self::failure(error);
        }

        Self {
            result: Some(value.to_string()),
            error: None,
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn outcome_prefers_result_and_defaults_to_text() {
        let event: StreamEvent = serde_json::from_str(r#"{"result":"a"}"#).unwrap();
        assert_eq!(event.outcome(), EventOutcome::Result("a", ResultKind::Text));

        let event: StreamEvent =
            serde_json::from_str(r#"{"result":"x.png","type":"image","image_path":"/tmp"}"#)
                .unwrap();
        assert_eq!(event.outcome(), EventOutcome::Result("x.png", ResultKind::Image));

        let event: StreamEvent = serde_json::from_str(r#"{"error":"boom"}"#).unwrap();
        assert_eq!(event.outcome(), EventOutcome::Error("boom"));

        let event: StreamEvent = serde_json::from_str(r#"{"result":""}"#).unwrap();
        assert_eq!(event.outcome(), EventOutcome::Empty);
    }

    #[test]
    fn unknown_result_type_renders_as_text() {
        assert_eq!(ResultKind::from_wire(Some("video")), ResultKind::Text);
        assert_eq!(ResultKind::from_wire(None), ResultKind::Text);
    }

    #[test]
    fn non_streaming_body_falls_back_to_json_text() {
        let event = StreamEvent::from_response_value(&json!({"result": "hello", "type": "text"}));
        assert_eq!(event.result.as_deref(), Some("hello"));
        assert_eq!(event.result_kind(), ResultKind::Text);

        let event = StreamEvent::from_response_value(&json!({"score": 0.5}));
        assert_eq!(event.result.as_deref(), Some(r#"{"score":0.5}"#));

        let event = StreamEvent::from_response_value(&json!({"error": "Service disabled"}));
        assert_eq!(event.outcome(), EventOutcome::Error("Service disabled"));
    }

    #[test]
    fn payload_serializes_query_fields_inline() {
        let mut query = Map::new();
        query.insert("text".into(), json!("hi"));
        query.insert("temperature".into(), json!(0.7));
        let payload = QueryPayload {
            service: "echo".into(),
            query,
            stream: true,
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            json!({"service": "echo", "query": {"text": "hi", "temperature": 0.7}, "stream": true})
        );
        assert_eq!(payload.text(), "hi");
    }
}
