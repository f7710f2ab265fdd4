//! Envelopes received from the Realtime API.

use serde_json::Value;

/// Failure to classify an inbound frame.
#[derive(Debug, thiserror::Error)]
pub enum EventParseError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("event has no string `type` field")]
    MissingType,
}

/// An inbound envelope, classified by its `type` discriminant.
///
/// Only the discriminants the session reacts to get a typed variant; every
/// other envelope is kept as opaque JSON in [`ServerEvent::Unhandled`].
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// `response.text.delta`
    TextDelta { delta: String },
    /// `response.text.done`
    TextDone,
    /// `response.output_item.added`
    OutputItemAdded { item: OutputItem },
    /// `response.function_call_arguments.delta`
    FunctionCallArgumentsDelta { call_id: String, delta: String },
    /// `response.function_call_arguments.done`
    FunctionCallArgumentsDone { call_id: String },
    /// `response.done`
    ResponseDone,
    Unhandled { kind: String, raw: Value },
}

/// The nested item announced by `response.output_item.added`.
///
/// Fields that are missing or not strings are empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputItem {
    pub kind: String,
    pub call_id: String,
    pub name: String,
}

impl OutputItem {
    pub fn is_function_call(&self) -> bool {
        self.kind == "function_call"
    }

    fn from_value(item: Option<&Value>) -> Self {
        match item {
            Some(item) => Self {
                kind: string_field(item, "type"),
                call_id: string_field(item, "call_id"),
                name: string_field(item, "name"),
            },
            None => Self::default(),
        }
    }
}

/// The string at `key`, or empty if it is absent or not a string.
fn string_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

impl ServerEvent {
    /// Parses one text frame.
    ///
    /// Only a frame that is not JSON, or has no string `type`, is an error.
    /// Payload fields of recognized events that are missing or of the wrong
    /// JSON type read as empty strings, so a call-lifecycle event is never
    /// lost to a malformed payload.
    pub fn parse(frame: &str) -> Result<Self, EventParseError> {
        let raw: Value = serde_json::from_str(frame)?;
        let kind = raw
            .get("type")
            .and_then(Value::as_str)
            .ok_or(EventParseError::MissingType)?
            .to_owned();

        let event = match kind.as_str() {
            "response.text.delta" => Self::TextDelta {
                delta: string_field(&raw, "delta"),
            },
            "response.text.done" => Self::TextDone,
            "response.output_item.added" => Self::OutputItemAdded {
                item: OutputItem::from_value(raw.get("item")),
            },
            "response.function_call_arguments.delta" => Self::FunctionCallArgumentsDelta {
                call_id: string_field(&raw, "call_id"),
                delta: string_field(&raw, "delta"),
            },
            "response.function_call_arguments.done" => Self::FunctionCallArgumentsDone {
                call_id: string_field(&raw, "call_id"),
            },
            "response.done" => Self::ResponseDone,
            _ => Self::Unhandled { kind, raw },
        };
        Ok(event)
    }

    /// The wire discriminant of this envelope.
    pub fn kind(&self) -> &str {
        match self {
            Self::TextDelta { .. } => "response.text.delta",
            Self::TextDone => "response.text.done",
            Self::OutputItemAdded { .. } => "response.output_item.added",
            Self::FunctionCallArgumentsDelta { .. } => "response.function_call_arguments.delta",
            Self::FunctionCallArgumentsDone { .. } => "response.function_call_arguments.done",
            Self::ResponseDone => "response.done",
            Self::Unhandled { kind, .. } => kind.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_text_delta() {
        let event = ServerEvent::parse(r#"{"type":"response.text.delta","delta":"Hel"}"#).unwrap();
        assert_eq!(
            event,
            ServerEvent::TextDelta {
                delta: "Hel".to_string()
            }
        );
    }

    #[test]
    fn test_parse_function_call_announcement() {
        let frame = json!({
            "type": "response.output_item.added",
            "response_id": "resp_1",
            "output_index": 0,
            "item": {"id": "item_1", "type": "function_call", "call_id": "call_1", "name": "multiply", "arguments": ""}
        })
        .to_string();
        match ServerEvent::parse(&frame).unwrap() {
            ServerEvent::OutputItemAdded { item } => {
                assert!(item.is_function_call());
                assert_eq!(item.call_id, "call_1");
                assert_eq!(item.name, "multiply");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_parse_message_item_is_not_function_call() {
        let frame = r#"{"type":"response.output_item.added","item":{"type":"message","role":"assistant"}}"#;
        match ServerEvent::parse(frame).unwrap() {
            ServerEvent::OutputItemAdded { item } => {
                assert!(!item.is_function_call());
                assert!(item.call_id.is_empty());
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_parse_argument_events() {
        let delta = ServerEvent::parse(
            r#"{"type":"response.function_call_arguments.delta","call_id":"c","delta":"{\"a\""}"#,
        )
        .unwrap();
        assert_eq!(
            delta,
            ServerEvent::FunctionCallArgumentsDelta {
                call_id: "c".to_string(),
                delta: "{\"a\"".to_string()
            }
        );

        let done = ServerEvent::parse(
            r#"{"type":"response.function_call_arguments.done","call_id":"c","arguments":"{}"}"#,
        )
        .unwrap();
        assert_eq!(
            done,
            ServerEvent::FunctionCallArgumentsDone {
                call_id: "c".to_string()
            }
        );
    }

    #[test]
    fn test_missing_payload_fields_default_to_empty() {
        let event = ServerEvent::parse(r#"{"type":"response.function_call_arguments.delta"}"#).unwrap();
        assert_eq!(
            event,
            ServerEvent::FunctionCallArgumentsDelta {
                call_id: String::new(),
                delta: String::new()
            }
        );
    }

    #[test]
    fn test_unknown_type_keeps_raw_json() {
        let event = ServerEvent::parse(r#"{"type":"session.created","session":{"id":"s"}}"#).unwrap();
        assert_eq!(event.kind(), "session.created");
        match event {
            ServerEvent::Unhandled { raw, .. } => assert_eq!(raw["session"]["id"], "s"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_frames_are_errors() {
        assert!(matches!(
            ServerEvent::parse("not json"),
            Err(EventParseError::Json(_))
        ));
        assert!(matches!(
            ServerEvent::parse(r#"{"delta":"x"}"#),
            Err(EventParseError::MissingType)
        ));
        assert!(matches!(
            ServerEvent::parse(r#"{"type":42}"#),
            Err(EventParseError::MissingType)
        ));
    }

    #[test]
    fn test_wrong_typed_payload_fields_read_as_empty() {
        assert_eq!(
            ServerEvent::parse(r#"{"type":"response.text.delta","delta":7}"#).unwrap(),
            ServerEvent::TextDelta {
                delta: String::new()
            }
        );
        assert_eq!(
            ServerEvent::parse(r#"{"type":"response.function_call_arguments.done","call_id":null}"#)
                .unwrap(),
            ServerEvent::FunctionCallArgumentsDone {
                call_id: String::new()
            }
        );
        assert_eq!(
            ServerEvent::parse(r#"{"type":"response.output_item.added","item":"oops"}"#).unwrap(),
            ServerEvent::OutputItemAdded {
                item: OutputItem::default()
            }
        );
        match ServerEvent::parse(
            r#"{"type":"response.output_item.added","item":{"type":"function_call","call_id":1,"name":"multiply"}}"#,
        )
        .unwrap()
        {
            ServerEvent::OutputItemAdded { item } => {
                assert!(item.is_function_call());
                assert!(item.call_id.is_empty());
                assert_eq!(item.name, "multiply");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
