//! Envelopes sent from the CLI to the Realtime API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An outbound envelope, discriminated by its `type` field.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// Configures the session. Must be the first envelope on a new connection.
    #[serde(rename = "session.update")]
    SessionUpdate { session: SessionConfig },
    /// Appends an item (user message or function output) to the conversation.
    #[serde(rename = "conversation.item.create")]
    ConversationItemCreate { item: Item },
    /// Asks the model to produce a response for the current conversation.
    #[serde(rename = "response.create")]
    ResponseCreate { response: ResponseConfig },
}

impl ClientEvent {
    /// The wire discriminant of this envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SessionUpdate { .. } => "session.update",
            Self::ConversationItemCreate { .. } => "conversation.item.create",
            Self::ResponseCreate { .. } => "response.create",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Text,
}

/// Payload of `session.update`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub modalities: Vec<Modality>,
    pub temperature: f64,
    pub instructions: String,
    pub tools: Vec<ToolDefinition>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    Function,
}

/// A function the model may call, declared in the session update.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub kind: ToolKind,
    pub name: String,
    pub description: String,
    /// JSON schema of the argument object.
    pub parameters: Value,
}

impl ToolDefinition {
    pub fn function(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            kind: ToolKind::Function,
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// A conversation item, discriminated by its own nested `type` field.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Item {
    Message { role: Role, content: Vec<ContentPart> },
    /// The result of a local function call. `output` is a JSON document
    /// encoded as a string.
    FunctionCallOutput { call_id: String, output: String },
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    InputText { text: String },
}

/// Payload of `response.create`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ResponseConfig {
    pub modalities: Vec<Modality>,
    /// Overrides the session instructions for this response only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_message_wire_shape() {
        let event = ClientEvent::ConversationItemCreate {
            item: Item::Message {
                role: Role::User,
                content: vec![ContentPart::InputText {
                    text: "hello".to_string(),
                }],
            },
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "type": "conversation.item.create",
                "item": {
                    "type": "message",
                    "role": "user",
                    "content": [{"type": "input_text", "text": "hello"}]
                }
            })
        );
    }

    #[test]
    fn test_function_output_wire_shape() {
        let event = ClientEvent::ConversationItemCreate {
            item: Item::FunctionCallOutput {
                call_id: "call_1".to_string(),
                output: "{\"result\":15}".to_string(),
            },
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({
                "type": "conversation.item.create",
                "item": {
                    "type": "function_call_output",
                    "call_id": "call_1",
                    "output": "{\"result\":15}"
                }
            })
        );
    }

    #[test]
    fn test_response_create_omits_missing_instructions() {
        let event = ClientEvent::ResponseCreate {
            response: ResponseConfig {
                modalities: vec![Modality::Text],
                instructions: None,
            },
        };
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"type": "response.create", "response": {"modalities": ["text"]}})
        );
    }

    #[test]
    fn test_session_update_wire_shape() {
        let event = ClientEvent::SessionUpdate {
            session: SessionConfig {
                modalities: vec![Modality::Text],
                temperature: 0.7,
                instructions: "be brief".to_string(),
                tools: vec![ToolDefinition::function(
                    "noop",
                    "Does nothing.",
                    json!({"type": "object", "properties": {}}),
                )],
            },
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "session.update");
        assert_eq!(value["session"]["modalities"], json!(["text"]));
        assert_eq!(value["session"]["temperature"], json!(0.7));
        assert_eq!(value["session"]["tools"][0]["type"], "function");
        assert_eq!(value["session"]["tools"][0]["name"], "noop");
        assert_eq!(event.kind(), "session.update");
    }
}
