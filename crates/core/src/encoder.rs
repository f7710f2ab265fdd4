//! Builds outbound envelopes. Nothing here performs I/O.

use openai_realtime_types::{
    ClientEvent, ContentPart, Item, Modality, ResponseConfig, Role, SessionConfig, ToolDefinition,
};
use serde_json::Value;

/// Sampling temperature requested for the whole session.
pub const SESSION_TEMPERATURE: f64 = 0.7;

/// The `session.update` envelope. Must be the first envelope on a connection.
pub fn session_update(instructions: &str, tools: Vec<ToolDefinition>) -> ClientEvent {
    ClientEvent::SessionUpdate {
        session: SessionConfig {
            modalities: vec![Modality::Text],
            temperature: SESSION_TEMPERATURE,
            instructions: instructions.to_string(),
            tools,
        },
    }
}

/// A user turn with a single text part. Callers reject blank input.
pub fn user_message(text: &str) -> ClientEvent {
    ClientEvent::ConversationItemCreate {
        item: Item::Message {
            role: Role::User,
            content: vec![ContentPart::InputText {
                text: text.to_string(),
            }],
        },
    }
}

/// A `response.create` envelope. Non-empty `instructions` override the
/// session instructions for this response only.
pub fn response_trigger(instructions: Option<&str>) -> ClientEvent {
    ClientEvent::ResponseCreate {
        response: ResponseConfig {
            modalities: vec![Modality::Text],
            instructions: instructions
                .filter(|text| !text.is_empty())
                .map(str::to_string),
        },
    }
}

/// The output of a local function call. `output` is carried as a JSON string
/// inside the JSON envelope.
pub fn function_result(call_id: &str, output: &Value) -> ClientEvent {
    ClientEvent::ConversationItemCreate {
        item: Item::FunctionCallOutput {
            call_id: call_id.to_string(),
            output: output.to_string(),
        },
    }
}
