//! Classifies inbound envelopes and reacts to them.

use crate::{
    DEFAULT_FUNCTION_NAME, TOOL_RESULT_INSTRUCTIONS,
    aggregator::{CallAggregator, CompletedCall},
    console::Console,
    encoder,
    tools::ToolRegistry,
};
use openai_realtime_types::{ClientEvent, ServerEvent};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct DispatchSettings {
    /// Log the raw JSON of envelopes the dispatcher does not act on.
    pub debug: bool,
    /// Name assumed for a completed call that was never announced.
    pub default_function: String,
    /// Instructions attached to the response requested after a tool result.
    pub tool_result_instructions: String,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            debug: false,
            default_function: DEFAULT_FUNCTION_NAME.to_string(),
            tool_result_instructions: TOOL_RESULT_INSTRUCTIONS.to_string(),
        }
    }
}

/// Routes inbound envelopes to the console, the call aggregator and the tool
/// registry. Returns the envelopes that must be sent in reply.
///
/// Owned by the read direction, which makes it the only mutator of the
/// in-flight call state.
pub struct Dispatcher<C> {
    settings: DispatchSettings,
    calls: CallAggregator,
    tools: Arc<ToolRegistry>,
    console: C,
}

impl<C: Console> Dispatcher<C> {
    pub fn new(settings: DispatchSettings, tools: Arc<ToolRegistry>, console: C) -> Self {
        let calls = CallAggregator::new(settings.default_function.clone());
        Self {
            settings,
            calls,
            tools,
            console,
        }
    }

    /// Handles one raw text frame. Frames that are not a JSON object with a
    /// string `type` are logged and dropped.
    pub fn handle_frame(&mut self, frame: &str) -> Vec<ClientEvent> {
        match ServerEvent::parse(frame) {
            Ok(event) => {
                if self.settings.debug {
                    debug!(kind = event.kind(), event = %frame, "Received event.");
                }
                self.handle_event(event)
            }
            Err(e) => {
                warn!(error = %e, "Dropping malformed event.");
                Vec::new()
            }
        }
    }

    pub fn handle_event(&mut self, event: ServerEvent) -> Vec<ClientEvent> {
        match event {
            ServerEvent::TextDelta { delta } => self.console.write_text(&delta),
            ServerEvent::TextDone | ServerEvent::ResponseDone => self.console.end_line(),
            ServerEvent::OutputItemAdded { item } => {
                if item.is_function_call() {
                    self.calls.record_name(&item.call_id, &item.name);
                }
            }
            ServerEvent::FunctionCallArgumentsDelta { call_id, delta } => {
                self.calls.append_delta(&call_id, &delta);
            }
            ServerEvent::FunctionCallArgumentsDone { call_id } => {
                let call = self.calls.finalize(&call_id);
                return self.answer(call);
            }
            ServerEvent::Unhandled { kind, raw } => {
                if self.settings.debug {
                    debug!(%kind, event = %raw, "Unhandled event.");
                }
            }
        }
        Vec::new()
    }

    /// Runs a completed call and builds the function result plus the
    /// follow-up response request. Tool failures become an error payload so
    /// the call is always answered.
    fn answer(&mut self, call: CompletedCall) -> Vec<ClientEvent> {
        if !call.announced {
            warn!(call_id = %call.call_id, name = %call.name, "Call completed without an announced name. Using the default.");
        }
        info!(call_id = %call.call_id, name = %call.name, "Executing tool call.");

        let output = self
            .tools
            .execute(&call.name, &call.arguments)
            .unwrap_or_else(|e| {
                warn!(call_id = %call.call_id, error = %e, "Tool call failed.");
                json!({"error": e.to_string()})
            });

        vec![
            encoder::function_result(&call.call_id, &output),
            encoder::response_trigger(Some(&self.settings.tool_result_instructions)),
        ]
    }

    /// Calls that have started streaming but not completed.
    pub fn pending_calls(&self) -> usize {
        self.calls.in_flight()
    }
}
