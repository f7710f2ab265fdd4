//! Session protocol handler for the realtime CLI.
//!
//! Turns user input into outbound envelopes, consumes the inbound event
//! stream, reassembles streamed tool calls, runs them locally and feeds the
//! results back into the conversation.

pub mod aggregator;
pub mod console;
pub mod dispatcher;
pub mod encoder;
pub mod session;
pub mod tools;

#[cfg(test)]
mod test_support;

/// Function name used when a completed call was never announced by name.
pub const DEFAULT_FUNCTION_NAME: &str = "multiply";

/// Per-response instructions sent after a function result.
pub const TOOL_RESULT_INSTRUCTIONS: &str = "Use the tool result to answer the user.";
