//! Wire types for the OpenAI Realtime API text session.
//!
//! Outbound envelopes are modelled by [`ClientEvent`], inbound ones by
//! [`ServerEvent`]. Both are tagged on the `type` field; field names match the
//! wire contract and must not be renamed.

pub mod client;
pub mod server;

pub use client::{
    ClientEvent, ContentPart, Item, Modality, ResponseConfig, Role, SessionConfig, ToolDefinition,
    ToolKind,
};
pub use server::{EventParseError, OutputItem, ServerEvent};
