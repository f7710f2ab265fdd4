//! Realtime CLI Library Crate
//!
//! Configuration, command-line flags and terminal input for the `realtime-cli`
//! binary. The session itself lives in `realtime-core`.

pub mod cli;
pub mod config;
pub mod input;
