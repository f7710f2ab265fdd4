//! Reassembly of tool calls whose arguments arrive as streamed fragments.

use std::collections::HashMap;

/// A tool call whose arguments have finished streaming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedCall {
    pub call_id: String,
    pub name: String,
    /// Concatenation of every fragment in arrival order.
    pub arguments: String,
    /// `false` when `name` is the fallback rather than an announced name.
    pub announced: bool,
}

/// Per call id state: the announced function name and the argument buffer.
///
/// Owned by the read direction only. Entries are dropped on [`finalize`];
/// calls that never complete stay tracked for the rest of the session.
///
/// [`finalize`]: CallAggregator::finalize
#[derive(Debug)]
pub struct CallAggregator {
    default_name: String,
    names: HashMap<String, String>,
    buffers: HashMap<String, String>,
}

impl CallAggregator {
    pub fn new(default_name: impl Into<String>) -> Self {
        Self {
            default_name: default_name.into(),
            names: HashMap::new(),
            buffers: HashMap::new(),
        }
    }

    /// Remembers the function name announced for `call_id`. Ignored when
    /// either value is empty.
    pub fn record_name(&mut self, call_id: &str, name: &str) {
        if call_id.is_empty() || name.is_empty() {
            return;
        }
        self.names.insert(call_id.to_string(), name.to_string());
    }

    pub fn append_delta(&mut self, call_id: &str, fragment: &str) {
        self.buffers
            .entry(call_id.to_string())
            .or_default()
            .push_str(fragment);
    }

    /// Takes the accumulated call. Arguments are empty if no fragment ever
    /// arrived, and the name falls back to the default if none was recorded.
    pub fn finalize(&mut self, call_id: &str) -> CompletedCall {
        let arguments = self.buffers.remove(call_id).unwrap_or_default();
        let (name, announced) = match self.names.remove(call_id) {
            Some(name) => (name, true),
            None => (self.default_name.clone(), false),
        };
        CompletedCall {
            call_id: call_id.to_string(),
            name,
            arguments,
            announced,
        }
    }

    /// Number of calls with a recorded name or buffered arguments.
    pub fn in_flight(&self) -> usize {
        self.buffers
            .keys()
            .chain(self.names.keys().filter(|id| !self.buffers.contains_key(*id)))
            .count()
    }
}
