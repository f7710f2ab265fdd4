//! Local functions the model can call.

use openai_realtime_types::ToolDefinition;
use serde::Deserialize;
use serde_json::{Value, json};
use std::{collections::BTreeMap, sync::Arc};

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("bad args: {0}")]
    InvalidArguments(#[from] serde_json::Error),
}

/// A function callable by the model.
#[cfg_attr(test, mockall::automock)]
pub trait Tool: Send + Sync {
    /// Declaration sent to the API in the session update.
    fn definition(&self) -> ToolDefinition;

    /// Runs the tool on its raw JSON argument text.
    fn call(&self, arguments: &str) -> Result<Value, ToolError>;
}

/// Tools keyed by name.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in tools.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Multiply);
        registry
    }

    /// Adds `tool`, replacing any tool registered under the same name.
    pub fn register(&mut self, tool: impl Tool + 'static) {
        let name = tool.definition().name;
        self.tools.insert(name, Arc::new(tool));
    }

    /// Declarations for every registered tool, ordered by name.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|tool| tool.definition()).collect()
    }

    /// Runs the tool called `name`.
    ///
    /// An unknown name is not an error: it yields
    /// `{"error": "unknown function", "name": <name>}` so the model still
    /// receives a well-formed answer. Bad arguments are an error.
    pub fn execute(&self, name: &str, arguments: &str) -> Result<Value, ToolError> {
        match self.tools.get(name) {
            Some(tool) => tool.call(arguments),
            None => Ok(json!({"error": "unknown function", "name": name})),
        }
    }
}

#[derive(Deserialize)]
struct MultiplyArgs {
    a: f64,
    b: f64,
}

/// Multiplies two numbers.
pub struct Multiply;

impl Tool for Multiply {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(
            "multiply",
            "Multiply two numbers and return the product.",
            json!({
                "type": "object",
                "properties": {
                    "a": {"type": "number"},
                    "b": {"type": "number"}
                },
                "required": ["a", "b"]
            }),
        )
    }

    fn call(&self, arguments: &str) -> Result<Value, ToolError> {
        let args: MultiplyArgs = serde_json::from_str(arguments)?;
        Ok(json!({"result": number(args.a * args.b)}))
    }
}

/// Largest magnitude below which every whole `f64` is exact in an `i64`.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Whole numbers serialize without a fractional part (`15`, not `15.0`).
fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < MAX_EXACT_INTEGER {
        json!(value as i64)
    } else {
        json!(value)
    }
}
