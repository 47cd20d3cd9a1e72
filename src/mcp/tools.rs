//! Tool registry.
//!
//! Tools are keyed by name; registering a name twice replaces the earlier
//! tool. Listing order is by name, which keeps `tools/list` stable.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use super::context::RequestContext;
use super::handler::{Handler, HandlerError, HandlerResult};
use super::types::{InputSchema, ToolDefinition};

/// A tool: its advertised definition plus the body that runs it.
#[derive(Clone)]
pub struct Tool {
    pub definition: ToolDefinition,
    pub invoke: Handler,
}

impl Tool {
    /// Builds a tool from its advertised definition and its body.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: InputSchema,
        invoke: Handler,
    ) -> Self {
        Self {
            definition: ToolDefinition {
                name: name.into(),
                description: description.into(),
                input_schema,
            },
            invoke,
        }
    }

    /// Unique name the tool is registered under.
    pub fn name(&self) -> &str {
        &self.definition.name
    }
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("definition", &self.definition)
            .finish_non_exhaustive()
    }
}

/// Tools keyed by name.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Tool>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `tool`, replacing any tool of the same name.
    pub fn register(&mut self, tool: Tool) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Looks up a tool by name.
    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.get(name)
    }

    /// Definitions of every registered tool, without their bodies.
    pub fn list(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.definition.clone()).collect()
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// True when no tool is registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Runs the named tool with `arguments` and returns its outcome unchanged.
    pub async fn invoke(
        &self,
        name: &str,
        ctx: RequestContext,
        arguments: Option<Value>,
    ) -> HandlerResult {
        let tool = self
            .get(name)
            .ok_or_else(|| HandlerError::ToolNotFound(name.to_string()))?;
        (tool.invoke)(ctx, arguments).await
    }
}
