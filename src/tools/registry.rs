//! Tool registry: lookup by name and protocol-facing definitions.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{Value, json};

use super::spec::ToolSpec;
use super::{
    FetchRunsPaginatedTool, FetchRunsTool, FetchTraceTool, GetBillingUsageTool,
    GetProjectRunsStatsTool, GetPromptByNameTool, GetThreadHistoryTool, ListDatasetsTool,
    ListExamplesTool, ListProjectsTool, ListPromptsTool, ListWorkspacesTool, ReadDatasetTool,
    ReadExampleTool,
};

/// Holds every registered tool, keyed by name. Iteration order is stable so
/// `tools/list` output is deterministic.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: BTreeMap<&'static str, Arc<dyn ToolSpec>>,
}

impl ToolRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Arc<dyn ToolSpec>) {
        self.tools.insert(tool.name(), tool);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn ToolSpec>> {
        self.tools.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ToolSpec>> {
        self.tools.values()
    }

    /// Tool definitions in the shape `tools/list` expects.
    #[must_use]
    pub fn definitions(&self) -> Vec<Value> {
        self.tools
            .values()
            .map(|tool| {
                json!({
                    "name": tool.name(),
                    "description": tool.description(),
                    "inputSchema": tool.input_schema(),
                })
            })
            .collect()
    }
}

/// Registry with every LangSmith tool registered.
#[must_use]
pub fn default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(FetchRunsTool));
    registry.register(Arc::new(FetchRunsPaginatedTool));
    registry.register(Arc::new(FetchTraceTool));
    registry.register(Arc::new(GetThreadHistoryTool));
    registry.register(Arc::new(GetProjectRunsStatsTool));
    registry.register(Arc::new(ListProjectsTool));
    registry.register(Arc::new(ListDatasetsTool));
    registry.register(Arc::new(ListExamplesTool));
    registry.register(Arc::new(ReadDatasetTool));
    registry.register(Arc::new(ReadExampleTool));
    registry.register(Arc::new(ListPromptsTool));
    registry.register(Arc::new(GetPromptByNameTool));
    registry.register(Arc::new(GetBillingUsageTool));
    registry.register(Arc::new(ListWorkspacesTool));
    registry
}
