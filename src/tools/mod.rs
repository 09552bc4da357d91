//! Tool system modules and re-exports.

// === Modules ===

pub mod args;
pub mod datasets;
pub mod prompts;
pub mod registry;
pub mod spec;
pub mod traces;
pub mod usage;

// === Re-exports ===

// Re-export commonly used types from spec
pub use spec::{ToolContext, ToolError, ToolSpec};

// Re-export registry types
pub use registry::{ToolRegistry, default_registry};

// Re-export run and trace tools
pub use traces::{
    FetchRunsPaginatedTool, FetchRunsTool, FetchTraceTool, GetProjectRunsStatsTool,
    GetThreadHistoryTool, ListProjectsTool,
};

// Re-export dataset tools
pub use datasets::{ListDatasetsTool, ListExamplesTool, ReadDatasetTool, ReadExampleTool};

// Re-export prompt tools
pub use prompts::{GetPromptByNameTool, ListPromptsTool};

// Re-export usage tools
pub use usage::{GetBillingUsageTool, ListWorkspacesTool};
