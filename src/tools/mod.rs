//! Tool infrastructure: catalog, validation and the governance tool menu.
//!
//! The catalog owns tool metadata and argument validation; the menu it renders
//! is what the completion API sees. Execution is routed by [`crate::dispatch`].

pub mod catalog;
pub mod governance;

pub use catalog::{ParamDef, ParamType, ToolBackend, ToolCatalog, ToolEntry};
pub use governance::governance_tools;
