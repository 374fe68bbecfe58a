//! Tools module containing the tool abstraction and the built-in catalog tool

pub mod catalog;
pub mod function_factory;
pub mod tool;

pub use catalog::{CatalogTool, NormalizedProduct};
pub use function_factory::FunctionFactory;
pub use tool::{Tool, ToolRegistry};
