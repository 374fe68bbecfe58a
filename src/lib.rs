//! shop-agent-rs: a lightweight Rust shopping-assistant agent with tool calling
//!
//! This library wires a conversational agent to an OpenAI-compatible
//! completion endpoint (Gemini's compatibility layer by default) and equips it
//! with a catalog tool that fetches product data over HTTP and normalizes it
//! into a simple structure the model can reason about.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use shop_agent_rs::{Agent, AgentConfig, CatalogTool, FunctionFactory};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AgentConfig::from_env()?;
//!     let mut function_factory = FunctionFactory::new();
//!     function_factory.register_tool(CatalogTool::new());
//!
//!     let agent = Agent::new(config, function_factory);
//!
//!     let response = agent.run("What are the products available in the store?").await?;
//!     println!("{}", response);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub(crate) mod services;
pub mod tools;

pub use config::AgentConfig;
pub use core::{Agent, AgentMemory, AgentStep};
pub use error::{AgentError, Result};
pub use tools::{CatalogTool, FunctionFactory, Tool};

#[cfg(feature = "cli")]
pub mod cli;
