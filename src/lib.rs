//! hearth - a recipe assistant backend with family nutrition tracking.
//!
//! The core of the crate is [`agent::Agent`], which drives one conversation
//! turn against an LLM: offer the tool catalog, execute whatever tools the
//! model requests against the SQLite store, then ask the model to wrap the
//! results into a reply.

pub mod agent;
pub mod config;
pub mod error;
pub mod llm;
pub mod store;
pub mod tools;

pub use agent::{Agent, AgentConfig};
pub use error::{HearthError, Result};
