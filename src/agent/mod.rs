pub mod orchestrator;

pub use orchestrator::{Agent, AgentConfig};
