//! LLM Client Layer - OpenAI-compatible chat completions with tool calling
//!
//! This module provides:
//! - Wire types for messages, tool calls, and requests
//! - LlmClient trait for API abstraction
//! - OpenAiClient implementation
//! - MockLlmClient for tests

pub mod client;
pub mod openai;
pub mod types;

pub use client::{LlmClient, MockLlmClient};
pub use openai::{OpenAiClient, OpenAiConfig};
pub use types::{CompletionRequest, FunctionCall, FunctionSpec, Message, Role, ToolCall, ToolDefinition};
