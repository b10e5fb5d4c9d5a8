/// Shared remote plumbing
/// LLM messages API client and tool-server HTTP calls

pub mod claude;
pub mod fetch;

pub use claude::{LlmConfig, LlmInterpreter};
pub use fetch::{call_server_tool, fetch_tool_definitions, parse_json_object};
