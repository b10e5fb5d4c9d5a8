/// Stay agent client library
/// Conversation orchestration for searching, booking and scheduling a
/// short-term rental, reusable from the CLI and from tests.

pub mod config;
pub mod interpret;
pub mod orchestration;
pub mod prompts;
pub mod provider;
pub mod session;
pub mod shared;
pub mod state;

pub use config::{AgentConfig, AgentDeps, ConversationSettings, InterpreterKind};
pub use orchestration::Orchestrator;
pub use provider::{CapabilityProvider, HttpProvider, MockProvider, ProviderError};
pub use session::run_session;
pub use state::{ConversationState, Message, PreferenceRecord, Role, Stage};
