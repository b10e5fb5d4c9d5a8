/// Agent configuration
/// Environment-driven settings and the dependency bundle handed to the
/// orchestrator.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveTime;

use crate::interpret::{RuleInterpreter, StructuredInterpreter};
use crate::provider::{CapabilityProvider, HttpProvider, MockProvider};
use crate::shared::claude::{DEFAULT_LLM_API_URL, DEFAULT_LLM_MODEL};
use crate::shared::{LlmConfig, LlmInterpreter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpreterKind {
    Rules,
    Llm,
}

/// Knobs of the conversation itself
#[derive(Debug, Clone)]
pub struct ConversationSettings {
    /// Consecutive incomplete preference turns before giving up
    pub max_preference_attempts: u32,
    /// How many search results are shown
    pub listings_shown: usize,
    /// Time of day the calendar event starts on the check-in date
    pub check_in_time: NaiveTime,
    /// Time of day the calendar event ends on the check-out date
    pub check_out_time: NaiveTime,
}

impl Default for ConversationSettings {
    fn default() -> Self {
        Self {
            max_preference_attempts: 3,
            listings_shown: MAX_LISTINGS_SHOWN,
            check_in_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            check_out_time: NaiveTime::from_hms_opt(11, 0, 0).unwrap_or_default(),
        }
    }
}

pub struct AgentConfig {
    pub interpreter: InterpreterKind,
    pub llm: Option<LlmConfig>,
    pub listing_server_url: Option<String>,
    pub conversation: ConversationSettings,
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_time(name: &str, value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .with_context(|| format!("{} must be HH:MM[:SS], got '{}'", name, value))
}

/// At most the top three results are ever shown
const MAX_LISTINGS_SHOWN: usize = 3;

fn parse_listings_shown(value: &str) -> Result<usize> {
    let shown: usize = value
        .trim()
        .parse()
        .with_context(|| format!("LISTINGS_SHOWN must be a number, got '{}'", value))?;
    if !(1..=MAX_LISTINGS_SHOWN).contains(&shown) {
        return Err(anyhow!(
            "LISTINGS_SHOWN must be between 1 and {}, got {}",
            MAX_LISTINGS_SHOWN,
            shown
        ));
    }
    Ok(shown)
}

impl AgentConfig {
    pub fn from_env() -> Result<Self> {
        let api_key = env_opt("LLM_API_KEY").or_else(|| env_opt("ANTHROPIC_API_KEY"));
        let llm = api_key.map(|api_key| LlmConfig {
            api_key,
            api_url: env_opt("LLM_API_URL").unwrap_or_else(|| DEFAULT_LLM_API_URL.to_string()),
            model: env_opt("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
        });

        let interpreter = match env_opt("INTERPRETER").map(|v| v.to_lowercase()).as_deref() {
            Some("rules") => InterpreterKind::Rules,
            Some("llm") => {
                if llm.is_none() {
                    return Err(anyhow!(
                        "INTERPRETER=llm requires LLM_API_KEY or ANTHROPIC_API_KEY"
                    ));
                }
                InterpreterKind::Llm
            }
            Some(other) => return Err(anyhow!("Unknown INTERPRETER '{}', expected rules or llm", other)),
            None if llm.is_some() => InterpreterKind::Llm,
            None => InterpreterKind::Rules,
        };

        let mut conversation = ConversationSettings::default();
        if let Some(value) = env_opt("MAX_PREFERENCE_ATTEMPTS") {
            conversation.max_preference_attempts = value
                .parse()
                .with_context(|| format!("MAX_PREFERENCE_ATTEMPTS must be a number, got '{}'", value))?;
        }
        if let Some(value) = env_opt("LISTINGS_SHOWN") {
            conversation.listings_shown = parse_listings_shown(&value)?;
        }
        if let Some(value) = env_opt("CHECK_IN_TIME") {
            conversation.check_in_time = parse_time("CHECK_IN_TIME", &value)?;
        }
        if let Some(value) = env_opt("CHECK_OUT_TIME") {
            conversation.check_out_time = parse_time("CHECK_OUT_TIME", &value)?;
        }

        Ok(Self {
            interpreter,
            llm,
            listing_server_url: env_opt("LISTING_SERVER_URL"),
            conversation,
        })
    }
}

/// Collaborators of the orchestrator, created once at startup
#[derive(Clone)]
pub struct AgentDeps {
    pub interpreter: Arc<dyn StructuredInterpreter>,
    pub provider: Arc<dyn CapabilityProvider>,
}

impl AgentDeps {
    pub fn new(
        interpreter: Arc<dyn StructuredInterpreter>,
        provider: Arc<dyn CapabilityProvider>,
    ) -> Self {
        Self {
            interpreter,
            provider,
        }
    }

    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        let interpreter: Arc<dyn StructuredInterpreter> = match (config.interpreter, &config.llm) {
            (InterpreterKind::Llm, Some(llm)) => Arc::new(LlmInterpreter::new(llm.clone())),
            (InterpreterKind::Llm, None) => return Err(anyhow!("LLM interpreter selected without an API key")),
            (InterpreterKind::Rules, _) => Arc::new(RuleInterpreter::new()),
        };

        let provider: Arc<dyn CapabilityProvider> = match &config.listing_server_url {
            Some(url) => Arc::new(HttpProvider::new(url.clone())),
            None => Arc::new(MockProvider),
        };

        Ok(Self::new(interpreter, provider))
    }
}
