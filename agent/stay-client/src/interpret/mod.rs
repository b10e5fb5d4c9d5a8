/// Structured interpretation of free text
/// One seam (`StructuredInterpreter`) turns an utterance into a value of a
/// declared shape; the typed extractors on top of it validate that value.

pub mod choice;
pub mod confirmation;
pub mod preferences;
pub mod rules;

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

pub use choice::{keyword_choice, Choice, ChoiceInterpreter};
pub use confirmation::ConfirmationInterpreter;
pub use preferences::PreferenceExtractor;
pub use rules::RuleInterpreter;

/// Classified failure of a structured interpretation
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Interpreter transport error: {0}")]
    Transport(String),

    #[error("Interpreter API error: {0}")]
    Api(String),

    #[error("Output does not match the {schema} shape: {reason}")]
    Malformed { schema: &'static str, reason: String },

    #[error("No {0} value found in the input")]
    NoValue(&'static str),
}

/// Which preference fields the conversation already holds. Lets an
/// interpreter place a lone date in the slot that is still open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KnownFields {
    pub city: bool,
    pub date_from: bool,
    pub date_to: bool,
    pub adults: bool,
}

impl KnownFields {
    /// Check-in is set and check-out is the date still being asked for
    pub fn awaiting_check_out(&self) -> bool {
        self.date_from && !self.date_to
    }
}

/// Target shape of an interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    /// city, date_from, date_to, adults, children
    Preferences { known: KnownFields },
    /// a single integer choice among `options` presented listings
    Choice { options: usize },
}

impl Schema {
    pub fn name(&self) -> &'static str {
        match self {
            Schema::Preferences { .. } => "preferences",
            Schema::Choice { .. } => "choice",
        }
    }

    /// JSON schema of the expected value
    pub fn json_schema(&self) -> Value {
        match self {
            Schema::Preferences { .. } => json!({
                "type": "object",
                "properties": {
                    "city": {"type": ["string", "null"]},
                    "date_from": {"type": ["string", "null"], "description": "YYYY-MM-DD"},
                    "date_to": {"type": ["string", "null"], "description": "YYYY-MM-DD"},
                    "adults": {"type": ["integer", "null"], "minimum": 0},
                    "children": {"type": ["integer", "null"], "minimum": 0}
                }
            }),
            Schema::Choice { options } => json!({
                "type": "object",
                "properties": {
                    "choice": {"type": "integer", "minimum": 1, "maximum": options}
                },
                "required": ["choice"]
            }),
        }
    }
}

const REFINE_WORDS: [&str; 8] = [
    "more", "different", "other", "others", "another", "else", "refine", "change",
];

/// True when the text asks for other options rather than picking one
pub(crate) fn mentions_refine(text: &str) -> bool {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| REFINE_WORDS.contains(&word))
}

/// Anything that can turn free text into a value of a given schema:
/// a rule-based parser or a remote model call.
#[async_trait]
pub trait StructuredInterpreter: Send + Sync {
    async fn interpret(&self, schema: Schema, text: &str) -> Result<Value, ExtractionError>;
}
