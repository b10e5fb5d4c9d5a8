use std::sync::Arc;

use serde::Deserialize;

use super::{mentions_refine, ExtractionError, Schema, StructuredInterpreter};

/// Outcome of interpreting the reply to a list of presented listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// 1-based position among the presented listings
    Select(usize),
    Refine,
    End,
}

#[derive(Debug, Deserialize)]
struct ChoiceShape {
    choice: i64,
}

/// Classifies a reply into select / refine / end. Never fails: when no valid
/// index can be extracted it degrades to keyword heuristics.
pub struct ChoiceInterpreter {
    interpreter: Arc<dyn StructuredInterpreter>,
}

impl ChoiceInterpreter {
    pub fn new(interpreter: Arc<dyn StructuredInterpreter>) -> Self {
        Self { interpreter }
    }

    pub async fn interpret(&self, utterance: &str, presented: usize) -> Choice {
        match self.extract_index(utterance, presented).await {
            Ok(index) => {
                tracing::info!("[CHOICE] User selected option {}", index);
                Choice::Select(index)
            }
            Err(e) => {
                tracing::info!("[CHOICE] No usable choice ({}), falling back to keywords", e);
                keyword_choice(utterance)
            }
        }
    }

    async fn extract_index(&self, utterance: &str, presented: usize) -> Result<usize, ExtractionError> {
        let schema = Schema::Choice { options: presented };
        let value = self.interpreter.interpret(schema, utterance).await?;
        let shape: ChoiceShape = serde_json::from_value(value).map_err(|e| ExtractionError::Malformed {
            schema: schema.name(),
            reason: e.to_string(),
        })?;

        // out of range is the same failure as no value at all
        usize::try_from(shape.choice)
            .ok()
            .filter(|n| (1..=presented).contains(n))
            .ok_or_else(|| ExtractionError::Malformed {
                schema: schema.name(),
                reason: format!("choice {} outside 1..={}", shape.choice, presented),
            })
    }
}

/// Refine when the reply asks for other options, otherwise end
pub fn keyword_choice(utterance: &str) -> Choice {
    if mentions_refine(utterance) {
        Choice::Refine
    } else {
        Choice::End
    }
}
