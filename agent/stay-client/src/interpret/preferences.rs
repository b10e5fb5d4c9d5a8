use std::sync::Arc;

use super::{ExtractionError, KnownFields, Schema, StructuredInterpreter};
use crate::state::PreferenceRecord;

impl From<&PreferenceRecord> for KnownFields {
    fn from(record: &PreferenceRecord) -> Self {
        let missing = record.missing_fields();
        Self {
            city: !missing.contains(&"the city"),
            date_from: !missing.contains(&"the check-in date"),
            date_to: !missing.contains(&"the check-out date"),
            adults: !missing.contains(&"the number of adults"),
        }
    }
}

/// Turns an utterance into an updated preference record
pub struct PreferenceExtractor {
    interpreter: Arc<dyn StructuredInterpreter>,
}

impl PreferenceExtractor {
    pub fn new(interpreter: Arc<dyn StructuredInterpreter>) -> Self {
        Self { interpreter }
    }

    /// Extract from `utterance` and merge into a copy of `current`.
    /// Fields the utterance does not mention keep their previous values.
    pub async fn extract(
        &self,
        utterance: &str,
        current: &PreferenceRecord,
    ) -> Result<PreferenceRecord, ExtractionError> {
        let schema = Schema::Preferences {
            known: KnownFields::from(current),
        };
        let value = self.interpreter.interpret(schema, utterance).await?;
        let extracted: PreferenceRecord =
            serde_json::from_value(value).map_err(|e| ExtractionError::Malformed {
                schema: schema.name(),
                reason: e.to_string(),
            })?;

        tracing::debug!("[EXTRACT] Extracted preferences: {:?}", extracted);

        let mut merged = current.clone();
        merged.merge(extracted);
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpret::RuleInterpreter;

    #[tokio::test]
    async fn test_extract_full_utterance() {
        let extractor = PreferenceExtractor::new(Arc::new(RuleInterpreter::new()));
        let record = extractor
            .extract(
                "A place in Lisbon from 2025-06-01 to 2025-06-05 for 2 adults and 1 child",
                &PreferenceRecord::default(),
            )
            .await
            .unwrap();

        assert!(record.is_complete());
        assert_eq!(record.city.as_deref(), Some("Lisbon"));
        assert_eq!(record.children, Some(1));
    }

    #[tokio::test]
    async fn test_extract_merges_into_existing_record() {
        let extractor = PreferenceExtractor::new(Arc::new(RuleInterpreter::new()));
        let first = extractor
            .extract("I want to go to Porto", &PreferenceRecord::default())
            .await
            .unwrap();
        assert!(!first.is_complete());

        let second = extractor
            .extract("2025-07-10 until 2025-07-12, 3 adults", &first)
            .await
            .unwrap();
        assert_eq!(second.city.as_deref(), Some("Porto"));
        assert_eq!(second.adults, Some(3));
        assert!(second.is_complete());
    }

    #[tokio::test]
    async fn test_lone_date_fills_check_out_when_check_in_is_known() {
        let extractor = PreferenceExtractor::new(Arc::new(RuleInterpreter::new()));
        let first = extractor
            .extract("A place in Lisbon from 2025-06-01 for 2 adults", &PreferenceRecord::default())
            .await
            .unwrap();
        assert_eq!(first.missing_fields(), vec!["the check-out date"]);

        let second = extractor.extract("2025-06-05", &first).await.unwrap();
        assert_eq!(second.date_from.as_deref(), Some("2025-06-01"));
        assert_eq!(second.date_to.as_deref(), Some("2025-06-05"));
    }

    #[tokio::test]
    async fn test_cued_check_in_replaces_earlier_date() {
        let extractor = PreferenceExtractor::new(Arc::new(RuleInterpreter::new()));
        let first = extractor
            .extract("Stay in Lisbon 2025-06-01 to 2025-06-05, 2 adults", &PreferenceRecord::default())
            .await
            .unwrap();

        let second = extractor.extract("actually arriving 2025-06-02", &first).await.unwrap();
        assert_eq!(second.date_from.as_deref(), Some("2025-06-02"));
        assert_eq!(second.date_to.as_deref(), Some("2025-06-05"));
    }
}
