/// Yes/no interpretation by keyword match. No model call involved.
#[derive(Debug, Clone)]
pub struct ConfirmationInterpreter {
    affirmative: Vec<String>,
    negative: Vec<String>,
}

const AFFIRMATIVE: [&str; 11] = [
    "yes", "y", "yeah", "yep", "yup", "sure", "ok", "okay", "absolutely", "definitely", "affirmative",
];

const NEGATIVE: [&str; 10] = [
    "no", "n", "nope", "nah", "not", "don't", "stop", "cancel", "nothing", "none",
];

impl Default for ConfirmationInterpreter {
    fn default() -> Self {
        Self {
            affirmative: AFFIRMATIVE.iter().map(|t| t.to_string()).collect(),
            negative: NEGATIVE.iter().map(|t| t.to_string()).collect(),
        }
    }
}

fn has_token(utterance: &str, tokens: &[String]) -> bool {
    utterance
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|word| !word.is_empty())
        .any(|word| tokens.iter().any(|token| token == word))
}

impl ConfirmationInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when any word of the utterance is an affirmative token.
    /// Case-insensitive; matches whole words only.
    pub fn is_affirmative(&self, utterance: &str) -> bool {
        has_token(utterance, &self.affirmative)
    }

    /// True when the utterance declines. A reply with both kinds of token
    /// ("no, yes please") counts as affirmative, not negative.
    pub fn is_negative(&self, utterance: &str) -> bool {
        !self.is_affirmative(utterance) && has_token(utterance, &self.negative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_affirmative_inputs() {
        let confirm = ConfirmationInterpreter::new();
        assert!(confirm.is_affirmative("yes"));
        assert!(confirm.is_affirmative("Sure thing"));
        assert!(confirm.is_affirmative("YES please!"));
        assert!(confirm.is_affirmative("ok, go ahead"));
    }

    #[test]
    fn test_neutral_and_negative_inputs() {
        let confirm = ConfirmationInterpreter::new();
        assert!(!confirm.is_affirmative("no thanks"));
        assert!(!confirm.is_affirmative(""));
        assert!(!confirm.is_affirmative("maybe later"));
        // whole words only
        assert!(!confirm.is_affirmative("yesterday was fine"));
    }

    #[test]
    fn test_negative_inputs() {
        let confirm = ConfirmationInterpreter::new();
        assert!(confirm.is_negative("no thanks"));
        assert!(confirm.is_negative("Nope, don't bother"));
        assert!(!confirm.is_negative("yes"));
        assert!(!confirm.is_negative("try Madrid"));
        // whole words only
        assert!(!confirm.is_negative("nothingness and notes"));
    }
}
