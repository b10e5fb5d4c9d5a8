/// Extraction prompts for structured information gathering from user input

use crate::interpret::{KnownFields, Schema};

pub const EXTRACTION_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that extracts specific information from user input. \
     Always respond with a single JSON object and nothing else. \
     Use null for anything the user did not say; never guess.";

/// Prompt for extracting stay preferences
pub fn get_preference_extraction_prompt(known: KnownFields) -> String {
    let context = if known.awaiting_check_out() {
        "The check-in date is already known and the user was asked for the check-out date, \
         so a single date without other cues is date_to.\n\n"
    } else {
        ""
    };

    format!(
        "{}\n\nYou are an expert at extracting user preferences for booking a short-term rental. \
         Extract the city, check-in date (date_from), check-out date (date_to), number of adults \
         and number of children from the user's message. Dates must be formatted YYYY-MM-DD.\n\n\
         {}Respond with JSON matching this schema:\n{}",
        EXTRACTION_SYSTEM_PROMPT,
        context,
        Schema::Preferences { known }.json_schema()
    )
}

/// Prompt for extracting which presented listing the user picked
pub fn get_choice_extraction_prompt(options: usize) -> String {
    format!(
        "{}\n\nThe user was shown a numbered list of {} rental listings and asked to choose one to book. \
         Extract the number of the listing they want. If they did not pick one (they want different \
         options or do not want to book), respond with {{\"choice\": null}}.\n\n\
         Respond with JSON matching this schema:\n{}",
        EXTRACTION_SYSTEM_PROMPT,
        options,
        Schema::Choice { options }.json_schema()
    )
}

/// System prompt for a given target schema
pub fn system_prompt_for(schema: Schema) -> String {
    match schema {
        Schema::Preferences { known } => get_preference_extraction_prompt(known),
        Schema::Choice { options } => get_choice_extraction_prompt(options),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_prompt_mentions_option_count() {
        let prompt = system_prompt_for(Schema::Choice { options: 2 });
        assert!(prompt.contains("list of 2 rental listings"));
        assert!(prompt.contains("\"maximum\":2"));
    }

    #[test]
    fn test_preference_prompt_embeds_schema() {
        let prompt = get_preference_extraction_prompt(KnownFields::default());
        assert!(prompt.contains("date_from"));
        assert!(prompt.contains("YYYY-MM-DD"));
        assert!(!prompt.contains("already known"));
    }

    #[test]
    fn test_preference_prompt_points_lone_date_at_check_out() {
        let known = KnownFields {
            date_from: true,
            ..Default::default()
        };
        assert!(get_preference_extraction_prompt(known).contains("a single date without other cues is date_to"));
    }
}
