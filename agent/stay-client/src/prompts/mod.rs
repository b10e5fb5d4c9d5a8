/// Prompts module
/// Centralized management of all LLM prompts for structured extraction

pub mod extraction;

pub use extraction::{
    get_choice_extraction_prompt,
    get_preference_extraction_prompt,
    system_prompt_for,
    EXTRACTION_SYSTEM_PROMPT,
};
