/// Conversation state
/// The single mutable aggregate threaded through every stage, plus the
/// update variants stages return and the reducer that merges them.

use std::fmt;

use chrono::NaiveDate;
use listing_core::{BookingConfirmation, CalendarEventHandle, ListingRecord, SearchQuery};
use serde::{Deserialize, Serialize};

/// Trip parameters extracted from user text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferenceRecord {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub date_from: Option<String>,
    #[serde(default)]
    pub date_to: Option<String>,
    #[serde(default)]
    pub adults: Option<u32>,
    #[serde(default)]
    pub children: Option<u32>,
}

fn filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

impl PreferenceRecord {
    pub fn children(&self) -> u32 {
        self.children.unwrap_or(0)
    }

    /// City, both dates and at least one adult.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Human readable names of the required fields still unset
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !filled(&self.city) {
            missing.push("the city");
        }
        if !filled(&self.date_from) {
            missing.push("the check-in date");
        }
        if !filled(&self.date_to) {
            missing.push("the check-out date");
        }
        if self.adults.unwrap_or(0) == 0 {
            missing.push("the number of adults");
        }
        missing
    }

    /// Field-level merge: a field is overwritten only when the newer
    /// extraction carries a non-empty value for it. Zero counts are treated
    /// as "not mentioned" so a default never clobbers an earlier answer.
    pub fn merge(&mut self, newer: PreferenceRecord) {
        if filled(&newer.city) {
            self.city = newer.city.map(|c| c.trim().to_string());
        }
        if filled(&newer.date_from) {
            self.date_from = newer.date_from.map(|d| d.trim().to_string());
        }
        if filled(&newer.date_to) {
            self.date_to = newer.date_to.map(|d| d.trim().to_string());
        }
        if let Some(adults) = newer.adults.filter(|n| *n > 0) {
            self.adults = Some(adults);
        }
        match (newer.children, self.children) {
            (Some(n), _) if n > 0 => self.children = Some(n),
            (Some(0), None) => self.children = Some(0),
            _ => {}
        }
    }

    /// False when both dates parse and check-out is not after check-in.
    /// Dates in other formats are left for the provider to judge.
    pub fn dates_in_order(&self) -> bool {
        let parse = |d: &Option<String>| {
            d.as_deref()
                .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
        };
        match (parse(&self.date_from), parse(&self.date_to)) {
            (Some(from), Some(to)) => to > from,
            _ => true,
        }
    }

    /// Search arguments, only available once the record is complete
    pub fn search_query(&self) -> Option<SearchQuery> {
        if !self.is_complete() {
            return None;
        }
        Some(SearchQuery {
            city: self.city.clone()?,
            date_from: self.date_from.clone()?,
            date_to: self.date_to.clone()?,
            adults: self.adults?,
            children: self.children(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Tool,
}

/// One transcript entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// Set on tool messages: which provider operation produced the record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            tool_name: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_name: None,
        }
    }

    pub fn tool(name: &str, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_name: Some(name.to_string()),
        }
    }
}

/// Named states of the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    CollectingPreferences,
    Searching,
    PresentingChoices,
    Booking,
    SchedulingEvent,
    Terminated,
}

impl Stage {
    /// Stages that wait for the next user utterance before moving on
    pub fn awaits_input(self) -> bool {
        matches!(
            self,
            Stage::CollectingPreferences | Stage::PresentingChoices | Stage::Booking
        )
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::CollectingPreferences => "collecting_preferences",
            Stage::Searching => "searching",
            Stage::PresentingChoices => "presenting_choices",
            Stage::Booking => "booking",
            Stage::SchedulingEvent => "scheduling_event",
            Stage::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// Aggregate state of one booking conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationState {
    pub stage: Stage,
    pub preferences: PreferenceRecord,
    pub search_results: Vec<ListingRecord>,
    pub chosen_listing: Option<ListingRecord>,
    pub booking_confirmation: Option<BookingConfirmation>,
    pub calendar_event: Option<CalendarEventHandle>,
    pub messages: Vec<Message>,
    /// Consecutive turns that left the preference record incomplete
    pub preference_attempts: u32,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self {
            stage: Stage::CollectingPreferences,
            preferences: PreferenceRecord::default(),
            search_results: Vec::new(),
            chosen_listing: None,
            booking_confirmation: None,
            calendar_event: None,
            messages: Vec::new(),
            preference_attempts: 0,
        }
    }
}

/// A single field change produced by a stage
#[derive(Debug, Clone, PartialEq)]
pub enum StateUpdate {
    Stage(Stage),
    Preferences(PreferenceRecord),
    SearchResults(Vec<ListingRecord>),
    ChosenListing(ListingRecord),
    Booking(BookingConfirmation),
    CalendarEvent(CalendarEventHandle),
    Message(Message),
    PreferenceAttempts(u32),
}

/// What a stage changed, in order
#[derive(Debug, Default)]
pub struct StageResult {
    pub updates: Vec<StateUpdate>,
}

impl StageResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, update: StateUpdate) -> Self {
        self.updates.push(update);
        self
    }

    pub fn say(self, text: impl Into<String>) -> Self {
        self.with(StateUpdate::Message(Message::assistant(text)))
    }

    pub fn record_tool(self, name: &str, content: impl Into<String>) -> Self {
        self.with(StateUpdate::Message(Message::tool(name, content)))
    }

    pub fn goto(self, stage: Stage) -> Self {
        self.with(StateUpdate::Stage(stage))
    }
}

impl ConversationState {
    /// The reducer. Every state change goes through here.
    pub fn apply(&mut self, update: StateUpdate) {
        match update {
            StateUpdate::Stage(stage) => self.stage = stage,
            StateUpdate::Preferences(preferences) => self.preferences = preferences,
            StateUpdate::SearchResults(results) => {
                // a new search invalidates any earlier pick
                self.search_results = results;
                self.chosen_listing = None;
            }
            StateUpdate::ChosenListing(listing) => self.chosen_listing = Some(listing),
            StateUpdate::Booking(confirmation) => self.booking_confirmation = Some(confirmation),
            StateUpdate::CalendarEvent(handle) => self.calendar_event = Some(handle),
            StateUpdate::Message(message) => self.messages.push(message),
            StateUpdate::PreferenceAttempts(n) => self.preference_attempts = n,
        }
    }

    pub fn apply_all(&mut self, result: StageResult) {
        for update in result.updates {
            self.apply(update);
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.stage == Stage::Terminated
    }
}
