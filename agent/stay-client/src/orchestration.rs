/// Orchestration logic for the stay booking agent
/// Drives the conversation stage machine:
/// - preference collection and search
/// - presenting listings and interpreting the pick
/// - booking and the optional calendar event
///
/// Stages that wait for the user react to an utterance; the others run an
/// entry action as soon as the machine moves onto them. Every change goes
/// through `ConversationState::apply`.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use listing_core::{BookingRequest, CalendarEventRequest, ListingRecord};
use serde::Serialize;
use uuid::Uuid;

use crate::config::{AgentDeps, ConversationSettings};
use crate::interpret::{Choice, ChoiceInterpreter, ConfirmationInterpreter, PreferenceExtractor};
use crate::provider::{CapabilityProvider, ProviderError};
use crate::state::{
    ConversationState, Message, PreferenceRecord, Role, Stage, StageResult, StateUpdate,
};

pub const GREETING: &str = "Hello! I'm here to help you book a place to stay and add the trip to your calendar. \
     Where are you going, which dates (YYYY-MM-DD), and how many adults and children?";

pub struct Orchestrator {
    conversation_id: Uuid,
    state: ConversationState,
    settings: ConversationSettings,
    provider: Arc<dyn CapabilityProvider>,
    extractor: PreferenceExtractor,
    chooser: ChoiceInterpreter,
    confirmation: ConfirmationInterpreter,
}

fn trace<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

fn join_fields(fields: &[&str]) -> String {
    match fields {
        [] => String::new(),
        [only] => only.to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}

/// Combine a YYYY-MM-DD date with a time of day into an ISO 8601 local
/// date-time. Unparseable dates are passed through as given.
pub fn event_time(date: &str, time: NaiveTime) -> String {
    let date = date.trim();
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(day) => day.and_time(time).format("%Y-%m-%dT%H:%M:%S").to_string(),
        Err(_) => format!("{}T{}", date, time.format("%H:%M:%S")),
    }
}

impl Orchestrator {
    pub fn new(deps: AgentDeps, settings: ConversationSettings) -> Self {
        Self {
            conversation_id: Uuid::new_v4(),
            state: ConversationState::default(),
            settings,
            provider: deps.provider,
            extractor: PreferenceExtractor::new(deps.interpreter.clone()),
            chooser: ChoiceInterpreter::new(deps.interpreter),
            confirmation: ConfirmationInterpreter::new(),
        }
    }

    pub fn conversation_id(&self) -> Uuid {
        self.conversation_id
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn stage(&self) -> Stage {
        self.state.stage
    }

    pub fn is_terminated(&self) -> bool {
        self.state.is_terminated()
    }

    /// Record and return the opening assistant message
    pub fn greet(&mut self) -> String {
        self.state.apply(StateUpdate::Message(Message::assistant(GREETING)));
        GREETING.to_string()
    }

    /// Process one user utterance. Returns the assistant messages produced
    /// during this turn, in order. A terminated conversation ignores input.
    pub async fn handle_turn(&mut self, utterance: &str) -> Vec<String> {
        if self.state.is_terminated() {
            tracing::debug!("[ORCH] {} ignoring input after termination", self.conversation_id);
            return Vec::new();
        }

        let first_new = self.state.messages.len();
        self.state.apply(StateUpdate::Message(Message::user(utterance)));

        let mut current = self.state.stage;
        let reaction = self.react(current, utterance).await;
        self.state.apply_all(reaction);

        // run entry actions until the machine rests
        while self.state.stage != current {
            tracing::info!("[ORCH] {} stage {} -> {}", self.conversation_id, current, self.state.stage);
            current = self.state.stage;
            let entered = self.enter(current).await;
            self.state.apply_all(entered);
        }

        self.state.messages[first_new..]
            .iter()
            .filter(|m| m.role == Role::Assistant)
            .map(|m| m.content.clone())
            .collect()
    }

    async fn react(&self, stage: Stage, utterance: &str) -> StageResult {
        match stage {
            Stage::CollectingPreferences => self.collect_preferences(utterance).await,
            Stage::PresentingChoices => self.decide_next_step(utterance).await,
            Stage::Booking => self.confirm_calendar_event(utterance),
            Stage::Searching | Stage::SchedulingEvent | Stage::Terminated => StageResult::new(),
        }
    }

    async fn enter(&self, stage: Stage) -> StageResult {
        match stage {
            Stage::CollectingPreferences => StageResult::new().with(StateUpdate::PreferenceAttempts(0)),
            Stage::Searching => self.search().await,
            Stage::PresentingChoices => self.present_choices(),
            Stage::Booking => self.book().await,
            Stage::SchedulingEvent => self.schedule().await,
            Stage::Terminated => StageResult::new(),
        }
    }

    fn presented_count(&self) -> usize {
        self.state.search_results.len().min(self.settings.listings_shown)
    }

    fn provider_failure(&self, result: StageResult, action: &str, error: ProviderError) -> StageResult {
        tracing::error!("[ORCH] {} provider failed to {}: {}", self.conversation_id, action, error);
        result
            .say(format!(
                "Sorry, I wasn't able to {} right now. Please try again a bit later.",
                action
            ))
            .goto(Stage::Terminated)
    }

    async fn collect_preferences(&self, utterance: &str) -> StageResult {
        let current = &self.state.preferences;
        let merged = match self.extractor.extract(utterance, current).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("[EXTRACT] {} extraction failed: {}", self.conversation_id, e);
                current.clone()
            }
        };

        if !merged.is_complete() {
            let missing = join_fields(&merged.missing_fields());
            return self.ask_again(merged, format!("Thanks! To search I still need {}.", missing));
        }

        if !merged.dates_in_order() {
            let check_in = merged.date_from.clone().unwrap_or_default();
            let mut corrected = merged;
            corrected.date_to = None;
            return self.ask_again(
                corrected,
                format!(
                    "The check-out date has to be after the check-in date ({}). When are you checking out?",
                    check_in
                ),
            );
        }

        // a complete record that did not change answers the offer to refine
        if merged == *current {
            if self.confirmation.is_negative(utterance) {
                return StageResult::new()
                    .say("No problem, I won't book anything. Have a great day!")
                    .goto(Stage::Terminated);
            }
            return self.ask_again(
                merged,
                "Tell me what to change: the city, the dates or the number of guests.".to_string(),
            );
        }

        StageResult::new()
            .with(StateUpdate::Preferences(merged))
            .goto(Stage::Searching)
    }

    /// Stay in preference collection and prompt again, giving up once the
    /// attempt limit is reached.
    fn ask_again(&self, record: PreferenceRecord, prompt: String) -> StageResult {
        let attempts = self.state.preference_attempts + 1;
        let give_up = match record.missing_fields().as_slice() {
            [] => "I couldn't work out what to change".to_string(),
            missing => format!("I still don't have {}", join_fields(missing)),
        };
        let result = StageResult::new()
            .with(StateUpdate::Preferences(record))
            .with(StateUpdate::PreferenceAttempts(attempts));

        if attempts >= self.settings.max_preference_attempts.max(1) {
            tracing::info!("[ORCH] {} giving up after {} unusable turns", self.conversation_id, attempts);
            return result
                .say(format!(
                    "{}, so I'll stop here. Come back any time you're ready to plan the trip.",
                    give_up
                ))
                .goto(Stage::Terminated);
        }

        result.say(prompt)
    }

    async fn search(&self) -> StageResult {
        let Some(query) = self.state.preferences.search_query() else {
            return StageResult::new().goto(Stage::CollectingPreferences);
        };

        let result = StageResult::new().say(format!("Searching for places to stay in {}...", query.city));
        match self.provider.search_listings(&query).await {
            Ok(listings) => {
                tracing::info!("[ORCH] {} search returned {} listings", self.conversation_id, listings.len());
                result
                    .record_tool(listing_core::SEARCH_LISTINGS, trace(&listings))
                    .with(StateUpdate::SearchResults(listings))
                    .goto(Stage::PresentingChoices)
            }
            Err(e) => self.provider_failure(result, "search for listings", e),
        }
    }

    fn present_choices(&self) -> StageResult {
        let shown = self.presented_count();
        if shown == 0 {
            let city = self.state.preferences.city.as_deref().unwrap_or("that city");
            return StageResult::new()
                .say(format!(
                    "I couldn't find any listings in {} for those dates and guests. \
                     Would you like to try a different city, other dates or a different number of guests?",
                    city
                ))
                .goto(Stage::CollectingPreferences);
        }

        let mut content = format!("Here are the top {} listings I found:\n\n", shown);
        for (i, listing) in self.state.search_results.iter().take(shown).enumerate() {
            content.push_str(&format!(
                "{}. {} - ${:.2}/night, Rating: {}\n",
                i + 1,
                listing.name,
                listing.price,
                listing.rating
            ));
        }
        content.push_str("\nWhich one would you like to book? You can also ask for different options.");

        StageResult::new().say(content)
    }

    async fn decide_next_step(&self, utterance: &str) -> StageResult {
        let presented = self.presented_count();
        match self.chooser.interpret(utterance, presented).await {
            Choice::Select(n) => match n.checked_sub(1).and_then(|i| self.state.search_results.get(i)) {
                Some(listing) => StageResult::new()
                    .with(StateUpdate::ChosenListing(listing.clone()))
                    .goto(Stage::Booking),
                None => StageResult::new()
                    .say("Sorry, I couldn't match that to one of the listings. Let's stop here for now.")
                    .goto(Stage::Terminated),
            },
            Choice::Refine => StageResult::new()
                .say("Sure, let's look for something else. Tell me what to change: the city, the dates or the number of guests.")
                .goto(Stage::CollectingPreferences),
            Choice::End => StageResult::new()
                .say("No problem, I won't book anything. Have a great day!")
                .goto(Stage::Terminated),
        }
    }

    fn booking_request(&self, listing: &ListingRecord) -> BookingRequest {
        let preferences = &self.state.preferences;
        BookingRequest {
            listing_url: listing.url.clone(),
            date_from: preferences.date_from.clone().unwrap_or_default(),
            date_to: preferences.date_to.clone().unwrap_or_default(),
            adults: preferences.adults.unwrap_or_default(),
            children: preferences.children(),
        }
    }

    async fn book(&self) -> StageResult {
        let Some(listing) = self.state.chosen_listing.as_ref() else {
            return StageResult::new()
                .say("Sorry, I lost track of which listing you picked. Let's stop here for now.")
                .goto(Stage::Terminated);
        };

        let request = self.booking_request(listing);
        let result = StageResult::new().say(format!("Booking {}...", listing.name));
        match self.provider.book_listing(&request).await {
            Ok(confirmation) => {
                tracing::info!(
                    "[ORCH] {} booked {} ({})",
                    self.conversation_id, listing.url, confirmation.booking_id
                );
                let summary = format!(
                    "You're booked at {}! Confirmation code: {}.\n\nWould you like me to add this stay to your calendar?",
                    listing.name, confirmation.confirmation_code
                );
                result
                    .record_tool(listing_core::BOOK_LISTING, trace(&confirmation))
                    .with(StateUpdate::Booking(confirmation))
                    .say(summary)
            }
            Err(e) => self.provider_failure(result, "complete the booking", e),
        }
    }

    fn confirm_calendar_event(&self, utterance: &str) -> StageResult {
        if self.confirmation.is_affirmative(utterance) {
            StageResult::new().goto(Stage::SchedulingEvent)
        } else {
            StageResult::new()
                .say("Okay, I won't add a calendar event. Enjoy your stay!")
                .goto(Stage::Terminated)
        }
    }

    fn calendar_request(&self, listing: &ListingRecord) -> CalendarEventRequest {
        let preferences = &self.state.preferences;
        let date_from = preferences.date_from.as_deref().unwrap_or_default();
        let date_to = preferences.date_to.as_deref().unwrap_or_default();
        let description = match &self.state.booking_confirmation {
            Some(confirmation) => format!(
                "Booking confirmation for {} (code {}).",
                listing.name, confirmation.confirmation_code
            ),
            None => format!("Booking confirmation for {}.", listing.name),
        };

        CalendarEventRequest {
            summary: format!("Stay: {}", listing.name),
            start_time: event_time(date_from, self.settings.check_in_time),
            end_time: event_time(date_to, self.settings.check_out_time),
            description: Some(description),
        }
    }

    async fn schedule(&self) -> StageResult {
        let Some(listing) = self.state.chosen_listing.as_ref() else {
            return StageResult::new().goto(Stage::Terminated);
        };

        let request = self.calendar_request(listing);
        let result = StageResult::new().say("Creating a calendar event...");
        match self.provider.create_calendar_event(&request).await {
            Ok(handle) => {
                let done = format!(
                    "Done! \"{}\" is on your calendar from {} to {}. Enjoy your stay!",
                    request.summary, request.start_time, request.end_time
                );
                result
                    .record_tool(listing_core::CREATE_CALENDAR_EVENT, trace(&handle))
                    .with(StateUpdate::CalendarEvent(handle))
                    .say(done)
                    .goto(Stage::Terminated)
            }
            Err(e) => self.provider_failure(result, "create the calendar event", e),
        }
    }
}
