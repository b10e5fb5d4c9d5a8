//! Shared test helpers: a provider that records every call and can be told
//! to return canned results or fail.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use listing_core::{
    BookingConfirmation, BookingRequest, CalendarEventHandle, CalendarEventRequest, ListingRecord,
    SearchQuery,
};
use serde_json::Value;
use stay_client::interpret::{ExtractionError, RuleInterpreter, Schema, StructuredInterpreter};
use stay_client::{AgentDeps, CapabilityProvider, ConversationSettings, Orchestrator, ProviderError};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Search(SearchQuery),
    Book(BookingRequest),
    Calendar(CalendarEventRequest),
}

#[derive(Default)]
pub struct RecordingProvider {
    pub calls: Mutex<Vec<Call>>,
    pub listings: Option<Vec<ListingRecord>>,
    pub fail_booking: bool,
}

impl RecordingProvider {
    pub fn with_listings(listings: Vec<ListingRecord>) -> Self {
        Self {
            listings: Some(listings),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn search_count(&self) -> usize {
        self.calls().iter().filter(|c| matches!(c, Call::Search(_))).count()
    }
}

#[async_trait]
impl CapabilityProvider for RecordingProvider {
    async fn search_listings(&self, query: &SearchQuery) -> Result<Vec<ListingRecord>, ProviderError> {
        self.calls.lock().unwrap().push(Call::Search(query.clone()));
        Ok(self
            .listings
            .clone()
            .unwrap_or_else(|| listing_core::search::handle(query)))
    }

    async fn book_listing(&self, request: &BookingRequest) -> Result<BookingConfirmation, ProviderError> {
        self.calls.lock().unwrap().push(Call::Book(request.clone()));
        if self.fail_booking {
            return Err(ProviderError::Transport("connection refused".to_string()));
        }
        Ok(listing_core::booking::handle(request))
    }

    async fn create_calendar_event(
        &self,
        request: &CalendarEventRequest,
    ) -> Result<CalendarEventHandle, ProviderError> {
        self.calls.lock().unwrap().push(Call::Calendar(request.clone()));
        Ok(listing_core::calendar::handle(request))
    }
}

/// Interpreter that always fails, like an unreachable model
pub struct FailingInterpreter;

#[async_trait]
impl StructuredInterpreter for FailingInterpreter {
    async fn interpret(&self, _schema: Schema, _text: &str) -> Result<Value, ExtractionError> {
        Err(ExtractionError::Transport("model unavailable".to_string()))
    }
}

pub fn listing(n: u32) -> ListingRecord {
    ListingRecord {
        name: format!("Listing {}", n),
        price: 100.0 + f64::from(n),
        rating: 4.0,
        url: format!("https://stays.example.com/rooms/{}", n),
    }
}

pub fn orchestrator_with(provider: Arc<RecordingProvider>) -> Orchestrator {
    Orchestrator::new(
        AgentDeps::new(Arc::new(RuleInterpreter::new()), provider),
        ConversationSettings::default(),
    )
}

pub const FULL_REQUEST: &str = "A place in Lisbon from 2025-06-01 to 2025-06-05 for 2 adults";
