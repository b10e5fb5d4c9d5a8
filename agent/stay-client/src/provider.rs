/// Capability provider
/// The search / book / schedule operations the orchestrator depends on,
/// with an in-process mock and an HTTP client for the listing tool server.

use async_trait::async_trait;
use listing_core::{
    BookingConfirmation, BookingRequest, CalendarEventHandle, CalendarEventRequest, ListingRecord,
    SearchQuery,
};
use serde_json::Value;
use thiserror::Error;

use crate::shared::{call_server_tool, fetch_tool_definitions};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider unreachable: {0}")]
    Transport(String),

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

/// Each call's result is authoritative; callers do not retry.
#[async_trait]
pub trait CapabilityProvider: Send + Sync {
    async fn search_listings(&self, query: &SearchQuery) -> Result<Vec<ListingRecord>, ProviderError>;

    async fn book_listing(&self, request: &BookingRequest) -> Result<BookingConfirmation, ProviderError>;

    async fn create_calendar_event(
        &self,
        request: &CalendarEventRequest,
    ) -> Result<CalendarEventHandle, ProviderError>;
}

/// Mock provider running the listing core in-process
#[derive(Debug, Default, Clone)]
pub struct MockProvider;

#[async_trait]
impl CapabilityProvider for MockProvider {
    async fn search_listings(&self, query: &SearchQuery) -> Result<Vec<ListingRecord>, ProviderError> {
        tracing::info!(
            "[PROVIDER] Searching in {} from {} to {} for {} adults and {} children",
            query.city, query.date_from, query.date_to, query.adults, query.children
        );
        Ok(listing_core::search::handle(query))
    }

    async fn book_listing(&self, request: &BookingRequest) -> Result<BookingConfirmation, ProviderError> {
        tracing::info!(
            "[PROVIDER] Booking {} from {} to {}",
            request.listing_url, request.date_from, request.date_to
        );
        Ok(listing_core::booking::handle(request))
    }

    async fn create_calendar_event(
        &self,
        request: &CalendarEventRequest,
    ) -> Result<CalendarEventHandle, ProviderError> {
        tracing::info!(
            "[PROVIDER] Creating calendar event: {} from {} to {}",
            request.summary, request.start_time, request.end_time
        );
        Ok(listing_core::calendar::handle(request))
    }
}

/// Provider backed by the listing tool server
pub struct HttpProvider {
    client: reqwest::Client,
    server_url: String,
}

impl HttpProvider {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            server_url: server_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Tool definitions advertised by the server
    pub async fn list_tools(&self) -> Result<Value, ProviderError> {
        fetch_tool_definitions(&self.client, &self.server_url).await
    }
}

#[async_trait]
impl CapabilityProvider for HttpProvider {
    async fn search_listings(&self, query: &SearchQuery) -> Result<Vec<ListingRecord>, ProviderError> {
        tracing::info!("[PROVIDER] POST {}/tools/{}", self.server_url, listing_core::SEARCH_LISTINGS);
        call_server_tool(&self.client, &self.server_url, listing_core::SEARCH_LISTINGS, query).await
    }

    async fn book_listing(&self, request: &BookingRequest) -> Result<BookingConfirmation, ProviderError> {
        tracing::info!("[PROVIDER] POST {}/tools/{}", self.server_url, listing_core::BOOK_LISTING);
        call_server_tool(&self.client, &self.server_url, listing_core::BOOK_LISTING, request).await
    }

    async fn create_calendar_event(
        &self,
        request: &CalendarEventRequest,
    ) -> Result<CalendarEventHandle, ProviderError> {
        tracing::info!(
            "[PROVIDER] POST {}/tools/{}",
            self.server_url,
            listing_core::CREATE_CALENDAR_EVENT
        );
        call_server_tool(&self.client, &self.server_url, listing_core::CREATE_CALENDAR_EVENT, request).await
    }
}
