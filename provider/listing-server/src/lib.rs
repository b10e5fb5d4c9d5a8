/// Listing tool server - Search, Booking & Calendar tools
///
/// Exposes the stay capability provider as tools over HTTP
/// - POST /tools/search-listings
/// - POST /tools/book-listing
/// - POST /tools/create-calendar-event
/// - GET /tools - List all tools

use axum::{
    extract::Json,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use serde_json::json;
use tower_http::cors::CorsLayer;

use listing_core::{
    booking, calendar, search, BookingConfirmation, BookingRequest, CalendarEventHandle,
    CalendarEventRequest, ListingRecord, SearchQuery,
};

/// Tool Definition
#[derive(Debug, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

/// Tools List Response
#[derive(Debug, Serialize)]
pub struct ToolsResponse {
    pub tools: Vec<ToolDefinition>,
}

/// Standard Tool Response
#[derive(Debug, Serialize)]
pub struct ToolResponse<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ToolResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

type ToolResult<T> = Result<Json<ToolResponse<T>>, (StatusCode, Json<ToolResponse<()>>)>;

fn tool_error(error: String) -> ToolResponse<()> {
    ToolResponse {
        success: false,
        data: None,
        error: Some(error),
    }
}

fn reject_missing(tag: &str, missing_fields: Vec<&str>) -> Result<(), (StatusCode, Json<ToolResponse<()>>)> {
    if missing_fields.is_empty() {
        return Ok(());
    }
    let error_msg = format!("Missing required field(s): {}", missing_fields.join(", "));
    tracing::warn!("[{}] Validation failed: {}", tag, error_msg);
    Err((StatusCode::BAD_REQUEST, Json(tool_error(error_msg))))
}

/// Health check endpoint
async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "healthy"}))
}

/// Definitions of every tool this server hosts
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: listing_core::SEARCH_LISTINGS.to_string(),
            description: "Search short-term rental listings for a city, date range and party".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "city": {"type": "string", "description": "City to search in"},
                    "date_from": {"type": "string", "description": "Check-in date (YYYY-MM-DD)"},
                    "date_to": {"type": "string", "description": "Check-out date (YYYY-MM-DD)"},
                    "adults": {"type": "integer", "description": "Number of adults (at least 1)"},
                    "children": {"type": "integer", "description": "Number of children (default 0)"}
                },
                "required": ["city", "date_from", "date_to", "adults"]
            }),
        },
        ToolDefinition {
            name: listing_core::BOOK_LISTING.to_string(),
            description: "Book a listing and return a confirmation".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "listing_url": {"type": "string", "description": "URL identifying the listing"},
                    "date_from": {"type": "string", "description": "Check-in date (YYYY-MM-DD)"},
                    "date_to": {"type": "string", "description": "Check-out date (YYYY-MM-DD)"},
                    "adults": {"type": "integer"},
                    "children": {"type": "integer"}
                },
                "required": ["listing_url", "date_from", "date_to", "adults"]
            }),
        },
        ToolDefinition {
            name: listing_core::CREATE_CALENDAR_EVENT.to_string(),
            description: "Create a calendar event and return its identifier".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "summary": {"type": "string", "description": "Event title"},
                    "start_time": {"type": "string", "description": "ISO 8601 start"},
                    "end_time": {"type": "string", "description": "ISO 8601 end"},
                    "description": {"type": "string", "description": "Optional description"}
                },
                "required": ["summary", "start_time", "end_time"]
            }),
        },
    ]
}

/// List all available tools
async fn list_tools() -> Json<ToolsResponse> {
    tracing::info!("[LIST TOOLS] Received request to list available tools");
    Json(ToolsResponse {
        tools: tool_definitions(),
    })
}

/// Search listings
async fn search_listings(Json(req): Json<SearchQuery>) -> ToolResult<Vec<ListingRecord>> {
    tracing::info!(
        "[SEARCH-LISTINGS] Tool call received: city={}, from={}, to={}, adults={}, children={}",
        req.city, req.date_from, req.date_to, req.adults, req.children
    );

    let mut missing_fields = Vec::new();
    if req.city.trim().is_empty() {
        missing_fields.push("'city'");
    }
    if req.date_from.trim().is_empty() {
        missing_fields.push("'date_from' (check-in date)");
    }
    if req.date_to.trim().is_empty() {
        missing_fields.push("'date_to' (check-out date)");
    }
    if req.adults == 0 {
        missing_fields.push("'adults' (at least one adult)");
    }
    reject_missing("SEARCH-LISTINGS", missing_fields)?;

    let listings = search::handle(&req);
    tracing::info!("[SEARCH-LISTINGS] Found {} listings in {}", listings.len(), req.city);

    Ok(Json(ToolResponse::ok(listings)))
}

/// Book a listing
async fn book_listing(Json(req): Json<BookingRequest>) -> ToolResult<BookingConfirmation> {
    tracing::info!(
        "[BOOK-LISTING] Tool call received: url={}, from={}, to={}, adults={}, children={}",
        req.listing_url, req.date_from, req.date_to, req.adults, req.children
    );

    let mut missing_fields = Vec::new();
    if req.listing_url.trim().is_empty() {
        missing_fields.push("'listing_url'");
    }
    if req.date_from.trim().is_empty() {
        missing_fields.push("'date_from' (check-in date)");
    }
    if req.date_to.trim().is_empty() {
        missing_fields.push("'date_to' (check-out date)");
    }
    if req.adults == 0 {
        missing_fields.push("'adults' (at least one adult)");
    }
    reject_missing("BOOK-LISTING", missing_fields)?;

    let confirmation = booking::handle(&req);
    tracing::info!(
        "[BOOK-LISTING] result: booking_id={}, confirmation_code={}, status={}",
        confirmation.booking_id, confirmation.confirmation_code, confirmation.status
    );

    Ok(Json(ToolResponse::ok(confirmation)))
}

/// Create a calendar event
async fn create_calendar_event(Json(req): Json<CalendarEventRequest>) -> ToolResult<CalendarEventHandle> {
    tracing::info!(
        "[CREATE-CALENDAR-EVENT] Tool call received: summary={}, start={}, end={}",
        req.summary, req.start_time, req.end_time
    );

    let mut missing_fields = Vec::new();
    if req.summary.trim().is_empty() {
        missing_fields.push("'summary'");
    }
    if req.start_time.trim().is_empty() {
        missing_fields.push("'start_time'");
    }
    if req.end_time.trim().is_empty() {
        missing_fields.push("'end_time'");
    }
    reject_missing("CREATE-CALENDAR-EVENT", missing_fields)?;

    let handle = calendar::handle(&req);
    tracing::info!("[CREATE-CALENDAR-EVENT] Created event {}", handle);

    Ok(Json(ToolResponse::ok(handle)))
}

/// Build the tool router
pub fn router() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tools", get(list_tools))
        .route("/tools/search-listings", post(search_listings))
        .route("/tools/book-listing", post(book_listing))
        .route("/tools/create-calendar-event", post(create_calendar_event))
        .layer(CorsLayer::permissive())
}
