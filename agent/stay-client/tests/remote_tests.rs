/// HTTP-backed collaborators: the listing tool server and the model endpoint,
/// both served on ephemeral local ports.

mod common;

use std::sync::Arc;

use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use listing_core::{BookingRequest, CalendarEventRequest, SearchQuery};
use serde_json::{json, Value};
use stay_client::interpret::{
    Choice, ChoiceInterpreter, ExtractionError, RuleInterpreter, Schema, StructuredInterpreter,
};
use stay_client::shared::{LlmConfig, LlmInterpreter};
use stay_client::{
    AgentDeps, CapabilityProvider, ConversationSettings, HttpProvider, Orchestrator, ProviderError, Stage,
};
use tokio::net::TcpListener;

async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Address nothing is listening on
async fn closed_port() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

fn query(adults: u32) -> SearchQuery {
    SearchQuery {
        city: "Lisbon".to_string(),
        date_from: "2025-06-01".to_string(),
        date_to: "2025-06-05".to_string(),
        adults,
        children: 0,
    }
}

#[tokio::test]
async fn test_http_provider_search_is_ranked() {
    let provider = HttpProvider::new(serve(listing_server::router()).await);

    let listings = provider.search_listings(&query(2)).await.unwrap();

    assert!(!listings.is_empty());
    assert!(listings.windows(2).all(|pair| pair[0].rating >= pair[1].rating));
}

#[tokio::test]
async fn test_http_provider_books_and_schedules() {
    let provider = HttpProvider::new(serve(listing_server::router()).await);

    let confirmation = provider
        .book_listing(&BookingRequest {
            listing_url: "https://stays.example.com/rooms/2".to_string(),
            date_from: "2025-06-01".to_string(),
            date_to: "2025-06-05".to_string(),
            adults: 2,
            children: 0,
        })
        .await
        .unwrap();
    assert_eq!(confirmation.status, "confirmed");
    assert!(confirmation.booking_id.starts_with("BK"));

    let handle = provider
        .create_calendar_event(&CalendarEventRequest {
            summary: "Stay: Spacious Loft with a View".to_string(),
            start_time: "2025-06-01T09:00:00".to_string(),
            end_time: "2025-06-05T11:00:00".to_string(),
            description: None,
        })
        .await
        .unwrap();
    assert!(handle.0.starts_with("evt_"));
}

#[tokio::test]
async fn test_http_provider_rejected_call_is_a_tool_error() {
    let provider = HttpProvider::new(serve(listing_server::router()).await);

    let err = provider.search_listings(&query(0)).await.unwrap_err();

    match err {
        ProviderError::Tool(message) => assert!(message.contains("adults"), "{}", message),
        other => panic!("expected tool error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_http_provider_unreachable_server_is_transport_error() {
    let provider = HttpProvider::new(closed_port().await);

    let err = provider.search_listings(&query(2)).await.unwrap_err();
    assert!(matches!(err, ProviderError::Transport(_)));
}

#[tokio::test]
async fn test_http_provider_lists_tools() {
    let provider = HttpProvider::new(serve(listing_server::router()).await);

    let tools = provider.list_tools().await.unwrap();
    let names: Vec<&str> = tools["tools"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|tool| tool["name"].as_str())
        .collect();
    assert_eq!(names, vec!["search-listings", "book-listing", "create-calendar-event"]);
}

#[tokio::test]
async fn test_full_conversation_over_http() {
    let provider = Arc::new(HttpProvider::new(serve(listing_server::router()).await));
    let mut orch = Orchestrator::new(
        AgentDeps::new(Arc::new(RuleInterpreter::new()), provider),
        ConversationSettings::default(),
    );

    orch.handle_turn(common::FULL_REQUEST).await;
    assert_eq!(orch.stage(), Stage::PresentingChoices);
    orch.handle_turn("option 1").await;
    assert!(orch.state().booking_confirmation.is_some());
    orch.handle_turn("yes").await;

    assert_eq!(orch.stage(), Stage::Terminated);
    assert!(orch.state().calendar_event.is_some());
}

fn model_reply(text: &str) -> Json<Value> {
    Json(json!({
        "content": [{"type": "text", "text": text}],
        "stop_reason": "end_turn"
    }))
}

async fn prose_wrapped(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let authorized = headers.get("x-api-key").and_then(|v| v.to_str().ok()) == Some("test-key");
    let asks_for_choice = body["system"].as_str().is_some_and(|s| s.contains("choose one to book"));
    if !authorized || !asks_for_choice {
        return (StatusCode::UNAUTHORIZED, model_reply("denied"));
    }
    (StatusCode::OK, model_reply("Sure! The user picked: {\"choice\": 2} as their listing."))
}

async fn model_endpoint() -> String {
    let router = Router::new()
        .route("/prose", post(prose_wrapped))
        .route("/plain", post(|| async { model_reply("I'm not sure which one they meant.") }))
        .route("/down", post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "overloaded") }));
    serve(router).await
}

fn llm(api_url: String) -> LlmInterpreter {
    LlmInterpreter::new(LlmConfig {
        api_key: "test-key".to_string(),
        api_url,
        model: "test-model".to_string(),
    })
}

#[tokio::test]
async fn test_llm_reply_with_prose_around_json() {
    let base = model_endpoint().await;
    let interpreter = llm(format!("{}/prose", base));

    let value = interpreter
        .interpret(Schema::Choice { options: 3 }, "the loft one")
        .await
        .unwrap();
    assert_eq!(value, json!({"choice": 2}));

    let chooser = ChoiceInterpreter::new(Arc::new(llm(format!("{}/prose", base))));
    assert_eq!(chooser.interpret("the loft one", 3).await, Choice::Select(2));
}

#[tokio::test]
async fn test_llm_reply_without_json_is_malformed() {
    let interpreter = llm(format!("{}/plain", model_endpoint().await));

    let err = interpreter
        .interpret(Schema::Choice { options: 3 }, "the loft one")
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractionError::Malformed { schema: "choice", .. }));
}

#[tokio::test]
async fn test_llm_server_error_is_api_error() {
    let interpreter = llm(format!("{}/down", model_endpoint().await));

    let err = interpreter
        .interpret(Schema::Choice { options: 3 }, "the loft one")
        .await
        .unwrap_err();
    match err {
        ExtractionError::Api(message) => assert!(message.contains("500"), "{}", message),
        other => panic!("expected api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_llm_unreachable_is_transport_error_and_choice_degrades() {
    let base = closed_port().await;

    let err = llm(base.clone())
        .interpret(Schema::Choice { options: 3 }, "show me more")
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractionError::Transport(_)));

    let chooser = ChoiceInterpreter::new(Arc::new(llm(base)));
    assert_eq!(chooser.interpret("show me more", 3).await, Choice::Refine);
}
