/// In-process tests for the listing tool routes

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn post_tool(tool: &str, body: Value) -> (StatusCode, Value) {
    let response = listing_server::router()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/tools/{}", tool))
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_list_tools_names_every_provider_operation() {
    let response = listing_server::router()
        .oneshot(Request::builder().uri("/tools").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    let names: Vec<&str> = body["tools"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["name"].as_str())
        .collect();
    assert_eq!(names, vec!["search-listings", "book-listing", "create-calendar-event"]);
}

#[tokio::test]
async fn test_search_returns_ranked_listings() {
    let (status, body) = post_tool(
        "search-listings",
        json!({"city": "Lisbon", "date_from": "2025-06-01", "date_to": "2025-06-05", "adults": 2}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["error"].is_null());
    let listings = body["data"].as_array().unwrap();
    assert!(!listings.is_empty());
    assert!(listings[0]["url"].as_str().unwrap().starts_with("https://"));
}

#[tokio::test]
async fn test_search_rejects_zero_adults() {
    let (status, body) = post_tool(
        "search-listings",
        json!({"city": "Lisbon", "date_from": "2025-06-01", "date_to": "2025-06-05", "adults": 0}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("adults"));
}

#[tokio::test]
async fn test_book_listing_confirms() {
    let (status, body) = post_tool(
        "book-listing",
        json!({
            "listing_url": "https://stays.example.com/rooms/2",
            "date_from": "2025-06-01",
            "date_to": "2025-06-05",
            "adults": 2,
            "children": 1
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "confirmed");
}

#[tokio::test]
async fn test_calendar_event_requires_summary() {
    let (status, body) = post_tool(
        "create-calendar-event",
        json!({"summary": " ", "start_time": "2025-06-01T09:00:00", "end_time": "2025-06-05T11:00:00"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("summary"));
}

#[tokio::test]
async fn test_calendar_event_returns_handle() {
    let (status, body) = post_tool(
        "create-calendar-event",
        json!({
            "summary": "Stay: Spacious Loft with a View",
            "start_time": "2025-06-01T09:00:00",
            "end_time": "2025-06-05T11:00:00"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_str().unwrap().starts_with("evt_"));
}
