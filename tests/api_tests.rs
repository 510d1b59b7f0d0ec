//! API integration tests
//!
//! These run against a live server with a fresh database.
//! Run with: cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Create an equipment record and return its id
async fn create_equipment(client: &Client, quantity: i32) -> i32 {
    let response = client
        .post(format!("{}/equipment", BASE_URL))
        .json(&json!({
            "category_id": 1,
            "name": format!("Test oscilloscope {}", uuid::Uuid::new_v4()),
            "quantity": quantity
        }))
        .send()
        .await
        .expect("Failed to create equipment");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No id in response") as i32
}

/// Submit a pending request for the given equipment
async fn create_request(client: &Client, equipment_id: i32, quantity: i32) -> i32 {
    let response = client
        .post(format!("{}/requests", BASE_URL))
        .json(&json!({
            "equipment_id": equipment_id,
            "requester_id": 1,
            "quantity": quantity
        }))
        .send()
        .await
        .expect("Failed to create request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No id in response") as i32
}

async fn set_status(client: &Client, request_id: i32, status: &str) -> reqwest::Response {
    client
        .post(format!("{}/requests/{}/status", BASE_URL, request_id))
        .json(&json!({ "status": status }))
        .send()
        .await
        .expect("Failed to send status change")
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_readiness_reports_database_connectivity() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
#[ignore]
async fn test_approval_reserves_stock() {
    let client = Client::new();
    let equipment_id = create_equipment(&client, 5).await;
    let request_id = create_request(&client, equipment_id, 3).await;

    let response = set_status(&client, request_id, "approved").await;
    assert!(response.status().is_success());

    let response = client
        .get(format!("{}/equipment/{}/availability", BASE_URL, equipment_id))
        .send()
        .await
        .expect("Failed to fetch availability");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["quantity_borrowed"], 3);
    assert_eq!(body["available"], 2);
}

#[tokio::test]
#[ignore]
async fn test_over_allocation_is_refused() {
    let client = Client::new();
    let equipment_id = create_equipment(&client, 5).await;

    let first = create_request(&client, equipment_id, 3).await;
    assert!(set_status(&client, first, "approved").await.status().is_success());

    let second = create_request(&client, equipment_id, 3).await;
    let response = set_status(&client, second, "approved").await;
    assert_eq!(response.status(), 409);

    let body: Value = response.json().await.expect("Failed to parse response");
    let message = body["message"].as_str().unwrap_or_default();
    assert!(message.contains("requested 3"));
    assert!(message.contains("available 2"));
}

#[tokio::test]
#[ignore]
async fn test_full_lifecycle_with_return() {
    let client = Client::new();
    let equipment_id = create_equipment(&client, 5).await;
    let request_id = create_request(&client, equipment_id, 2).await;

    assert!(set_status(&client, request_id, "approved").await.status().is_success());
    assert!(set_status(&client, request_id, "released").await.status().is_success());

    let response = client
        .post(format!("{}/requests/{}/return", BASE_URL, request_id))
        .json(&json!({ "condition": "damaged", "processed_by": "manager-1" }))
        .send()
        .await
        .expect("Failed to return equipment");
    assert!(response.status().is_success());

    // The request is terminal and gone from the active store.
    let response = client
        .get(format!("{}/requests/{}", BASE_URL, request_id))
        .send()
        .await
        .expect("Failed to fetch request");
    assert_eq!(response.status(), 404);

    // History holds a release and a return entry for it.
    let response = client
        .get(format!("{}/history?request_id={}", BASE_URL, request_id))
        .send()
        .await
        .expect("Failed to fetch history");
    let entries: Vec<Value> = response.json().await.expect("Failed to parse response");
    let types: Vec<&str> = entries
        .iter()
        .filter_map(|e| e["entry_type"].as_str())
        .collect();
    assert!(types.contains(&"release"));
    assert!(types.contains(&"return"));

    let response = client
        .get(format!("{}/equipment/{}/availability", BASE_URL, equipment_id))
        .send()
        .await
        .expect("Failed to fetch availability");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["quantity_borrowed"], 0);
}

#[tokio::test]
#[ignore]
async fn test_invalid_transition_is_refused() {
    let client = Client::new();
    let equipment_id = create_equipment(&client, 5).await;
    let request_id = create_request(&client, equipment_id, 1).await;

    let response = set_status(&client, request_id, "released").await;
    assert_eq!(response.status(), 422);
}
