//! API integration tests against a running server

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:9090";
const USER_HEADER: &str = "X-Sharer-User-Id";

/// Helper to register a user and return its id
async fn create_user(client: &Client, name: &str) -> i64 {
    let response = client
        .post(format!("{}/users", BASE_URL))
        .json(&json!({
            "name": name,
            "email": format!("{}-{}@example.com", name, std::process::id())
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No id in response")
}

/// Helper to share an item and return its id
async fn create_item(client: &Client, owner: i64) -> i64 {
    let response = client
        .post(format!("{}/items", BASE_URL))
        .header(USER_HEADER, owner)
        .json(&json!({
            "name": "Ladder",
            "description": "Three meters",
            "available": true
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No id in response")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
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
async fn test_booking_lifecycle() {
    let client = Client::new();
    let owner = create_user(&client, "owner").await;
    let booker = create_user(&client, "booker").await;
    let item = create_item(&client, owner).await;

    let response = client
        .post(format!("{}/bookings", BASE_URL))
        .header(USER_HEADER, booker)
        .json(&json!({
            "itemId": item,
            "start": "2099-05-01T10:00:00",
            "end": "2099-05-03T10:00:00"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let booking: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(booking["status"], "WAITING");
    let id = booking["id"].as_i64().expect("No id in response");

    let response = client
        .patch(format!("{}/bookings/{}?approved=false", BASE_URL, id))
        .header(USER_HEADER, owner)
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let booking: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(booking["status"], "REJECTED");

    let response = client
        .get(format!("{}/bookings?state=REJECTED", BASE_URL))
        .header(USER_HEADER, booker)
        .send()
        .await
        .expect("Failed to send request");

    let bookings: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(bookings.as_array().map(|b| b.len()), Some(1));
}

#[tokio::test]
#[ignore]
async fn test_owner_cannot_book_own_item() {
    let client = Client::new();
    let owner = create_user(&client, "self-booker").await;
    let item = create_item(&client, owner).await;

    let response = client
        .post(format!("{}/bookings", BASE_URL))
        .header(USER_HEADER, owner)
        .json(&json!({
            "itemId": item,
            "start": "2099-05-01T10:00:00",
            "end": "2099-05-03T10:00:00"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_unknown_state() {
    let client = Client::new();
    let booker = create_user(&client, "lister").await;

    let response = client
        .get(format!("{}/bookings/owner?state=SOON", BASE_URL))
        .header(USER_HEADER, booker)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Unknown state: SOON");
}

/// Helper to request a booking starting `lead` seconds from now
async fn create_booking(client: &Client, booker: i64, item: i64, lead: i64, hours: i64) -> i64 {
    let start = chrono::Utc::now().naive_utc() + chrono::Duration::seconds(lead);
    let end = start + chrono::Duration::hours(hours);
    let response = client
        .post(format!("{}/bookings", BASE_URL))
        .header(USER_HEADER, booker)
        .json(&json!({
            "itemId": item,
            "start": start.format("%Y-%m-%dT%H:%M:%S").to_string(),
            "end": end.format("%Y-%m-%dT%H:%M:%S").to_string()
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    body["id"].as_i64().expect("No id in response")
}

#[tokio::test]
#[ignore]
async fn test_owner_current_bookings() {
    let client = Client::new();
    let owner = create_user(&client, "current-owner").await;
    let booker = create_user(&client, "current-booker").await;
    let item = create_item(&client, owner).await;
    let id = create_booking(&client, booker, item, 2, 1).await;

    let response = client
        .patch(format!("{}/bookings/{}?approved=true", BASE_URL, id))
        .header(USER_HEADER, owner)
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    tokio::time::sleep(std::time::Duration::from_secs(3)).await;

    let response = client
        .get(format!("{}/bookings/owner?state=CURRENT", BASE_URL))
        .header(USER_HEADER, owner)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 200);
    let bookings: Value = response.json().await.expect("Failed to parse response");
    let ids: Vec<i64> = bookings
        .as_array()
        .expect("Expected an array")
        .iter()
        .filter_map(|b| b["id"].as_i64())
        .collect();
    assert_eq!(ids, vec![id]);
    assert_eq!(bookings[0]["status"], "APPROVED");

    let response = client
        .get(format!("{}/bookings/owner?state=FUTURE", BASE_URL))
        .header(USER_HEADER, owner)
        .send()
        .await
        .expect("Failed to send request");
    let bookings: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(bookings.as_array().map(|b| b.len()), Some(0));
}

#[tokio::test]
#[ignore]
async fn test_concurrent_decisions() {
    let client = Client::new();
    let owner = create_user(&client, "racing-owner").await;
    let booker = create_user(&client, "racing-booker").await;
    let item = create_item(&client, owner).await;
    let id = create_booking(&client, booker, item, 3600, 2).await;

    let approve = client
        .patch(format!("{}/bookings/{}?approved=true", BASE_URL, id))
        .header(USER_HEADER, owner)
        .send();
    let reject = client
        .patch(format!("{}/bookings/{}?approved=false", BASE_URL, id))
        .header(USER_HEADER, owner)
        .send();
    let (approve, reject) = tokio::join!(approve, reject);

    let mut statuses = vec![
        approve.expect("Failed to send request").status().as_u16(),
        reject.expect("Failed to send request").status().as_u16(),
    ];
    statuses.sort_unstable();
    assert_eq!(statuses, vec![200, 400]);
}
