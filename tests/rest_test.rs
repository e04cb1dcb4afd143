//! Integration tests for the REST surface.
//! Spins up the server on a random port and drives it over HTTP.

use std::sync::Arc;

use serde_json::{json, Value};
use spikescout::config::ServerConfig;
use spikescout::model::{Direction, MessageStatus, MessageType};
use spikescout::storage::NewMessage;
use spikescout::{rest, AppContext};
use tempfile::TempDir;

/// Find a free local port by binding to port 0.
fn find_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// Build an AppContext on a random port and start the server.
async fn start_server(dir: &TempDir) -> (Arc<AppContext>, String) {
    let port = find_free_port();
    let config = ServerConfig::new(
        Some(port),
        Some(dir.path().to_path_buf()),
        Some("error".to_string()),
        None,
    );
    let ctx = AppContext::new(config).await.unwrap();

    let ctx_clone = ctx.clone();
    tokio::spawn(async move {
        let _ = rest::start_rest_server(ctx_clone).await;
    });
    // Give the server a moment to start
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    (ctx, format!("http://127.0.0.1:{port}/api/v1"))
}

async fn post_as(client: &reqwest::Client, url: &str, uid: &str, body: Value) -> Value {
    let resp = client
        .post(url)
        .header("x-user-id", uid)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success(), "POST {url} failed");
    resp.json().await.unwrap()
}

#[tokio::test]
async fn scoped_routes_require_identity() {
    let dir = TempDir::new().unwrap();
    let (_ctx, base) = start_server(&dir).await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/schools")).send().await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);

    // Health stays open.
    let resp = client.get(format!("{base}/health")).send().await.unwrap();
    assert!(resp.status().is_success());
}

#[tokio::test]
async fn threads_response_carries_unread_count() {
    let dir = TempDir::new().unwrap();
    let (ctx, base) = start_server(&dir).await;
    let client = reqwest::Client::new();

    let school = post_as(
        &client,
        &format!("{base}/schools"),
        "u1",
        json!({ "name": "Harborview State", "location": "Portland, ME", "division": "D3" }),
    )
    .await;
    let school_id = school["id"].as_str().unwrap().to_string();
    let coach = post_as(
        &client,
        &format!("{base}/coaches"),
        "u1",
        json!({
            "schoolId": school_id,
            "name": "Riley Nakamura",
            "title": "Head Coach",
            "email": "rn@harborview.edu",
        }),
    )
    .await;
    let coach_id = coach["id"].as_str().unwrap().to_string();

    post_as(
        &client,
        &format!("{base}/messages"),
        "u1",
        json!({ "schoolId": school_id, "coachId": coach_id, "content": "Intro", "type": "email" }),
    )
    .await;
    // A coach's answer lands incoming and unread.
    ctx.storage
        .create_message(
            "u1",
            NewMessage {
                school_id: school_id.clone(),
                coach_id: coach_id.clone(),
                content: "Thanks for reaching out".into(),
                message_type: MessageType::Email,
                direction: Direction::Incoming,
                status: MessageStatus::Unread,
                parent_id: None,
            },
        )
        .await
        .unwrap();

    let body: Value = client
        .get(format!("{base}/schools/{school_id}/threads"))
        .header("x-user-id", "u1")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["threads"].as_array().unwrap().len(), 2);
    assert_eq!(body["unreadCount"], 1);
    assert_eq!(body["orphanCount"], 0);
}

#[tokio::test]
async fn snapshot_serves_from_cache_until_logout() {
    let dir = TempDir::new().unwrap();
    let (_ctx, base) = start_server(&dir).await;
    let client = reqwest::Client::new();

    let school = post_as(
        &client,
        &format!("{base}/schools"),
        "u1",
        json!({ "name": "Crestwood University", "location": "Austin, TX", "division": "D1" }),
    )
    .await;
    let school_id = school["id"].as_str().unwrap().to_string();

    // No fetch has happened yet, so there is nothing cached.
    let resp = client
        .get(format!("{base}/schools/{school_id}/threads/snapshot"))
        .header("x-user-id", "u1")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);

    // A full fetch installs the snapshot.
    let resp = client
        .get(format!("{base}/schools/{school_id}/threads"))
        .header("x-user-id", "u1")
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());

    let body: Value = client
        .get(format!("{base}/schools/{school_id}/threads/snapshot"))
        .header("x-user-id", "u1")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(body["fetchedAt"].is_string());
    assert!(body["threads"].is_array());

    // Another user never sees it.
    let resp = client
        .get(format!("{base}/schools/{school_id}/threads/snapshot"))
        .header("x-user-id", "u2")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);

    // Logout tears the cache down.
    let body = post_as(&client, &format!("{base}/session/logout"), "u1", json!({})).await;
    assert_eq!(body["loggedOut"], true);
    let resp = client
        .get(format!("{base}/schools/{school_id}/threads/snapshot"))
        .header("x-user-id", "u1")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
}
