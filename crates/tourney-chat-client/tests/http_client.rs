//! HTTP transport tests against a mock chat server.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::json;
use tourney_chat_client::{
    ChatConfig, ChatTransport, Composer, HttpChatClient, PollOutcome, Poller, TransportError,
};
use tourney_chat_core::{DisplayName, ListSurface, OutgoingMessage, Reconciler, RoomId, Token};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FEED_PATH: &str = "/api/tournaments/chat/feed/";
const SEND_PATH: &str = "/api/tournaments/chat/";

fn config(server: &MockServer) -> ChatConfig {
    let mut config = ChatConfig::new(server.uri(), "7", "Alice");
    config.csrf_token = Some("csrf-abc".to_string());
    config.sender_address = Some("alice@example.com".to_string());
    config
}

#[tokio::test]
async fn fetch_posts_cursor_and_decodes_events() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(FEED_PATH))
        .and(header("x-csrftoken", "csrf-abc"))
        .and(body_json(json!({ "token_id": 2, "tournament": 7 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "token_id": 3, "update_on": null, "content": "gg", "sender": "Bob" },
            { "token_id": 4, "update_on": 3, "content": null, "sender": "Bob" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpChatClient::new(&config(&server)).unwrap();
    let events = client
        .fetch_since(RoomId::new(7), Token::new(2))
        .await
        .unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].content.as_deref(), Some("gg"));
    assert_eq!(events[1].update_on, Some(Token::new(3)));
    assert!(events[1].is_delete());
}

#[tokio::test]
async fn fetch_reports_api_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(FEED_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": "Chat matching query does not exist."
        })))
        .mount(&server)
        .await;

    let client = HttpChatClient::new(&config(&server)).unwrap();
    let err = client
        .fetch_since(RoomId::new(7), Token::ZERO)
        .await
        .unwrap_err();

    match err {
        TransportError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "Chat matching query does not exist.");
        }
        other => panic!("Expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn fetch_rejects_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(FEED_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let client = HttpChatClient::new(&config(&server)).unwrap();
    let err = client
        .fetch_since(RoomId::new(7), Token::ZERO)
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::Parse(_)));
}

#[tokio::test]
async fn send_posts_explicit_nulls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .and(header("x-csrftoken", "csrf-abc"))
        .and(body_json(json!({
            "sender": "alice@example.com",
            "content": null,
            "update_on": 12,
            "tournament": 7
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpChatClient::new(&config(&server)).unwrap();
    client
        .send(&OutgoingMessage::delete(
            "alice@example.com",
            Token::new(12),
            RoomId::new(7),
        ))
        .await
        .unwrap();
}

#[tokio::test]
async fn composer_and_poller_round_trip_through_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .and(body_json(json!({
            "sender": "alice@example.com",
            "content": "hello room",
            "update_on": null,
            "tournament": 7
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(FEED_PATH))
        .and(body_json(json!({ "token_id": 0, "tournament": 7 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "token_id": 1, "update_on": null, "content": "hello room", "sender": "Alice" }
        ])))
        .mount(&server)
        .await;

    let config = config(&server);
    let settings = config.validate().unwrap();
    let transport = Arc::new(HttpChatClient::new(&config).unwrap());

    let composer = Composer::new(transport.clone(), settings.sender_address, settings.room);
    let mut input = "hello room".to_string();
    composer.submit(&mut input).unwrap().await.unwrap();
    assert!(input.is_empty());

    let reconciler = Arc::new(Mutex::new(Reconciler::new(
        DisplayName::new("Alice").unwrap(),
        ListSurface::new(),
    )));
    let mut poller = Poller::new(
        transport,
        settings.room,
        reconciler.clone(),
        Duration::from_secs(2),
    );

    assert!(matches!(poller.poll_once().await, PollOutcome::Applied(_)));
    assert_eq!(poller.high_water(), Token::new(1));

    let reconciler = reconciler.lock();
    let row = &reconciler.surface().rows()[0];
    assert_eq!(row.text, "Alice: hello room");
    assert!(row.interactive);
}

#[tokio::test]
async fn poll_against_unreachable_server_fails_quietly() {
    let mut config = ChatConfig::new("http://127.0.0.1:9", "7", "Alice");
    config.request_timeout_seconds = 1;
    let transport = Arc::new(HttpChatClient::new(&config).unwrap());
    let reconciler = Arc::new(Mutex::new(Reconciler::new(
        DisplayName::new("Alice").unwrap(),
        ListSurface::new(),
    )));
    let mut poller = Poller::new(
        transport,
        RoomId::new(7),
        reconciler.clone(),
        Duration::from_secs(2),
    );

    assert_eq!(poller.poll_once().await, PollOutcome::Failed);
    assert_eq!(poller.high_water(), Token::ZERO);
    assert_eq!(reconciler.lock().surface().mutations(), 0);
}
