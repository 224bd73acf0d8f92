//! Wire types for the chat feed and send endpoints.
//!
//! These types mirror the JSON bodies exchanged with the tournament chat API.

use serde::{Deserialize, Serialize};

use crate::ids::{RoomId, Token};

/// Text shown in place of the content of a deleted message.
pub const DELETED_PLACEHOLDER: &str = "Message Deleted";

// =============================================================================
// Feed
// =============================================================================

/// A single event from the chat feed.
///
/// An event with no `update_on` introduces a new message. An event with an
/// `update_on` supersedes the event carrying that token: an edit when
/// `content` is present, a delete when it is null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEvent {
    /// Server-assigned token, strictly increasing.
    pub token_id: Token,
    /// Token of the event this one supersedes.
    #[serde(default)]
    pub update_on: Option<Token>,
    /// Message text, or null for a delete.
    #[serde(default)]
    pub content: Option<String>,
    /// Display name of the author of this event.
    pub sender: String,
}

impl MessageEvent {
    /// Build a create event.
    #[must_use]
    pub fn create(token: Token, sender: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            token_id: token,
            update_on: None,
            content: Some(content.into()),
            sender: sender.into(),
        }
    }

    /// Build an edit event.
    #[must_use]
    pub fn edit(
        token: Token,
        update_on: Token,
        sender: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            token_id: token,
            update_on: Some(update_on),
            content: Some(content.into()),
            sender: sender.into(),
        }
    }

    /// Build a delete event.
    #[must_use]
    pub fn delete(token: Token, update_on: Token, sender: impl Into<String>) -> Self {
        Self {
            token_id: token,
            update_on: Some(update_on),
            content: None,
            sender: sender.into(),
        }
    }

    /// Whether this event introduces a new message.
    #[must_use]
    pub const fn is_create(&self) -> bool {
        self.update_on.is_none()
    }

    /// Whether this event marks its message deleted.
    #[must_use]
    pub const fn is_delete(&self) -> bool {
        self.content.is_none()
    }

    /// The text to display for this event.
    #[must_use]
    pub fn rendered_text(&self) -> String {
        match &self.content {
            Some(content) => format!("{}: {}", self.sender, content),
            None => format!("{}: {}", self.sender, DELETED_PLACEHOLDER),
        }
    }
}

/// Request body for the feed endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedRequest {
    /// Highest token already applied.
    pub token_id: Token,
    /// Room to read from.
    pub tournament: RoomId,
}

// =============================================================================
// Send
// =============================================================================

/// Request body for the send endpoint, used for both new messages and
/// deletes.
///
/// `content` and `update_on` are always serialized, as `null` when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    /// Sender address of the local user.
    pub sender: String,
    /// Message text, or null for a delete.
    pub content: Option<String>,
    /// Token being superseded, or null for a new message.
    pub update_on: Option<Token>,
    /// Room to post into.
    pub tournament: RoomId,
}

impl OutgoingMessage {
    /// A new message.
    #[must_use]
    pub fn create(sender: impl Into<String>, text: impl Into<String>, room: RoomId) -> Self {
        Self {
            sender: sender.into(),
            content: Some(text.into()),
            update_on: None,
            tournament: room,
        }
    }

    /// A delete of the message whose current token is `token`.
    #[must_use]
    pub fn delete(sender: impl Into<String>, token: Token, room: RoomId) -> Self {
        Self {
            sender: sender.into(),
            content: None,
            update_on: Some(token),
            tournament: room,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_event_deserializes_with_nulls() {
        let json = r#"[
            {"token_id":1,"update_on":null,"content":"Hi","sender":"A"},
            {"token_id":3,"update_on":2,"content":null,"sender":"A"}
        ]"#;
        let events: Vec<MessageEvent> = serde_json::from_str(json).unwrap();

        assert_eq!(events[0], MessageEvent::create(Token::new(1), "A", "Hi"));
        assert!(events[0].is_create());
        assert_eq!(events[1], MessageEvent::delete(Token::new(3), Token::new(2), "A"));
        assert!(events[1].is_delete());
    }

    #[test]
    fn feed_event_tolerates_missing_optional_fields() {
        let json = r#"{"token_id":5,"content":"hello","sender":"Bob"}"#;
        let event: MessageEvent = serde_json::from_str(json).unwrap();

        assert_eq!(event.update_on, None);
        assert!(event.is_create());
    }

    #[test]
    fn rendered_text_for_content_and_delete() {
        let edit = MessageEvent::edit(Token::new(2), Token::new(1), "A", "Hi there");
        assert_eq!(edit.rendered_text(), "A: Hi there");

        let delete = MessageEvent::delete(Token::new(3), Token::new(2), "A");
        assert_eq!(delete.rendered_text(), "A: Message Deleted");
    }

    #[test]
    fn feed_request_serializes_correctly() {
        let request = FeedRequest {
            token_id: Token::new(9),
            tournament: RoomId::new(4),
        };
        let parsed: serde_json::Value = serde_json::to_value(request).unwrap();

        assert_eq!(parsed["token_id"], 9);
        assert_eq!(parsed["tournament"], 4);
    }

    #[test]
    fn outgoing_create_keeps_explicit_null_update_on() {
        let msg = OutgoingMessage::create("alice@example.com", "gg", RoomId::new(3));
        let parsed: serde_json::Value = serde_json::to_value(&msg).unwrap();

        assert_eq!(parsed["sender"], "alice@example.com");
        assert_eq!(parsed["content"], "gg");
        assert!(parsed["update_on"].is_null());
        assert!(parsed.as_object().unwrap().contains_key("update_on"));
        assert_eq!(parsed["tournament"], 3);
    }

    #[test]
    fn outgoing_delete_has_null_content() {
        let msg = OutgoingMessage::delete("alice@example.com", Token::new(12), RoomId::new(3));
        let parsed: serde_json::Value = serde_json::to_value(&msg).unwrap();

        assert!(parsed["content"].is_null());
        assert!(parsed.as_object().unwrap().contains_key("content"));
        assert_eq!(parsed["update_on"], 12);
    }
}
