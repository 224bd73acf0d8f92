//! Client configuration.
//!
//! [`ChatConfig`] is the raw, deserializable form handed over by the host
//! (command line, environment). [`ChatConfig::validate`] turns it into typed
//! [`ChatSettings`] once at startup; nothing is polled or sent with an
//! invalid identity or room.

use std::time::Duration;

use reqwest::header::HeaderValue;
use serde::Deserialize;
use tourney_chat_core::{DisplayName, RoomId};

use crate::error::ConfigError;

/// Configuration for the chat client.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Server base URL (e.g., "http://127.0.0.1:8000").
    pub base_url: String,

    /// Path of the feed endpoint.
    #[serde(default = "ChatConfig::default_feed_path")]
    pub feed_path: String,

    /// Path of the send endpoint.
    #[serde(default = "ChatConfig::default_send_path")]
    pub send_path: String,

    /// Room (tournament id) to join.
    pub room: String,

    /// Display name of the local user, as the feed reports it.
    pub display_name: String,

    /// Address sent as `sender` on outgoing messages. Defaults to the
    /// display name.
    #[serde(default)]
    pub sender_address: Option<String>,

    /// CSRF token forwarded as `X-CSRFToken`.
    #[serde(default)]
    pub csrf_token: Option<String>,

    /// Feed poll period in milliseconds.
    #[serde(default = "ChatConfig::default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Per-request timeout in seconds.
    #[serde(default = "ChatConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
}

/// Validated identity and room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSettings {
    /// Room to poll and post into.
    pub room: RoomId,
    /// Local display name, used for ownership.
    pub display_name: DisplayName,
    /// Outgoing `sender` value.
    pub sender_address: String,
}

impl ChatConfig {
    /// Create a configuration with default paths and timings.
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        room: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            feed_path: Self::default_feed_path(),
            send_path: Self::default_send_path(),
            room: room.into(),
            display_name: display_name.into(),
            sender_address: None,
            csrf_token: None,
            poll_interval_ms: Self::default_poll_interval(),
            request_timeout_seconds: Self::default_request_timeout(),
        }
    }

    fn default_feed_path() -> String {
        "/api/tournaments/chat/feed/".to_string()
    }

    fn default_send_path() -> String {
        "/api/tournaments/chat/".to_string()
    }

    const fn default_poll_interval() -> u64 {
        2000
    }

    const fn default_request_timeout() -> u64 {
        10
    }

    /// Check the configuration and parse the identity and room.
    ///
    /// # Errors
    ///
    /// Returns an error if the room is not an integer, the display name or
    /// sender address is blank, the base URL is not http(s), the poll
    /// interval is zero, or the CSRF token is not a valid header value.
    pub fn validate(&self) -> Result<ChatSettings, ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(self.base_url.clone()));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        if let Some(token) = &self.csrf_token {
            HeaderValue::from_str(token).map_err(|_| ConfigError::InvalidCsrfToken)?;
        }

        let room: RoomId = self.room.parse()?;
        let display_name = DisplayName::new(&self.display_name)?;
        let sender_address = match self.sender_address.as_deref().map(str::trim) {
            Some("") => {
                return Err(tourney_chat_core::IdError::Empty {
                    field: "sender address",
                }
                .into())
            }
            Some(address) => address.to_string(),
            None => display_name.as_str().to_string(),
        };

        Ok(ChatSettings {
            room,
            display_name,
            sender_address,
        })
    }

    /// Full URL of the feed endpoint.
    #[must_use]
    pub fn feed_url(&self) -> String {
        join_url(&self.base_url, &self.feed_path)
    }

    /// Full URL of the send endpoint.
    #[must_use]
    pub fn send_url(&self) -> String {
        join_url(&self.base_url, &self.send_path)
    }

    /// Get the poll interval as a `Duration`.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Get the request timeout as a `Duration`.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
