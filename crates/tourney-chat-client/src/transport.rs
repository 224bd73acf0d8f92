//! Transport to the chat API.
//!
//! The [`ChatTransport`] trait is the seam between the poller/composer and
//! the network, so both can be driven by an in-memory double in tests.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde::Deserialize;
use tourney_chat_core::{FeedRequest, MessageEvent, OutgoingMessage, RoomId, Token};

use crate::config::ChatConfig;
use crate::error::TransportError;

/// Header carrying the cross-site request forgery token (`X-CSRFToken`).
pub const CSRF_HEADER: &str = "x-csrftoken";

/// Connect timeout applied on top of the per-request timeout.
const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Access to the chat API.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Fetch every event in `room` with a token greater than `since`,
    /// ascending by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response is malformed.
    async fn fetch_since(
        &self,
        room: RoomId,
        since: Token,
    ) -> Result<Vec<MessageEvent>, TransportError>;

    /// Post a new message or a delete.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    async fn send(&self, message: &OutgoingMessage) -> Result<(), TransportError>;
}

/// Error body returned by the API.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: String,
}

/// HTTP client for the chat API.
#[derive(Debug, Clone)]
pub struct HttpChatClient {
    client: Client,
    feed_url: String,
    send_url: String,
    csrf_token: Option<HeaderValue>,
}

impl HttpChatClient {
    /// Create a client from a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the CSRF token is not a valid header value or the
    /// HTTP client cannot be built.
    pub fn new(config: &ChatConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(std::time::Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;

        Self::with_client(client, config)
    }

    /// Create a client with a custom reqwest client.
    ///
    /// # Errors
    ///
    /// Returns an error if the CSRF token is not a valid header value.
    pub fn with_client(client: Client, config: &ChatConfig) -> Result<Self, TransportError> {
        let csrf_token = config
            .csrf_token
            .as_deref()
            .map(HeaderValue::from_str)
            .transpose()
            .map_err(|_| TransportError::InvalidHeader(CSRF_HEADER))?;

        Ok(Self {
            client,
            feed_url: config.feed_url(),
            send_url: config.send_url(),
            csrf_token,
        })
    }

    /// URL polled for new events.
    #[must_use]
    pub fn feed_url(&self) -> &str {
        &self.feed_url
    }

    /// URL messages are posted to.
    #[must_use]
    pub fn send_url(&self) -> &str {
        &self.send_url
    }

    /// Build headers for JSON requests.
    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(token) = &self.csrf_token {
            headers.insert(CSRF_HEADER, token.clone());
        }
        headers
    }

    /// Handle API error responses.
    async fn handle_error(response: reqwest::Response) -> TransportError {
        let status = response.status().as_u16();
        let message = match response.json::<ApiErrorResponse>().await {
            Ok(err) => err.error,
            Err(_) => "Unknown error".to_string(),
        };
        TransportError::Api { status, message }
    }
}

#[async_trait]
impl ChatTransport for HttpChatClient {
    async fn fetch_since(
        &self,
        room: RoomId,
        since: Token,
    ) -> Result<Vec<MessageEvent>, TransportError> {
        let request = FeedRequest {
            token_id: since,
            tournament: room,
        };

        let response = self
            .client
            .post(&self.feed_url)
            .headers(self.headers())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::handle_error(response).await);
        }

        let events: Vec<MessageEvent> = response
            .json()
            .await
            .map_err(|e| TransportError::Parse(e.to_string()))?;

        tracing::trace!(room = %room, since = %since, count = events.len(), "Fetched chat feed");
        Ok(events)
    }

    async fn send(&self, message: &OutgoingMessage) -> Result<(), TransportError> {
        let response = self
            .client
            .post(&self.send_url)
            .headers(self.headers())
            .json(message)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::handle_error(response).await);
        }

        tracing::debug!(
            room = %message.tournament,
            update_on = ?message.update_on,
            delete = message.content.is_none(),
            "Posted chat message"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_uses_configured_urls() {
        let config = ChatConfig::new("http://localhost:8000", "1", "Alice");
        let client = HttpChatClient::new(&config).unwrap();

        assert_eq!(
            client.feed_url(),
            "http://localhost:8000/api/tournaments/chat/feed/"
        );
        assert_eq!(client.send_url(), "http://localhost:8000/api/tournaments/chat/");
    }

    #[test]
    fn csrf_header_is_added_when_configured() {
        let mut config = ChatConfig::new("http://localhost:8000", "1", "Alice");
        config.csrf_token = Some("abc123".to_string());
        let client = HttpChatClient::new(&config).unwrap();

        let headers = client.headers();
        assert_eq!(headers.get(CSRF_HEADER).unwrap(), "abc123");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn invalid_csrf_token_is_rejected() {
        let mut config = ChatConfig::new("http://localhost:8000", "1", "Alice");
        config.csrf_token = Some("bad\ntoken".to_string());

        assert!(matches!(
            HttpChatClient::new(&config),
            Err(TransportError::InvalidHeader(CSRF_HEADER))
        ));
    }
}
