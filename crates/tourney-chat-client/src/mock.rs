//! Scripted in-memory transport for tests.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use tourney_chat_core::{MessageEvent, OutgoingMessage, RoomId, Token};

use crate::error::TransportError;
use crate::transport::ChatTransport;

/// Replays queued feed responses and records every call.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<Vec<MessageEvent>, TransportError>>>,
    fetches: Mutex<Vec<(RoomId, Token)>>,
    sent: Mutex<Vec<OutgoingMessage>>,
    fail_sends: bool,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose sends always fail.
    pub fn failing_sends() -> Self {
        Self {
            fail_sends: true,
            ..Self::default()
        }
    }

    pub fn push_events(&self, events: Vec<MessageEvent>) {
        self.responses.lock().push_back(Ok(events));
    }

    pub fn push_error(&self, err: TransportError) {
        self.responses.lock().push_back(Err(err));
    }

    pub fn fetches(&self) -> Vec<(RoomId, Token)> {
        self.fetches.lock().clone()
    }

    pub fn sent(&self) -> Vec<OutgoingMessage> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn fetch_since(
        &self,
        room: RoomId,
        since: Token,
    ) -> Result<Vec<MessageEvent>, TransportError> {
        self.fetches.lock().push((room, since));
        self.responses.lock().pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn send(&self, message: &OutgoingMessage) -> Result<(), TransportError> {
        self.sent.lock().push(message.clone());
        if self.fail_sends {
            return Err(TransportError::Api {
                status: 500,
                message: "boom".to_string(),
            });
        }
        Ok(())
    }
}
