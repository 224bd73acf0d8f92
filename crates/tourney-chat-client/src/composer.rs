//! Outgoing messages.
//!
//! Sends are fire-and-forget. The input is cleared as soon as a send is
//! started, the request runs on its own task, and a failure is only logged.
//! Nothing is shown optimistically: a sent message appears once the feed
//! delivers it back.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tourney_chat_core::{OutgoingMessage, RoomId, Token};

use crate::transport::ChatTransport;

/// Posts new messages and deletes on behalf of the local user.
pub struct Composer<T: ChatTransport + ?Sized> {
    transport: Arc<T>,
    sender_address: String,
    room: RoomId,
}

impl<T: ChatTransport + ?Sized + 'static> Composer<T> {
    /// Create a composer posting as `sender_address` into `room`.
    pub fn new(transport: Arc<T>, sender_address: impl Into<String>, room: RoomId) -> Self {
        Self {
            transport,
            sender_address: sender_address.into(),
            room,
        }
    }

    /// Send the pending input as a new message and clear it.
    ///
    /// Blank input is left untouched and nothing is sent. The returned
    /// handle resolves when the request finishes; callers may drop it.
    pub fn submit(&self, input: &mut String) -> Option<JoinHandle<()>> {
        if input.trim().is_empty() {
            return None;
        }

        let text = std::mem::take(input);
        let message = OutgoingMessage::create(&self.sender_address, text, self.room);
        Some(self.dispatch(message))
    }

    /// Ask the server to delete the message whose current token is `token`.
    pub fn delete(&self, token: Token) -> JoinHandle<()> {
        let message = OutgoingMessage::delete(&self.sender_address, token, self.room);
        self.dispatch(message)
    }

    fn dispatch(&self, message: OutgoingMessage) -> JoinHandle<()> {
        let transport = Arc::clone(&self.transport);
        tokio::spawn(async move {
            if let Err(err) = transport.send(&message).await {
                tracing::warn!(
                    room = %message.tournament,
                    update_on = ?message.update_on,
                    error = %err,
                    "Chat send failed, message dropped"
                );
            }
        })
    }
}
