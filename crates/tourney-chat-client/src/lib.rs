//! Client side of tournament chat.
//!
//! This crate wires the reconciler from `tourney-chat-core` to the chat API:
//!
//! ```text
//!   server ──feed──▶ Poller ──batch──▶ Reconciler ──▶ RenderSurface
//!     ▲
//!     └────send──── Composer ◀── input / delete button
//! ```
//!
//! Receipt and send are decoupled: a message the user sends only shows up
//! once it comes back through the feed.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use parking_lot::Mutex;
//! use tourney_chat_client::{ChatConfig, Composer, HttpChatClient, Poller};
//! use tourney_chat_core::{ListSurface, Reconciler};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ChatConfig::new("http://127.0.0.1:8000", "7", "Alice");
//! let settings = config.validate()?;
//!
//! let transport = Arc::new(HttpChatClient::new(&config)?);
//! let reconciler = Arc::new(Mutex::new(Reconciler::new(
//!     settings.display_name.clone(),
//!     ListSurface::new(),
//! )));
//!
//! let poller = Poller::new(transport.clone(), settings.room, reconciler, config.poll_interval());
//! let handle = poller.spawn();
//!
//! let composer = Composer::new(transport, settings.sender_address.clone(), settings.room);
//! let mut input = String::from("good game!");
//! composer.submit(&mut input);
//!
//! let last_token = handle.stop().await;
//! println!("stopped at token {last_token}");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod composer;
pub mod config;
pub mod error;
pub mod poller;
pub mod transport;

#[cfg(test)]
mod mock;

pub use composer::Composer;
pub use config::{ChatConfig, ChatSettings};
pub use error::{ConfigError, TransportError};
pub use poller::{PollOutcome, Poller, PollerHandle, SharedReconciler};
pub use transport::{ChatTransport, HttpChatClient};
