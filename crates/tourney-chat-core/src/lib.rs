//! Core types and view reconciliation for tournament chat.
//!
//! This crate provides the pieces of the chat client that do no I/O:
//!
//! - **Identifiers**: [`Token`], [`RoomId`] and [`DisplayName`]
//! - **Wire types**: [`MessageEvent`] as delivered by the feed, and the
//!   request bodies the client sends
//! - **Reconciliation**: [`Reconciler`], which folds an ordered stream of
//!   create/edit/delete events into a [`RenderSurface`]
//!
//! # Example
//!
//! ```
//! use tourney_chat_core::{DisplayName, ListSurface, MessageEvent, Reconciler, Token};
//!
//! let me = DisplayName::new("Alice").unwrap();
//! let mut reconciler = Reconciler::new(me, ListSurface::new());
//!
//! let report = reconciler.apply(&[
//!     MessageEvent::create(Token::new(1), "Alice", "Hi"),
//!     MessageEvent::edit(Token::new(2), Token::new(1), "Alice", "Hi there"),
//! ]);
//!
//! assert_eq!(report.applied, 2);
//! assert_eq!(reconciler.surface().rows()[0].text, "Alice: Hi there");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod event;
pub mod ids;
pub mod reconciler;
pub mod surface;

pub use error::{CoreError, Result};
pub use event::{FeedRequest, MessageEvent, OutgoingMessage, DELETED_PLACEHOLDER};
pub use ids::{DisplayName, IdError, RoomId, Token};
pub use reconciler::{Applied, ApplyReport, ClickOutcome, DisplayedMessage, Reconciler};
pub use surface::{ListSurface, RenderSurface, Row};
