//! Common error types for tournament chat.

use crate::ids::Token;
use thiserror::Error;

/// A result type using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while reconciling feed events.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// An edit or delete names a token that was never applied locally.
    #[error("event {token} updates unknown token {update_on}")]
    DanglingReference {
        /// Token of the offending event.
        token: Token,
        /// The token it tried to supersede.
        update_on: Token,
    },

    /// An invalid identifier was provided.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] crate::ids::IdError),
}
