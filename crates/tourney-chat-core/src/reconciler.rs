//! Incremental view reconciliation.
//!
//! The [`Reconciler`] owns the mapping from logical message to rendered node
//! and folds ordered feed events into its [`RenderSurface`]:
//!
//! - an event without `update_on` creates a node
//! - an event with `update_on` rewrites the node of the message it
//!   supersedes and re-keys it to the new token
//! - a token that was already applied is a no-op, so re-delivered or
//!   overlapping batches converge to the same view
//!
//! It also carries the click-to-delete interaction: at most one owned,
//! non-deleted message is selected at a time, and pressing its delete
//! button hands back the token the delete request must name.

use std::collections::HashMap;

use crate::error::{CoreError, Result};
use crate::event::MessageEvent;
use crate::ids::{DisplayName, Token};
use crate::surface::RenderSurface;

/// A message as currently shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayedMessage<H> {
    /// Token of the event that introduced the message.
    pub founding_token: Token,
    /// Token of the latest event applied to the message.
    pub current_token: Token,
    /// Sender of the founding event.
    pub original_owner: String,
    /// Text currently rendered.
    pub rendered_text: String,
    /// Whether the latest event was a delete.
    pub deleted: bool,
    /// Whether the local user may select it for deletion.
    pub interactive: bool,
    /// Node on the render surface.
    pub handle: H,
}

/// What [`Reconciler::apply_event`] did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// A new node was created.
    Created,
    /// An existing node was rewritten and re-keyed.
    Updated,
    /// The token had already been applied.
    Duplicate,
    /// The event targets a message that already moved past its token.
    Stale,
}

/// Summary of one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Events that created or updated a node.
    pub applied: usize,
    /// Duplicate or stale events.
    pub skipped: usize,
    /// Events whose `update_on` could not be resolved.
    pub dangling: Vec<CoreError>,
    /// Highest token in the batch, resolved or not.
    pub last_token: Option<Token>,
}

impl ApplyReport {
    /// Whether the batch contained no events.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.last_token.is_none()
    }
}

/// Result of clicking a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The message is now the selection; its current token is attached.
    Selected(Token),
    /// The message is not owned by the local user, is deleted, or unknown.
    Ignored,
}

/// Folds feed events into a render surface.
#[derive(Debug)]
pub struct Reconciler<S: RenderSurface> {
    local: DisplayName,
    surface: S,
    /// Messages in display order.
    messages: Vec<DisplayedMessage<S::Handle>>,
    /// Every applied token, mapped to the message it belongs to.
    history: HashMap<Token, usize>,
    selected: Option<usize>,
}

impl<S: RenderSurface> Reconciler<S> {
    /// Create a reconciler drawing into `surface` on behalf of `local`.
    #[must_use]
    pub fn new(local: DisplayName, surface: S) -> Self {
        Self {
            local,
            surface,
            messages: Vec::new(),
            history: HashMap::new(),
            selected: None,
        }
    }

    /// Apply a batch of events in the given order.
    ///
    /// Unresolvable events are logged and skipped; the rest of the batch
    /// still applies. The surface is scrolled to the bottom when at least
    /// one event created or updated a node.
    pub fn apply(&mut self, events: &[MessageEvent]) -> ApplyReport {
        let mut report = ApplyReport::default();

        for event in events {
            report.last_token = report.last_token.max(Some(event.token_id));
            match self.apply_event(event) {
                Ok(Applied::Created | Applied::Updated) => report.applied += 1,
                Ok(Applied::Duplicate | Applied::Stale) => report.skipped += 1,
                Err(err) => {
                    tracing::warn!(
                        token = %event.token_id,
                        update_on = ?event.update_on,
                        error = %err,
                        "Skipping unresolvable chat event"
                    );
                    report.dangling.push(err);
                }
            }
        }

        if report.applied > 0 {
            self.surface.scroll_to_bottom();
        }

        report
    }

    /// Apply a single event.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::DanglingReference`] if the event's `update_on`
    /// names a token that was never applied.
    pub fn apply_event(&mut self, event: &MessageEvent) -> Result<Applied> {
        let token = event.token_id;
        if self.history.contains_key(&token) {
            tracing::trace!(token = %token, "Ignoring re-delivered chat event");
            return Ok(Applied::Duplicate);
        }

        let Some(update_on) = event.update_on else {
            self.create(event);
            return Ok(Applied::Created);
        };

        let idx = *self
            .history
            .get(&update_on)
            .ok_or(CoreError::DanglingReference { token, update_on })?;
        self.history.insert(token, idx);

        let msg = &mut self.messages[idx];
        if token <= msg.current_token {
            tracing::debug!(
                token = %token,
                current = %msg.current_token,
                "Chat event is older than the message it updates"
            );
            return Ok(Applied::Stale);
        }

        let deleted = event.is_delete();
        let interactive = !deleted && self.local.is(&msg.original_owner);
        msg.current_token = token;
        msg.rendered_text = event.rendered_text();
        msg.deleted = deleted;
        msg.interactive = interactive;

        let handle = msg.handle;
        self.surface.set_text(handle, &msg.rendered_text);
        self.surface.set_interactive(handle, interactive);

        if !interactive && self.selected == Some(idx) {
            self.clear_selection();
        }

        tracing::debug!(token = %token, update_on = %update_on, deleted, "Updated chat message");
        Ok(Applied::Updated)
    }

    fn create(&mut self, event: &MessageEvent) {
        let interactive = !event.is_delete() && self.local.is(&event.sender);
        let rendered_text = event.rendered_text();
        let handle = self.surface.create_node(&rendered_text, interactive);

        self.history.insert(event.token_id, self.messages.len());
        self.messages.push(DisplayedMessage {
            founding_token: event.token_id,
            current_token: event.token_id,
            original_owner: event.sender.clone(),
            rendered_text,
            deleted: event.is_delete(),
            interactive,
            handle,
        });

        tracing::debug!(token = %event.token_id, sender = %event.sender, "Created chat message");
    }

    // =========================================================================
    // Click-to-delete
    // =========================================================================

    /// Handle a click on the node behind `handle`.
    ///
    /// Clicking an interactive node selects it, deselecting any other node
    /// first. Clicks on other nodes change nothing.
    pub fn click(&mut self, handle: S::Handle) -> ClickOutcome {
        let Some(idx) = self.messages.iter().position(|m| m.handle == handle) else {
            return ClickOutcome::Ignored;
        };
        if !self.messages[idx].interactive {
            return ClickOutcome::Ignored;
        }

        if self.selected != Some(idx) {
            self.clear_selection();
            self.surface.set_highlighted(handle, true);
            self.surface.attach_delete_button(handle);
            self.selected = Some(idx);
        }

        ClickOutcome::Selected(self.messages[idx].current_token)
    }

    /// Press the delete button of the selected node.
    ///
    /// Returns the token the delete request must name. The node returns to
    /// idle and stops being interactive; the deleted text only appears once
    /// the delete comes back through the feed.
    pub fn press_delete(&mut self) -> Option<Token> {
        let idx = self.selected.take()?;
        let msg = &mut self.messages[idx];
        msg.interactive = false;

        let handle = msg.handle;
        let token = msg.current_token;
        self.surface.set_highlighted(handle, false);
        self.surface.detach_delete_button(handle);
        self.surface.set_interactive(handle, false);

        tracing::debug!(token = %token, "Delete requested for chat message");
        Some(token)
    }

    /// Return the selected node, if any, to idle.
    pub fn clear_selection(&mut self) {
        if let Some(idx) = self.selected.take() {
            let handle = self.messages[idx].handle;
            self.surface.set_highlighted(handle, false);
            self.surface.detach_delete_button(handle);
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The currently selected message.
    #[must_use]
    pub fn selected(&self) -> Option<&DisplayedMessage<S::Handle>> {
        self.selected.map(|idx| &self.messages[idx])
    }

    /// The message that `token` was applied to, if any.
    #[must_use]
    pub fn message(&self, token: Token) -> Option<&DisplayedMessage<S::Handle>> {
        self.history.get(&token).map(|&idx| &self.messages[idx])
    }

    /// All messages in display order.
    #[must_use]
    pub fn messages(&self) -> &[DisplayedMessage<S::Handle>] {
        &self.messages
    }

    /// The handle of the message at display position `row`.
    #[must_use]
    pub fn handle_at(&self, row: usize) -> Option<S::Handle> {
        self.messages.get(row).map(|m| m.handle)
    }

    /// Number of messages shown.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether no message has been shown yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The local user.
    #[must_use]
    pub const fn local(&self) -> &DisplayName {
        &self.local
    }

    /// The render surface.
    #[must_use]
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the render surface, for view-only state such as
    /// scroll position.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}
