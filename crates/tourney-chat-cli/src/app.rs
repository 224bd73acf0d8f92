//! Application state.
//!
//! The message list itself lives in the shared reconciler, which the feed
//! poller writes to from its own task. [`App`] holds everything else the
//! terminal needs: the input line, the row cursor, scroll position and the
//! status line.

use std::time::Duration;

use chrono::{DateTime, Local};
use parking_lot::MutexGuard;
use ratatui::layout::Rect;
use tokio::task::JoinHandle;
use tourney_chat_client::{ChatTransport, Composer, SharedReconciler};
use tourney_chat_core::{ClickOutcome, DisplayName, ListSurface, Reconciler, RoomId, Token};

/// How often the screen is redrawn when no input arrives.
pub const REDRAW_INTERVAL: Duration = Duration::from_millis(250);

/// Label of the delete button drawn on the selected row.
pub const DELETE_LABEL: &str = "[Delete]";

/// Where the message list was last drawn, for mouse hit testing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListLayout {
    /// Screen area of the message list.
    pub area: Rect,
    /// Index of the message shown on the first line of `area`.
    pub first_row: usize,
}

impl ListLayout {
    /// Map a screen position to a message row.
    #[must_use]
    pub fn row_at(&self, column: u16, row: u16) -> Option<usize> {
        if column < self.area.x
            || column >= self.area.right()
            || row < self.area.y
            || row >= self.area.bottom()
        {
            return None;
        }
        Some(self.first_row + usize::from(row - self.area.y))
    }

    /// Whether a screen column falls on the delete button.
    #[must_use]
    pub fn is_delete_button(&self, column: u16) -> bool {
        let width = u16::try_from(DELETE_LABEL.len()).unwrap_or(u16::MAX);
        column >= self.area.right().saturating_sub(width) && column < self.area.right()
    }
}

/// Application state.
pub struct App {
    /// Shared view state, also written by the poller.
    reconciler: SharedReconciler<ListSurface>,
    /// Sends messages and deletes.
    composer: Composer<dyn ChatTransport>,
    /// Room being shown.
    pub room: RoomId,
    /// Local identity.
    pub identity: DisplayName,
    /// Server URL for display.
    pub server: String,
    /// Current input buffer.
    pub input: String,
    /// Cursor position in input, in characters.
    pub cursor_position: usize,
    /// Whether keys are commands rather than text.
    pub command_mode: bool,
    /// Message row under the keyboard cursor.
    pub cursor_row: Option<usize>,
    /// Lines scrolled up from the bottom of the list.
    pub chat_scroll: usize,
    /// Status message to display.
    pub status_message: Option<String>,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Highest token the poller has applied.
    pub high_water: Token,
    /// When the message list last changed.
    pub last_activity: Option<DateTime<Local>>,
    /// Where the list was last drawn.
    pub list_layout: ListLayout,
    seen_mutations: u64,
}

impl App {
    /// Create a new application.
    #[must_use]
    pub fn new(
        reconciler: SharedReconciler<ListSurface>,
        composer: Composer<dyn ChatTransport>,
        room: RoomId,
        server: impl Into<String>,
    ) -> Self {
        let identity = reconciler.lock().local().clone();
        Self {
            reconciler,
            composer,
            room,
            identity,
            server: server.into(),
            input: String::new(),
            cursor_position: 0,
            command_mode: false,
            cursor_row: None,
            chat_scroll: 0,
            status_message: None,
            should_quit: false,
            high_water: Token::ZERO,
            last_activity: None,
            list_layout: ListLayout::default(),
            seen_mutations: 0,
        }
    }

    /// Lock the view state for reading.
    ///
    /// The guard must not be held across an await point.
    pub fn view(&self) -> MutexGuard<'_, Reconciler<ListSurface>> {
        self.reconciler.lock()
    }

    /// Pick up whatever the poller changed since the last frame.
    pub fn sync(&mut self, high_water: Token) {
        self.high_water = high_water;

        let (mutations, pinned, len) = {
            let view = self.reconciler.lock();
            (
                view.surface().mutations(),
                view.surface().is_pinned_to_bottom(),
                view.len(),
            )
        };

        if mutations != self.seen_mutations {
            self.seen_mutations = mutations;
            self.last_activity = Some(Local::now());
            if pinned {
                self.chat_scroll = 0;
            }
        }

        if let Some(row) = self.cursor_row {
            if row >= len {
                self.cursor_row = len.checked_sub(1);
            }
        }
    }

    /// Set the status message.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    /// Clear the status message.
    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// Toggle between typing and command keys.
    pub fn toggle_command_mode(&mut self) {
        self.command_mode = !self.command_mode;
        if self.command_mode && self.cursor_row.is_none() {
            self.select_last_row();
        }
    }

    // =========================================================================
    // Scrolling
    // =========================================================================

    /// Scroll up (view older messages).
    pub fn scroll_chat_up(&mut self, amount: usize) {
        let max = self
            .view()
            .len()
            .saturating_sub(usize::from(self.list_layout.area.height));
        self.chat_scroll = self.chat_scroll.saturating_add(amount).min(max);
        if self.chat_scroll > 0 {
            self.reconciler.lock().surface_mut().unpin();
        }
    }

    /// Scroll down (view newer messages).
    pub fn scroll_chat_down(&mut self, amount: usize) {
        self.chat_scroll = self.chat_scroll.saturating_sub(amount);
    }

    // =========================================================================
    // Row Cursor
    // =========================================================================

    /// Move the row cursor to the previous message.
    pub fn select_prev_row(&mut self) {
        let len = self.view().len();
        if len == 0 {
            return;
        }
        self.cursor_row = Some(match self.cursor_row {
            Some(0) => 0,
            Some(i) => i - 1,
            None => len - 1,
        });
    }

    /// Move the row cursor to the next message.
    pub fn select_next_row(&mut self) {
        let len = self.view().len();
        if len == 0 {
            return;
        }
        self.cursor_row = Some(match self.cursor_row {
            Some(i) if i + 1 < len => i + 1,
            Some(_) | None => len - 1,
        });
    }

    /// Move the row cursor to the first message.
    pub fn select_first_row(&mut self) {
        let len = self.view().len();
        if len > 0 {
            self.cursor_row = Some(0);
        }
    }

    /// Move the row cursor to the last message.
    pub fn select_last_row(&mut self) {
        let len = self.view().len();
        self.cursor_row = len.checked_sub(1);
    }

    // =========================================================================
    // Click-to-delete
    // =========================================================================

    /// Click the message at `row`.
    pub fn click_row(&mut self, row: usize) -> ClickOutcome {
        let outcome = {
            let mut view = self.reconciler.lock();
            match view.handle_at(row) {
                Some(handle) => view.click(handle),
                None => ClickOutcome::Ignored,
            }
        };

        if let ClickOutcome::Selected(token) = outcome {
            self.cursor_row = Some(row);
            tracing::debug!(row, token = %token, "Selected chat message");
            self.set_status("Message selected, press d or click [Delete] to remove it");
        }
        outcome
    }

    /// Click the message under the row cursor.
    pub fn click_cursor_row(&mut self) -> ClickOutcome {
        match self.cursor_row {
            Some(row) => self.click_row(row),
            None => ClickOutcome::Ignored,
        }
    }

    /// Handle a mouse click at a screen position.
    ///
    /// A click on the delete button of the selected row deletes it; any
    /// other click on a row is a click on that message.
    pub fn click_at(&mut self, column: u16, row: u16) -> Option<JoinHandle<()>> {
        let index = self.list_layout.row_at(column, row)?;

        let on_selected = {
            let view = self.view();
            view.selected()
                .is_some_and(|m| Some(m.handle) == view.handle_at(index))
        };
        if on_selected && self.list_layout.is_delete_button(column) {
            return self.delete_selected();
        }

        self.click_row(index);
        None
    }

    /// Press delete on the selected message.
    ///
    /// The message is only marked deleted once the server echoes the delete
    /// back through the feed.
    pub fn delete_selected(&mut self) -> Option<JoinHandle<()>> {
        let token = self.reconciler.lock().press_delete()?;
        self.set_status(format!("Deleting message {token}"));
        Some(self.composer.delete(token))
    }

    /// Return the selected message to idle.
    pub fn clear_selection(&mut self) {
        self.reconciler.lock().clear_selection();
        self.clear_status();
    }

    // =========================================================================
    // Input Handling
    // =========================================================================

    fn byte_index(&self, position: usize) -> usize {
        self.input
            .char_indices()
            .nth(position)
            .map_or(self.input.len(), |(i, _)| i)
    }

    fn char_len(&self) -> usize {
        self.input.chars().count()
    }

    /// Insert a character at the cursor position.
    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_index(self.cursor_position);
        self.input.insert(at, c);
        self.cursor_position += 1;
    }

    /// Delete the character before the cursor.
    pub fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            let at = self.byte_index(self.cursor_position);
            self.input.remove(at);
        }
    }

    /// Delete the character at the cursor.
    pub fn delete_char_forward(&mut self) {
        if self.cursor_position < self.char_len() {
            let at = self.byte_index(self.cursor_position);
            self.input.remove(at);
        }
    }

    /// Delete back to the previous space.
    pub fn delete_word(&mut self) {
        while self.cursor_position > 0 {
            self.delete_char();
            if self.cursor_position > 0 {
                let prev = self.input.chars().nth(self.cursor_position - 1);
                if prev == Some(' ') {
                    break;
                }
            }
        }
    }

    /// Move cursor left.
    pub fn move_cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    /// Move cursor right.
    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.char_len() {
            self.cursor_position += 1;
        }
    }

    /// Move cursor to the start.
    pub fn move_cursor_start(&mut self) {
        self.cursor_position = 0;
    }

    /// Move cursor to the end.
    pub fn move_cursor_end(&mut self) {
        self.cursor_position = self.char_len();
    }

    /// Clear the input.
    pub fn clear_input(&mut self) {
        self.input.clear();
        self.cursor_position = 0;
    }

    /// Send the input as a new message.
    ///
    /// Blank input stays in place and nothing is sent.
    pub fn submit(&mut self) -> Option<JoinHandle<()>> {
        let handle = self.composer.submit(&mut self.input)?;
        self.cursor_position = 0;
        self.clear_status();
        Some(handle)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use tourney_chat_client::TransportError;
    use tourney_chat_core::{MessageEvent, OutgoingMessage};

    use super::*;

    /// Transport that records sends and never has anything new.
    #[derive(Default)]
    pub(crate) struct RecordingTransport {
        pub(crate) sent: Mutex<Vec<OutgoingMessage>>,
    }

    #[async_trait]
    impl ChatTransport for RecordingTransport {
        async fn fetch_since(
            &self,
            _room: RoomId,
            _since: Token,
        ) -> Result<Vec<MessageEvent>, TransportError> {
            Ok(Vec::new())
        }

        async fn send(&self, message: &OutgoingMessage) -> Result<(), TransportError> {
            self.sent.lock().push(message.clone());
            Ok(())
        }
    }

    /// An app for Alice in room 5.
    pub(crate) fn app() -> (App, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::default());
        let reconciler = Arc::new(Mutex::new(Reconciler::new(
            DisplayName::new("Alice").unwrap(),
            ListSurface::new(),
        )));
        let as_dyn: Arc<dyn ChatTransport> = transport.clone();
        let composer = Composer::new(as_dyn, "alice@example.com", RoomId::new(5));
        let app = App::new(reconciler, composer, RoomId::new(5), "http://localhost:8000");
        (app, transport)
    }

    /// Two messages from Alice around one from Bob.
    pub(crate) fn seed(app: &App) {
        app.view().apply(&[
            MessageEvent::create(Token::new(1), "Alice", "mine"),
            MessageEvent::create(Token::new(2), "Bob", "theirs"),
            MessageEvent::create(Token::new(3), "Alice", "also mine"),
        ]);
    }
}
