//! Render surfaces the reconciler draws into.
//!
//! The reconciler never touches a concrete view. It creates nodes through a
//! [`RenderSurface`] and keeps the returned handles, so the same
//! reconciliation logic drives a terminal list, a test double or anything
//! else that can show rows of text.

/// A view that can display chat messages.
pub trait RenderSurface {
    /// Opaque reference to one rendered message.
    type Handle: Copy + Eq + std::fmt::Debug;

    /// Append a new message node.
    fn create_node(&mut self, text: &str, interactive: bool) -> Self::Handle;

    /// Replace the text of a node.
    fn set_text(&mut self, handle: Self::Handle, text: &str);

    /// Mark a node as eligible (or not) for click-to-delete.
    fn set_interactive(&mut self, handle: Self::Handle, interactive: bool);

    /// Toggle the selection highlight of a node.
    fn set_highlighted(&mut self, handle: Self::Handle, highlighted: bool);

    /// Show a delete button on a node.
    fn attach_delete_button(&mut self, handle: Self::Handle);

    /// Remove the delete button from a node.
    fn detach_delete_button(&mut self, handle: Self::Handle);

    /// Scroll the message list to its bottom extent.
    fn scroll_to_bottom(&mut self);
}

/// One rendered message in a [`ListSurface`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    /// Displayed text.
    pub text: String,
    /// Whether clicking the row may select it.
    pub interactive: bool,
    /// Whether the row is the current selection.
    pub highlighted: bool,
    /// Whether the delete button is attached.
    pub has_delete_button: bool,
}

/// An in-memory list of rows.
///
/// Handles are row indices; rows are only ever appended. Every mutating call
/// bumps [`ListSurface::mutations`], which lets callers tell whether a batch
/// did any view work at all.
#[derive(Debug, Clone, Default)]
pub struct ListSurface {
    rows: Vec<Row>,
    pinned_to_bottom: bool,
    mutations: u64,
}

impl ListSurface {
    /// Create an empty surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All rows in display order.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// The row behind a handle.
    #[must_use]
    pub fn row(&self, handle: usize) -> Option<&Row> {
        self.rows.get(handle)
    }

    /// Number of mutating calls made so far.
    #[must_use]
    pub const fn mutations(&self) -> u64 {
        self.mutations
    }

    /// Whether the last scroll request asked for the bottom of the list.
    #[must_use]
    pub const fn is_pinned_to_bottom(&self) -> bool {
        self.pinned_to_bottom
    }

    /// Release the bottom pin, e.g. after the user scrolls up.
    pub fn unpin(&mut self) {
        self.pinned_to_bottom = false;
    }

    fn row_mut(&mut self, handle: usize) -> Option<&mut Row> {
        self.mutations += 1;
        let row = self.rows.get_mut(handle);
        if row.is_none() {
            tracing::warn!(handle, "render handle does not name a row");
        }
        row
    }
}

impl RenderSurface for ListSurface {
    type Handle = usize;

    fn create_node(&mut self, text: &str, interactive: bool) -> usize {
        self.mutations += 1;
        self.rows.push(Row {
            text: text.to_string(),
            interactive,
            highlighted: false,
            has_delete_button: false,
        });
        self.rows.len() - 1
    }

    fn set_text(&mut self, handle: usize, text: &str) {
        if let Some(row) = self.row_mut(handle) {
            text.clone_into(&mut row.text);
        }
    }

    fn set_interactive(&mut self, handle: usize, interactive: bool) {
        if let Some(row) = self.row_mut(handle) {
            row.interactive = interactive;
        }
    }

    fn set_highlighted(&mut self, handle: usize, highlighted: bool) {
        if let Some(row) = self.row_mut(handle) {
            row.highlighted = highlighted;
        }
    }

    fn attach_delete_button(&mut self, handle: usize) {
        if let Some(row) = self.row_mut(handle) {
            row.has_delete_button = true;
        }
    }

    fn detach_delete_button(&mut self, handle: usize) {
        if let Some(row) = self.row_mut(handle) {
            row.has_delete_button = false;
        }
    }

    fn scroll_to_bottom(&mut self) {
        self.mutations += 1;
        self.pinned_to_bottom = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_node_appends_rows_in_order() {
        let mut surface = ListSurface::new();
        let a = surface.create_node("A: one", true);
        let b = surface.create_node("B: two", false);

        assert_eq!((a, b), (0, 1));
        assert_eq!(surface.rows()[1].text, "B: two");
        assert!(surface.rows()[0].interactive);
        assert!(!surface.rows()[1].interactive);
    }

    #[test]
    fn mutations_count_every_change() {
        let mut surface = ListSurface::new();
        assert_eq!(surface.mutations(), 0);

        let h = surface.create_node("x", true);
        surface.set_text(h, "y");
        surface.set_highlighted(h, true);
        surface.attach_delete_button(h);
        surface.scroll_to_bottom();

        assert_eq!(surface.mutations(), 5);
        assert_eq!(
            surface.row(h),
            Some(&Row {
                text: "y".to_string(),
                interactive: true,
                highlighted: true,
                has_delete_button: true,
            })
        );
        assert!(surface.is_pinned_to_bottom());
    }

    #[test]
    fn unknown_handle_is_ignored() {
        let mut surface = ListSurface::new();
        surface.set_text(3, "nothing");
        assert!(surface.rows().is_empty());
    }
}
