//! UI rendering with ratatui.
//!
//! Layout: header bar, message list, separator, input line, status bar.
//! The message list shows one line per message, taken straight from the
//! [`ListSurface`](tourney_chat_core::ListSurface) rows.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{App, ListLayout, DELETE_LABEL};

/// Render the UI and return where the message list was drawn.
pub fn render(frame: &mut Frame, app: &App) -> ListLayout {
    let area = frame.area();

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header bar
            Constraint::Min(1),    // Messages
            Constraint::Length(1), // Separator
            Constraint::Length(1), // Input line
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_header_bar(frame, app, main_layout[0]);
    let layout = render_messages(frame, app, main_layout[1]);
    render_input_line(frame, app, main_layout[2], main_layout[3]);
    render_status_bar(frame, app, main_layout[4]);

    layout
}

/// Convert a length to a terminal width.
fn width(len: usize) -> u16 {
    u16::try_from(len).unwrap_or(u16::MAX)
}

/// Truncate a string in the middle with an ellipsis if it exceeds `max_len`
/// characters.
fn truncate_middle(s: &str, max_len: usize) -> String {
    let len = s.chars().count();
    if len <= max_len {
        return s.to_string();
    }
    if max_len < 5 {
        return s.chars().take(max_len).collect();
    }
    let keep = (max_len - 3) / 2;
    let start: String = s.chars().take(keep).collect();
    let end: String = s.chars().skip(len - keep).collect();
    format!("{start}...{end}")
}

/// Render the header bar with server, room, identity and feed position.
fn render_header_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "TOURNEY CHAT";

    let updated = app
        .last_activity
        .map_or_else(String::new, |at| format!("  updated {}", at.format("%H:%M:%S")));
    let position = format!(
        " | room {} | {} | token {}{updated}",
        app.room, app.identity, app.high_water
    );

    // The server URL gives way first on narrow terminals
    let max_url_width = usize::from(area.width)
        .saturating_sub(title.len() + position.chars().count() + 1);
    let server = truncate_middle(&app.server, max_url_width);

    let padding = area
        .width
        .saturating_sub(width(title.len() + server.chars().count() + position.chars().count()));

    let line = Line::from(vec![
        Span::styled(
            title,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw(" ".repeat(usize::from(padding))),
        Span::styled(server, Style::default().fg(Color::Gray)),
        Span::raw(position),
    ]);

    let header = Paragraph::new(line).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

/// Render the message list, scrolled `app.chat_scroll` lines up from the
/// bottom.
fn render_messages(frame: &mut Frame, app: &App, area: Rect) -> ListLayout {
    let view = app.view();
    let rows = view.surface().rows();
    let messages = view.messages();

    let height = usize::from(area.height);
    let total = rows.len();
    let offset = app.chat_scroll.min(total.saturating_sub(height));
    let end = total - offset;
    let first_row = end.saturating_sub(height);

    if total == 0 {
        let empty = Paragraph::new("No messages yet").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return ListLayout { area, first_row: 0 };
    }

    let mut lines = Vec::with_capacity(end - first_row);
    let mut button_line = None;

    for (index, row) in rows.iter().enumerate().take(end).skip(first_row) {
        let deleted = messages.get(index).is_some_and(|m| m.deleted);
        let under_cursor = app.command_mode && app.cursor_row == Some(index);

        let marker = if under_cursor { "› " } else { "  " };
        let style = if row.highlighted {
            Style::default()
                .fg(Color::White)
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD)
        } else if deleted {
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC)
        } else if row.interactive {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::Gray)
        };

        if row.has_delete_button {
            button_line = Some(lines.len());
        }

        lines.push(Line::from(vec![
            Span::styled(marker, Style::default().fg(Color::Yellow)),
            Span::styled(row.text.as_str(), style),
        ]));
    }

    frame.render_widget(Paragraph::new(lines), area);

    if let Some(line) = button_line {
        let label_width = width(DELETE_LABEL.len()).min(area.width);
        let button_area = Rect::new(
            area.right() - label_width,
            area.y + width(line),
            label_width,
            1,
        );
        let button = Paragraph::new(DELETE_LABEL)
            .style(Style::default().fg(Color::White).bg(Color::Red).bold());
        frame.render_widget(button, button_area);
    }

    ListLayout { area, first_row }
}

/// Render the separator and input line.
fn render_input_line(frame: &mut Frame, app: &App, separator_area: Rect, input_area: Rect) {
    let separator = Paragraph::new("─".repeat(usize::from(separator_area.width)))
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(separator, separator_area);

    let prompt = if app.command_mode { ": " } else { "> " };
    let prompt_color = if app.command_mode {
        Color::DarkGray
    } else {
        Color::Cyan
    };

    let input_line = Line::from(vec![
        Span::styled(prompt, Style::default().fg(prompt_color)),
        Span::styled(app.input.as_str(), Style::default().fg(Color::White)),
    ]);
    frame.render_widget(Paragraph::new(input_line), input_area);

    if !app.command_mode {
        frame.set_cursor_position((
            input_area.x + width(prompt.len()) + width(app.cursor_position),
            input_area.y,
        ));
    }
}

/// Render the status bar.
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mode_indicator = if app.command_mode {
        Span::styled(" COMMAND ", Style::default().fg(Color::Black).bg(Color::Blue))
    } else {
        Span::styled(" INSERT ", Style::default().fg(Color::Black).bg(Color::Green))
    };

    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Yellow));

    let status = if let Some(ref status) = app.status_message {
        Line::from(vec![
            mode_indicator,
            Span::styled(format!(" {status}"), Style::default().fg(Color::Green)),
        ])
    } else if app.command_mode {
        Line::from(vec![
            mode_indicator,
            Span::raw(" "),
            key("j/k"),
            Span::raw(":move "),
            key("Enter"),
            Span::raw(":select "),
            key("d"),
            Span::raw(":delete "),
            key("x"),
            Span::raw(":deselect "),
            key("i"),
            Span::raw(":insert "),
            key("q"),
            Span::raw(":quit"),
        ])
    } else {
        Line::from(vec![
            mode_indicator,
            Span::raw(" "),
            key("Enter"),
            Span::raw(":send "),
            key("Esc"),
            Span::raw(":command mode "),
            key("PgUp/PgDn"),
            Span::raw(":scroll "),
            key("Ctrl+C"),
            Span::raw(":quit"),
        ])
    };

    frame.render_widget(Paragraph::new(status), area);
}

#[cfg(test)]
mod tests {
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;
    use ratatui::Terminal;

    use super::*;
    use crate::app::test_support::{app, seed};

    fn line(buffer: &Buffer, y: u16) -> String {
        (0..buffer.area.width)
            .map(|x| buffer[(x, y)].symbol())
            .collect()
    }

    fn draw(app: &App, width: u16, height: u16) -> (Buffer, ListLayout) {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        let mut layout = ListLayout::default();
        terminal.draw(|f| layout = render(f, app)).unwrap();
        (terminal.backend().buffer().clone(), layout)
    }

    #[test]
    fn header_shows_server_room_and_identity() {
        let (app, _) = app();

        let (buffer, _) = draw(&app, 100, 8);
        let header = line(&buffer, 0);

        assert!(header.starts_with("TOURNEY CHAT"));
        assert!(header.contains("http://localhost:8000"));
        assert!(header.contains("room 5 | Alice | token 0"));
    }

    #[test]
    fn long_server_url_is_shortened_in_the_middle() {
        assert_eq!(truncate_middle("http://localhost:8000", 30), "http://localhost:8000");
        assert_eq!(truncate_middle("http://chat.example.com:8000", 11), "http...8000");
        assert_eq!(truncate_middle("abcdef", 3), "abc");
    }

    #[test]
    fn selected_row_gets_delete_button() {
        let (mut app, _) = app();
        seed(&app);
        app.click_row(2);

        let (buffer, layout) = draw(&app, 40, 8);

        assert_eq!(layout.area, Rect::new(0, 1, 40, 4));
        assert_eq!(layout.first_row, 0);
        let row = line(&buffer, 3);
        assert!(row.contains("Alice: also mine"));
        assert!(row.ends_with(DELETE_LABEL));
        assert!(!line(&buffer, 1).contains(DELETE_LABEL));
    }

    #[test]
    fn list_shows_the_newest_rows_when_it_overflows() {
        let (app, _) = app();
        seed(&app);

        let (buffer, layout) = draw(&app, 40, 6);

        assert_eq!(layout.first_row, 1);
        assert!(line(&buffer, 1).contains("Bob: theirs"));
        assert!(line(&buffer, 2).contains("Alice: also mine"));
    }
}
