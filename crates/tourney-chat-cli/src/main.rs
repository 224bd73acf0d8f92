//! Tourney Chat CLI - Terminal client for tournament chat rooms.
//!
//! This is the entry point for the `tchat` binary.

#![forbid(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod app;
mod ui;

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use futures::StreamExt;
use parking_lot::Mutex;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::time::MissedTickBehavior;
use tourney_chat_client::{
    ChatConfig, ChatTransport, Composer, HttpChatClient, Poller, PollerHandle,
};
use tourney_chat_core::{ListSurface, Reconciler};
use tracing_subscriber::EnvFilter;

use app::{App, ListLayout, REDRAW_INTERVAL};

/// Log filter used with `--debug` when `RUST_LOG` is not set.
const DEBUG_FILTER: &str = "tchat=debug,tourney_chat_client=debug,tourney_chat_core=debug,warn";

/// Tourney Chat CLI - Terminal client for tournament chat rooms.
#[derive(Parser, Debug)]
#[command(name = "tchat")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Chat server URL.
    #[arg(long, env = "TCHAT_SERVER", default_value = "http://127.0.0.1:8000")]
    server: String,

    /// Tournament id of the room to join.
    #[arg(long, env = "TCHAT_ROOM")]
    room: String,

    /// Display name, as the server reports it on messages.
    #[arg(long, env = "TCHAT_NAME")]
    name: String,

    /// Address sent as the sender of outgoing messages (defaults to the name).
    #[arg(long, env = "TCHAT_EMAIL")]
    email: Option<String>,

    /// CSRF token forwarded with every request.
    #[arg(long, env = "TCHAT_CSRF_TOKEN")]
    csrf_token: Option<String>,

    /// Override the feed endpoint path.
    #[arg(long, env = "TCHAT_FEED_PATH")]
    feed_path: Option<String>,

    /// Feed poll period in milliseconds.
    #[arg(long, env = "TCHAT_POLL_INTERVAL_MS", default_value_t = 2000)]
    poll_interval_ms: u64,

    /// Per-request timeout in seconds.
    #[arg(long, env = "TCHAT_TIMEOUT_SECS", default_value_t = 10)]
    timeout_secs: u64,

    /// Enable debug logging.
    #[arg(long, default_value = "false")]
    debug: bool,

    /// Write debug logs to this file instead of stderr.
    #[arg(long, env = "TCHAT_LOG_FILE")]
    log_file: Option<PathBuf>,
}

impl Args {
    fn to_config(&self) -> ChatConfig {
        let mut config = ChatConfig::new(&self.server, &self.room, &self.name);
        config.sender_address.clone_from(&self.email);
        config.csrf_token.clone_from(&self.csrf_token);
        if let Some(path) = &self.feed_path {
            config.feed_path.clone_from(path);
        }
        config.poll_interval_ms = self.poll_interval_ms;
        config.request_timeout_seconds = self.timeout_secs;
        config
    }
}

/// Initialize logging when `--debug` is set.
fn init_tracing(args: &Args) -> anyhow::Result<()> {
    if !args.debug {
        return Ok(());
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEBUG_FILTER));

    match &args.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse arguments
    let args = Args::parse();
    init_tracing(&args)?;

    // Validate before touching the terminal
    let config = args.to_config();
    let settings = config.validate().context("Invalid configuration")?;
    let transport: Arc<dyn ChatTransport> =
        Arc::new(HttpChatClient::new(&config).context("Failed to create HTTP client")?);

    tracing::info!(
        server = %config.base_url,
        room = %settings.room,
        identity = %settings.display_name,
        "Starting chat client"
    );

    let reconciler = Arc::new(Mutex::new(Reconciler::new(
        settings.display_name.clone(),
        ListSurface::new(),
    )));
    let poller = Poller::new(
        Arc::clone(&transport),
        settings.room,
        Arc::clone(&reconciler),
        config.poll_interval(),
    )
    .spawn();
    let composer = Composer::new(transport, settings.sender_address.clone(), settings.room);

    // Setup terminal with mouse capture enabled
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(reconciler, composer, settings.room, config.base_url.clone());

    let result = run_event_loop(&mut terminal, &mut app, &poller).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    let high_water = poller.stop().await;
    tracing::info!(high_water = %high_water, "Chat client stopped");

    result
}

/// Main event loop.
///
/// Redraws on every terminal event and on a fixed tick, so batches applied
/// by the poller show up without user input.
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    poller: &PollerHandle,
) -> anyhow::Result<()> {
    let mut events = EventStream::new();
    let mut redraw = tokio::time::interval(REDRAW_INTERVAL);
    redraw.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        app.sync(poller.high_water());

        let mut layout = ListLayout::default();
        terminal.draw(|f| layout = ui::render(f, app))?;
        app.list_layout = layout;

        tokio::select! {
            _ = redraw.tick() => {}
            maybe_event = events.next() => match maybe_event {
                Some(Ok(event)) => handle_input(app, event),
                Some(Err(e)) => return Err(e.into()),
                None => break,
            },
        }

        if app.should_quit {
            break;
        }
        if poller.is_finished() {
            tracing::warn!("Chat poller exited, shutting down");
            break;
        }
    }

    Ok(())
}

/// Handle input events.
fn handle_input(app: &mut App, event: Event) {
    match event {
        Event::Key(key) => {
            // Only handle key press events
            if key.kind != KeyEventKind::Press {
                return;
            }
            handle_key(app, key);
        }
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::ScrollUp => app.scroll_chat_up(3),
            MouseEventKind::ScrollDown => app.scroll_chat_down(3),
            MouseEventKind::Down(MouseButton::Left) => {
                app.click_at(mouse.column, mouse.row);
            }
            _ => {}
        },
        _ => {}
    }
}

/// Handle a key press.
///
/// - Ctrl+C always quits
/// - ESC toggles command mode
/// - Up/Down always move the row cursor, PageUp/PageDown always scroll
/// - Everything else depends on the mode
fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match key.code {
        KeyCode::Esc => {
            app.toggle_command_mode();
            return;
        }
        KeyCode::PageUp => {
            app.scroll_chat_up(10);
            return;
        }
        KeyCode::PageDown => {
            app.scroll_chat_down(10);
            return;
        }
        KeyCode::Up => {
            app.select_prev_row();
            return;
        }
        KeyCode::Down => {
            app.select_next_row();
            return;
        }
        _ => {}
    }

    if app.command_mode {
        handle_command_mode(app, key.code);
    } else {
        handle_insert_mode(app, key.code, key.modifiers);
    }
}

/// Handle input in command mode (ESC was pressed).
fn handle_command_mode(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('q') => {
            app.should_quit = true;
        }
        KeyCode::Char('j') => {
            app.select_next_row();
        }
        KeyCode::Char('k') => {
            app.select_prev_row();
        }
        KeyCode::Char('g') => {
            app.select_first_row();
        }
        KeyCode::Char('G') => {
            app.select_last_row();
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
            app.click_cursor_row();
        }
        KeyCode::Char('d') | KeyCode::Delete => {
            app.delete_selected();
        }
        KeyCode::Char('x') => {
            app.clear_selection();
        }
        KeyCode::Char('i') => {
            app.command_mode = false;
        }
        _ => {}
    }
}

/// Handle input in insert mode (typing goes to input).
fn handle_insert_mode(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    match code {
        KeyCode::Enter => {
            app.submit();
        }
        KeyCode::Char(c) => {
            if modifiers.contains(KeyModifiers::CONTROL) {
                match c {
                    'a' => app.move_cursor_start(),
                    'e' => app.move_cursor_end(),
                    'u' => app.clear_input(),
                    'w' => app.delete_word(),
                    _ => {}
                }
            } else {
                app.insert_char(c);
            }
        }
        KeyCode::Backspace => {
            app.delete_char();
        }
        KeyCode::Delete => {
            app.delete_char_forward();
        }
        KeyCode::Left => {
            app.move_cursor_left();
        }
        KeyCode::Right => {
            app.move_cursor_right();
        }
        KeyCode::Home => {
            app.move_cursor_start();
        }
        KeyCode::End => {
            app.move_cursor_end();
        }
        _ => {}
    }
}
