//! howdy-tui: Terminal UI for the howdy streaming chat client
//!
//! This crate provides the presentation shell for howdy, including:
//! - Message list with a streaming reply and loading indicator
//! - Example prompt picker for the empty conversation
//! - Multi-line input form (Enter sends, Ctrl+J or Shift+Enter adds a line)
//! - Headless mode for testing and automation

mod app;
mod event;
pub mod headless;
pub mod icons;
mod screens;
#[cfg(test)]
pub mod test_utils;
mod ui;
mod widgets;

use screens::Screen as ScreenTrait;

pub use app::{App, Focus};
pub use event::{Action, Event, EventHandler};
pub use howdy_engine;

use crossterm::{
    cursor::Show as ShowCursor,
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags, MouseEventKind,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use howdy_engine::{spawn_turn, CompletionClient, Config, TurnEvent, TurnOutcome};
use ratatui::{backend::CrosstermBackend, buffer::Buffer, layout::Rect, Terminal};
use std::io::{self, stdout};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info};

/// Event handler tick rate (4 Hz).
const TICK_RATE_MS: u64 = 250;

/// Lines moved per mouse wheel step.
const WHEEL_LINES: usize = 3;

/// RAII guard for terminal state restoration.
struct TerminalGuard {
    /// Whether keyboard enhancement flags were pushed.
    keyboard_enhanced: bool,
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.keyboard_enhanced {
            let _ = execute!(stdout(), PopKeyboardEnhancementFlags);
        }
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), DisableMouseCapture, LeaveAlternateScreen, ShowCursor);
    }
}

/// Run the TUI application.
///
/// Sets up the terminal, runs the chat loop until the user quits, and
/// restores the terminal on exit. Requests go to `client`.
pub async fn run_tui(
    config: &Config,
    client: Arc<dyn CompletionClient>,
) -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let mut guard = TerminalGuard {
        keyboard_enhanced: false,
    };

    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    // Legacy terminals send Shift+Enter as a plain Enter
    if supports_keyboard_enhancement().unwrap_or(false) {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
        guard.keyboard_enhanced = true;
    }
    debug!(keyboard_enhanced = guard.keyboard_enhanced, "terminal ready");
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config);
    let mut events = EventHandler::new(TICK_RATE_MS);

    info!(endpoint = %config.endpoint.url, "starting chat");
    let result = run_loop(&mut terminal, &mut app, &mut events, client).await;

    // Restore cursor before guard drops
    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut EventHandler,
    client: Arc<dyn CompletionClient>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (turn_tx, mut turn_rx) = mpsc::unbounded_channel::<TurnEvent>();
    let mut turn: Option<JoinHandle<TurnOutcome>> = None;

    loop {
        terminal.draw(|frame| {
            let area = frame.area();
            draw(app, area, frame.buffer_mut());
        })?;

        if app.should_quit {
            if let Some(handle) = turn.take() {
                debug!("abandoning in-flight request");
                handle.abort();
            }
            break;
        }

        tokio::select! {
            event = events.next() => match event {
                Some(Event::Key(key)) => {
                    if let Some(history) = app.handle_key(key) {
                        turn = Some(spawn_turn(Arc::clone(&client), history, turn_tx.clone()));
                    }
                }
                Some(Event::Mouse(mouse)) => match mouse.kind {
                    MouseEventKind::ScrollUp => app.scroll_up(WHEEL_LINES),
                    MouseEventKind::ScrollDown => app.scroll_down(WHEEL_LINES),
                    _ => {}
                },
                Some(Event::Tick) => app.tick(),
                // Terminal will handle resize automatically
                Some(Event::Resize(_, _)) => {}
                None => break,
            },
            Some(event) = turn_rx.recv() => {
                // Fold queued fragments into one frame
                app.apply_turn_event(event);
                while let Ok(event) = turn_rx.try_recv() {
                    app.apply_turn_event(event);
                }
            }
            Some(result) = join_turn(&mut turn) => {
                turn = None;
                while let Ok(event) = turn_rx.try_recv() {
                    app.apply_turn_event(event);
                }
                app.finish_turn(result);
            }
        }
    }

    Ok(())
}

/// Wait for the in-flight request task. Resolves to `None` when idle.
pub(crate) async fn join_turn(
    turn: &mut Option<JoinHandle<TurnOutcome>>,
) -> Option<Result<TurnOutcome, JoinError>> {
    match turn.as_mut() {
        Some(handle) => Some(handle.await),
        None => None,
    }
}

/// Draw one frame: the chat screen, then any overlay on top.
pub(crate) fn draw(app: &App, area: Rect, buf: &mut Buffer) {
    screens::chat::ChatScreen.render(app, area, buf);

    if let Some(alert) = app.conversation.alert() {
        screens::render_alert_overlay(alert, area, buf);
    } else if app.show_help {
        screens::render_help_overlay(area, buf);
    }
}

/// Returns the version of the howdy-tui crate.
pub fn tui_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_app, render_app_to_string};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use howdy_engine::{Message, RATE_LIMIT_ALERT};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            assert!(app.handle_key(key(KeyCode::Char(c))).is_none());
        }
    }

    #[test]
    fn test_tui_version() {
        assert!(!tui_version().is_empty());
    }

    #[test]
    fn test_enter_returns_history_and_shift_enter_adds_line() {
        let mut app = create_test_app();
        type_text(&mut app, "line one");
        let shift_enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT);
        assert!(app.handle_key(shift_enter).is_none());
        type_text(&mut app, "line two");

        let history = app.handle_key(key(KeyCode::Enter)).expect("submitted");
        assert_eq!(history, vec![Message::user("line one\nline two")]);
        assert!(app.input.is_empty());
        assert!(app.conversation.is_busy());
    }

    #[test]
    fn test_alert_overlay_drawn_over_chat() {
        let mut app = create_test_app();
        type_text(&mut app, "hi");
        app.handle_key(key(KeyCode::Enter));
        app.apply_turn_event(TurnEvent::RateLimited);

        let screen = render_app_to_string(&app);
        assert!(screen.contains("Alert"));
        assert!(screen.contains(RATE_LIMIT_ALERT));

        app.handle_key(key(KeyCode::Char('x')));
        let screen = render_app_to_string(&app);
        assert!(!screen.contains(RATE_LIMIT_ALERT));
        assert!(app.input.is_empty());
    }

    #[test]
    fn test_help_overlay_toggles() {
        let mut app = create_test_app();
        app.handle_key(key(KeyCode::F(1)));
        assert!(render_app_to_string(&app).contains("Shift+Enter"));

        app.handle_key(key(KeyCode::F(1)));
        assert!(!render_app_to_string(&app).contains("Press any key to close"));
    }
}
