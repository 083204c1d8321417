//! Headless mode for the howdy TUI.
//!
//! Runs the chat loop against a `TestBackend` instead of a real terminal.
//! Key presses go in over a channel; the rendered screen comes back through
//! a watch channel after every frame.

use crate::app::App;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use howdy_engine::{spawn_turn, CompletionClient, Config, TurnEvent, TurnOutcome};
use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Default terminal dimensions for headless mode.
pub const DEFAULT_WIDTH: u16 = 80;
pub const DEFAULT_HEIGHT: u16 = 24;

/// State captured from the headless TUI after each render.
#[derive(Debug, Clone, Default)]
pub struct HeadlessState {
    /// Text contents of the terminal buffer.
    pub screen_contents: String,
    pub should_quit: bool,
    pub show_help: bool,
    /// Whether a request is in flight.
    pub busy: bool,
    pub message_count: usize,
    pub draft: String,
    /// Alert currently blocking the screen.
    pub alert: Option<String>,
}

/// Handle to control a headless TUI instance.
pub struct HeadlessHandle {
    key_tx: mpsc::UnboundedSender<KeyEvent>,
    state_rx: watch::Receiver<HeadlessState>,
}

impl HeadlessHandle {
    /// Send a key event to the TUI.
    ///
    /// Returns `true` if the key was delivered.
    pub fn send_key(&self, key: KeyEvent) -> bool {
        self.key_tx.send(key).is_ok()
    }

    /// Send an unmodified key press.
    pub fn press(&self, code: KeyCode) -> bool {
        self.send_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    /// Type each character of `text` as its own key press.
    pub fn type_text(&self, text: &str) -> bool {
        text.chars().all(|c| self.press(KeyCode::Char(c)))
    }

    /// Get the current state of the TUI.
    pub fn state(&self) -> HeadlessState {
        self.state_rx.borrow().clone()
    }

    /// Wait until a condition is met on the state.
    ///
    /// Returns the state when the condition is met, or `None` if timed out.
    pub async fn wait_for<F>(&mut self, condition: F, timeout: Duration) -> Option<HeadlessState>
    where
        F: Fn(&HeadlessState) -> bool,
    {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            let state = self.state();
            if condition(&state) {
                return Some(state);
            }

            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return None;
            }

            match tokio::time::timeout(remaining, self.state_rx.changed()).await {
                Ok(Ok(())) => {}
                // Timed out, or the loop is gone
                _ => return None,
            }
        }
    }

    /// Wait for specific text to appear on screen.
    pub async fn wait_for_text(&mut self, text: &str, timeout: Duration) -> Option<HeadlessState> {
        self.wait_for(|s| s.screen_contents.contains(text), timeout)
            .await
    }

    /// Check if the TUI has quit.
    pub fn has_quit(&self) -> bool {
        self.state().should_quit
    }
}

/// Configuration for headless mode.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    pub width: u16,
    pub height: u16,
    /// Tick rate in milliseconds.
    pub tick_rate_ms: u64,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            tick_rate_ms: 50,
        }
    }
}

/// Run the TUI in headless mode.
///
/// Returns a handle to drive the TUI and the join handle of the loop task.
///
/// # Example
///
/// ```ignore
/// let (mut handle, task) = run_tui_headless(config, client, HeadlessConfig::default());
///
/// handle.type_text("hello");
/// handle.press(KeyCode::Enter);
/// handle.wait_for_text("Howdy", Duration::from_secs(1)).await;
///
/// handle.press(KeyCode::Esc);
/// task.await.unwrap();
/// ```
pub fn run_tui_headless(
    config: Config,
    client: Arc<dyn CompletionClient>,
    headless: HeadlessConfig,
) -> (HeadlessHandle, JoinHandle<Result<(), String>>) {
    let (key_tx, key_rx) = mpsc::unbounded_channel();
    let (state_tx, state_rx) = watch::channel(HeadlessState::default());

    let task = tokio::spawn(async move {
        run_headless_loop(&config, client, headless, key_rx, state_tx)
            .await
            .map_err(|e| e.to_string())
    });

    (HeadlessHandle { key_tx, state_rx }, task)
}

async fn run_headless_loop(
    config: &Config,
    client: Arc<dyn CompletionClient>,
    headless: HeadlessConfig,
    mut key_rx: mpsc::UnboundedReceiver<KeyEvent>,
    state_tx: watch::Sender<HeadlessState>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let backend = TestBackend::new(headless.width, headless.height);
    let mut terminal = Terminal::new(backend)?;
    let mut app = App::new(config);

    let (turn_tx, mut turn_rx) = mpsc::unbounded_channel::<TurnEvent>();
    let mut turn: Option<JoinHandle<TurnOutcome>> = None;
    let tick = Duration::from_millis(headless.tick_rate_ms);

    loop {
        terminal.draw(|frame| {
            let area = frame.area();
            crate::draw(&app, area, frame.buffer_mut());
        })?;

        let _ = state_tx.send(HeadlessState {
            screen_contents: buffer_to_string(terminal.backend().buffer()),
            should_quit: app.should_quit,
            show_help: app.show_help,
            busy: app.conversation.is_busy(),
            message_count: app.conversation.messages().len(),
            draft: app.conversation.draft().to_string(),
            alert: app.conversation.alert().map(str::to_string),
        });

        if app.should_quit {
            if let Some(handle) = turn.take() {
                handle.abort();
            }
            break;
        }

        tokio::select! {
            key = key_rx.recv() => match key {
                Some(key) => {
                    if let Some(history) = app.handle_key(key) {
                        turn = Some(spawn_turn(Arc::clone(&client), history, turn_tx.clone()));
                    }
                }
                // Handle dropped
                None => break,
            },
            Some(event) = turn_rx.recv() => {
                app.apply_turn_event(event);
                while let Ok(event) = turn_rx.try_recv() {
                    app.apply_turn_event(event);
                }
            }
            Some(result) = crate::join_turn(&mut turn) => {
                turn = None;
                while let Ok(event) = turn_rx.try_recv() {
                    app.apply_turn_event(event);
                }
                app.finish_turn(result);
            }
            () = tokio::time::sleep(tick) => app.tick(),
        }
    }

    Ok(())
}

/// Convert a buffer to text, one line per row with trailing spaces removed.
pub fn buffer_to_string(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut result = String::new();

    for y in area.y..area.y + area.height {
        for x in area.x..area.x + area.width {
            if let Some(cell) = buffer.cell((x, y)) {
                result.push_str(cell.symbol());
            }
        }
        while result.ends_with(' ') {
            result.pop();
        }
        result.push('\n');
    }

    if result.ends_with('\n') {
        result.pop();
    }

    result
}
