//! Event handling for the howdy TUI.

use crossterm::event::{
    self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent,
};
use std::time::Duration;
use tokio::sync::mpsc;

/// Events that can occur in the TUI.
#[derive(Debug, Clone)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// A mouse event occurred.
    Mouse(MouseEvent),
    /// A tick event for UI updates.
    Tick,
    /// Terminal was resized.
    Resize(u16, u16),
}

/// Terminal event source running on a background thread.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    _tx: mpsc::UnboundedSender<Event>,
}

impl EventHandler {
    /// Create a new event handler with the specified tick rate.
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let tx_clone = tx.clone();

        // crossterm polling blocks, so it gets its own thread
        std::thread::spawn(move || {
            let tick_rate = Duration::from_millis(tick_rate_ms);
            loop {
                if event::poll(tick_rate).unwrap_or(false) {
                    if let Ok(evt) = event::read() {
                        let event = match evt {
                            // Windows reports releases too
                            CrosstermEvent::Key(key) if key.kind != KeyEventKind::Release => {
                                Some(Event::Key(key))
                            }
                            CrosstermEvent::Mouse(mouse) => Some(Event::Mouse(mouse)),
                            CrosstermEvent::Resize(w, h) => Some(Event::Resize(w, h)),
                            _ => None,
                        };
                        if let Some(e) = event {
                            if tx_clone.send(e).is_err() {
                                break;
                            }
                        }
                    }
                } else if tx_clone.send(Event::Tick).is_err() {
                    break;
                }
            }
        });

        Self { rx, _tx: tx }
    }

    /// Get the next event, waiting until one is available.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

/// Key action that can be performed in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Help,
    /// Submit the draft, or pick the selected example.
    Submit,
    Newline,
    Back,
    ToggleFocus,
    Up,
    Down,
    PageUp,
    PageDown,
    None,
}

/// Convert a non-text key event to an action.
pub fn key_to_action(key: KeyEvent) -> Action {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    if ctrl && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }

    // Ctrl+J arrives as a plain line feed in many terminals
    if ctrl && key.code == KeyCode::Char('j') {
        return Action::Newline;
    }

    match key.code {
        KeyCode::Enter
            if key
                .modifiers
                .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT | KeyModifiers::CONTROL) =>
        {
            Action::Newline
        }
        KeyCode::Enter => Action::Submit,
        KeyCode::Esc => Action::Back,
        KeyCode::Tab | KeyCode::BackTab => Action::ToggleFocus,
        KeyCode::Up => Action::Up,
        KeyCode::Down => Action::Down,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        KeyCode::F(1) => Action::Help,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_plain_enter_submits() {
        assert_eq!(
            key_to_action(key(KeyCode::Enter, KeyModifiers::NONE)),
            Action::Submit
        );
    }

    #[test]
    fn test_modified_enter_inserts_newline() {
        for modifiers in [KeyModifiers::SHIFT, KeyModifiers::ALT, KeyModifiers::CONTROL] {
            assert_eq!(
                key_to_action(key(KeyCode::Enter, modifiers)),
                Action::Newline,
                "{modifiers:?}"
            );
        }
        assert_eq!(
            key_to_action(key(KeyCode::Char('j'), KeyModifiers::CONTROL)),
            Action::Newline
        );
    }

    #[test]
    fn test_ctrl_c_quits() {
        assert_eq!(
            key_to_action(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
    }

    #[test]
    fn test_plain_characters_are_not_actions() {
        assert_eq!(
            key_to_action(key(KeyCode::Char('q'), KeyModifiers::NONE)),
            Action::None
        );
        assert_eq!(
            key_to_action(key(KeyCode::Char('?'), KeyModifiers::NONE)),
            Action::None
        );
    }

    #[test]
    fn test_navigation_keys() {
        assert_eq!(key_to_action(key(KeyCode::Tab, KeyModifiers::NONE)), Action::ToggleFocus);
        assert_eq!(key_to_action(key(KeyCode::BackTab, KeyModifiers::SHIFT)), Action::ToggleFocus);
        assert_eq!(key_to_action(key(KeyCode::PageUp, KeyModifiers::NONE)), Action::PageUp);
        assert_eq!(key_to_action(key(KeyCode::F(1), KeyModifiers::NONE)), Action::Help);
        assert_eq!(key_to_action(key(KeyCode::Esc, KeyModifiers::NONE)), Action::Back);
    }
}
