//! Application state and update logic for the howdy TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use howdy_engine::{Config, Conversation, IconMode, Message, TurnEvent, TurnOutcome, WireFormat};
use tokio::task::JoinError;
use tracing::{debug, warn};

use crate::event::{key_to_action, Action};
use crate::icons::{resolve_mode, IconStyle};
use crate::ui::widgets::TextInputState;

/// Lines moved by PageUp/PageDown.
const PAGE_LINES: usize = 10;

/// Which part of the screen receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Input,
    Examples,
}

/// Application state.
#[derive(Debug)]
pub struct App {
    /// Whether the app should quit.
    pub should_quit: bool,

    /// Whether the help overlay is visible.
    pub show_help: bool,

    /// Messages, draft, busy flag, pending alert.
    pub conversation: Conversation,

    /// Editing buffer mirrored into the conversation draft.
    pub input: TextInputState,

    pub focus: Focus,

    /// Example prompts offered while the conversation is empty.
    pub examples: Vec<String>,

    /// Highlighted example in the picker.
    pub selected_example: usize,

    /// Glyph set for icons.
    pub icon_mode: IconMode,

    /// Loading animation frame, advanced on ticks while busy.
    pub spinner_frame: usize,

    /// Lines scrolled back from the bottom of the message list.
    pub scroll_back: usize,

    /// Endpoint summary for the status bar.
    pub endpoint_label: String,
}

impl App {
    /// Create the app from configuration.
    pub fn new(config: &Config) -> Self {
        let no_color = std::env::var_os("NO_COLOR").is_some();
        let endpoint_label = match config.endpoint.format {
            WireFormat::OpenAiChat => config.endpoint.model.clone(),
            WireFormat::TextStream => WireFormat::TextStream.as_str().to_string(),
        };

        Self {
            should_quit: false,
            show_help: false,
            conversation: Conversation::new(),
            input: TextInputState::new(),
            focus: Focus::Input,
            examples: config.examples.clone(),
            selected_example: 0,
            icon_mode: resolve_mode(config.icons, no_color),
            spinner_frame: 0,
            scroll_back: 0,
            endpoint_label,
        }
    }

    /// Create an app for tests: default config, ASCII icons.
    #[cfg(test)]
    pub fn new_for_test() -> Self {
        let mut app = Self::new(&Config::default());
        app.icon_mode = IconMode::Ascii;
        app
    }

    /// Icon style for the current frame.
    pub fn icon_style(&self) -> IconStyle {
        IconStyle::new(self.icon_mode).frame(self.spinner_frame)
    }

    /// Whether the empty-state picker is on screen.
    pub fn shows_examples(&self) -> bool {
        self.conversation.messages().is_empty() && !self.examples.is_empty()
    }

    /// Handle a key press.
    ///
    /// Returns the history to send when the key started a new turn.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Vec<Message>> {
        // The alert is modal; any key dismisses it
        if self.conversation.alert().is_some() {
            self.conversation.take_alert();
            return None;
        }

        if self.focus == Focus::Input && self.handle_edit_key(key) {
            return None;
        }

        self.handle_action(key_to_action(key))
    }

    /// Handle an action. Returns the history to send when a turn starts.
    pub fn handle_action(&mut self, action: Action) -> Option<Vec<Message>> {
        match action {
            Action::Quit => {
                if self.show_help {
                    self.show_help = false;
                } else {
                    self.should_quit = true;
                }
                return None;
            }
            Action::Help => {
                self.show_help = !self.show_help;
                return None;
            }
            _ => {}
        }

        // If help is showing, any key closes it
        if self.show_help {
            self.show_help = false;
            return None;
        }

        match self.focus {
            Focus::Input => self.handle_input_action(action),
            Focus::Examples => {
                self.handle_examples_action(action);
                None
            }
        }
    }

    fn handle_input_action(&mut self, action: Action) -> Option<Vec<Message>> {
        match action {
            Action::Submit => return self.submit(),
            Action::Newline => {
                self.input.insert('\n');
                self.sync_draft();
            }
            Action::Back => self.should_quit = true,
            Action::ToggleFocus => {
                if self.shows_examples() {
                    self.focus = Focus::Examples;
                }
            }
            Action::Up => self.scroll_up(1),
            Action::Down => self.scroll_down(1),
            Action::PageUp => self.scroll_up(PAGE_LINES),
            Action::PageDown => self.scroll_down(PAGE_LINES),
            Action::Quit | Action::Help | Action::None => {}
        }
        None
    }

    fn handle_examples_action(&mut self, action: Action) {
        match action {
            Action::Up => {
                self.selected_example = self.selected_example.saturating_sub(1);
            }
            Action::Down => {
                if self.selected_example + 1 < self.examples.len() {
                    self.selected_example += 1;
                }
            }
            Action::Submit => self.pick_example(self.selected_example),
            Action::Back | Action::ToggleFocus => self.focus = Focus::Input,
            _ => {}
        }
    }

    /// Text editing keys for the input. Returns true if the key was consumed.
    fn handle_edit_key(&mut self, key: KeyEvent) -> bool {
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return false;
        }

        match key.code {
            KeyCode::Char(c) => self.input.insert(c),
            KeyCode::Backspace => self.input.backspace(),
            KeyCode::Delete => self.input.delete(),
            KeyCode::Left => self.input.move_left(),
            KeyCode::Right => self.input.move_right(),
            KeyCode::Home => self.input.move_home(),
            KeyCode::End => self.input.move_end(),
            _ => return false,
        }
        self.sync_draft();
        true
    }

    /// Put an example into the draft and return focus to the input.
    pub fn pick_example(&mut self, index: usize) {
        if let Some(example) = self.examples.get(index) {
            self.conversation.set_draft(example.as_str());
            self.input.set(example.as_str());
            self.focus = Focus::Input;
        }
    }

    /// Submit the current draft. Returns the history to send.
    pub fn submit(&mut self) -> Option<Vec<Message>> {
        self.sync_draft();
        let history = self.conversation.submit()?;
        self.input.clear();
        self.scroll_back = 0;
        self.focus = Focus::Input;
        Some(history)
    }

    /// Apply progress of the in-flight request.
    pub fn apply_turn_event(&mut self, event: TurnEvent) -> Option<TurnOutcome> {
        let outcome = self.conversation.apply(event);
        if let Some(outcome) = outcome {
            debug!(?outcome, "turn finished");
            self.spinner_frame = 0;
        }
        outcome
    }

    /// Settle a request task that has ended.
    ///
    /// Queued events must be applied first. A task that died without a
    /// terminal event fails the turn so the input unlocks.
    pub fn finish_turn(&mut self, result: Result<TurnOutcome, JoinError>) {
        match result {
            Ok(outcome) => debug!(?outcome, "request task ended"),
            Err(err) if err.is_cancelled() => debug!("request task cancelled"),
            Err(err) => {
                warn!(%err, "request task died");
                self.apply_turn_event(TurnEvent::Failed(format!("request task failed: {err}")));
            }
        }
    }

    /// Advance animations.
    pub fn tick(&mut self) {
        if self.conversation.is_busy() {
            self.spinner_frame = self.spinner_frame.wrapping_add(1);
        }
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_back = self.scroll_back.saturating_add(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_back = self.scroll_back.saturating_sub(lines);
    }

    fn sync_draft(&mut self) {
        if self.input.content() != self.conversation.draft() {
            self.conversation.set_draft(self.input.content());
        }
    }
}
