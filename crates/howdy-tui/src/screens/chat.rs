//! The chat screen: welcome panel or message list, input form, footer, and
//! status bar.

use howdy_engine::{WELCOME_BLURB, WELCOME_TITLE};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use super::Screen;
use crate::app::{App, Focus};
use crate::icons::{icon, IconVariant};
use crate::ui::layout::chat_layout;
use crate::ui::theme::Styles;
use crate::ui::widgets::{KeyHint, StatusBar};
use crate::widgets::{ExamplePicker, InputBar, MessageList};

/// Main chat screen.
pub struct ChatScreen;

impl Screen for ChatScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, Styles::default());
        let layout = chat_layout(area, app.input.line_count());
        let icons = app.icon_style();

        if app.conversation.messages().is_empty() {
            render_welcome(app, layout.body, buf);
        } else {
            MessageList::new(app.conversation.messages(), icons)
                .pending(app.conversation.is_waiting())
                .scroll_back(app.scroll_back)
                .render(layout.body, buf);
        }

        InputBar::new(&app.input, icons)
            .focused(app.focus == Focus::Input)
            .busy(app.conversation.is_busy())
            .render(layout.input, buf);

        render_footer(app, layout.footer, buf);
        render_status_bar(app, layout.status, buf);
    }
}

fn render_welcome(app: &App, area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Styles::border());
    let inner = block.inner(area);
    block.render(area, buf);

    let picker = app.shows_examples().then(|| {
        ExamplePicker::new(&app.examples)
            .selected(app.selected_example)
            .focused(app.focus == Focus::Examples)
    });
    let picker_height = picker.as_ref().map_or(0, ExamplePicker::height);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(picker_height)])
        .split(inner);

    let greeting = Text::from(vec![
        Line::styled(WELCOME_TITLE, Styles::title()),
        Line::default(),
        Line::styled(WELCOME_BLURB, Styles::default()),
    ]);
    Paragraph::new(greeting)
        .wrap(Wrap { trim: true })
        .render(chunks[0], buf);

    if let Some(picker) = picker {
        picker.render(chunks[1], buf);
    }
}

fn render_footer(app: &App, area: Rect, buf: &mut Buffer) {
    let icons = app.icon_style();
    let line = Line::from(vec![
        icon(IconVariant::Vercel, icons),
        Span::styled(" Built with Vercel AI SDK   ", Styles::dim()),
        icon(IconVariant::Github, icons),
        Span::styled(" howdy", Styles::dim()),
    ])
    .alignment(Alignment::Center);
    Paragraph::new(line).render(area, buf);
}

fn render_status_bar(app: &App, area: Rect, buf: &mut Buffer) {
    let (mode, hints) = match app.focus {
        Focus::Input => {
            let mut hints = vec![
                KeyHint::new("Enter", "Send"),
                KeyHint::new("C-j", "Newline"),
            ];
            if app.shows_examples() {
                hints.push(KeyHint::new("Tab", "Examples"));
            }
            hints.push(KeyHint::new("F1", "Help"));
            ("CHAT", hints)
        }
        Focus::Examples => (
            "EXAMPLES",
            vec![
                KeyHint::new("Up/Down", "Select"),
                KeyHint::new("Enter", "Use"),
                KeyHint::new("Esc", "Back"),
            ],
        ),
    };

    let right = if app.conversation.is_busy() {
        "waiting for reply"
    } else if app.conversation.last_error().is_some() {
        "request failed"
    } else {
        app.endpoint_label.as_str()
    };

    StatusBar::new(mode)
        .hints(hints)
        .right(right)
        .render(area, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_app, render_screen_to_string};
    use howdy_engine::{Message, TurnEvent};

    fn app_with_reply() -> App {
        let mut app = create_test_app();
        app.input.set("hello");
        app.submit();
        app.apply_turn_event(TurnEvent::Fragment("Howdy, partner!".into()));
        app.apply_turn_event(TurnEvent::Finished);
        app
    }

    #[test]
    fn test_empty_conversation_shows_welcome_and_examples() {
        let app = create_test_app();
        let screen = render_screen_to_string(&ChatScreen, &app);

        assert!(screen.contains("Well, hey there, partner!"));
        assert!(screen.contains("Try an example"));
        assert!(screen.contains("Yeehaw"));
        assert!(screen.contains("Send a message"));
        assert!(screen.contains("Built with Vercel AI SDK"));
        assert!(screen.contains(" CHAT "));
        assert!(screen.contains("C-j"));
        assert!(!screen.contains("S-Enter"));
        assert!(screen.contains("gpt-3.5-turbo"));
    }

    #[test]
    fn test_messages_replace_welcome() {
        let app = app_with_reply();
        let screen = render_screen_to_string(&ChatScreen, &app);

        assert!(!screen.contains("Try an example"));
        assert!(screen.contains("[U] You"));
        assert!(screen.contains("HOWDY"));
        assert!(screen.contains("Howdy, partner!"));
        assert!(!screen.contains(" Tab "));
    }

    #[test]
    fn test_busy_status() {
        let mut app = create_test_app();
        app.input.set("hello");
        app.submit();
        let screen = render_screen_to_string(&ChatScreen, &app);
        assert!(screen.contains("waiting for reply"));
        assert!(screen.contains("HOWDY"));
        assert_eq!(app.conversation.messages(), &[Message::user("hello")]);
    }

    #[test]
    fn test_failed_request_status() {
        let mut app = create_test_app();
        app.input.set("hello");
        app.submit();
        app.apply_turn_event(TurnEvent::Failed("connection refused".into()));
        let screen = render_screen_to_string(&ChatScreen, &app);
        assert!(screen.contains("request failed"));
    }

    #[test]
    fn test_examples_focus_changes_mode() {
        let mut app = create_test_app();
        app.focus = Focus::Examples;
        let screen = render_screen_to_string(&ChatScreen, &app);
        assert!(screen.contains(" EXAMPLES "));
        assert!(screen.contains("Select"));
    }

    #[test]
    fn test_empty_examples_hide_picker() {
        let mut app = create_test_app();
        app.examples.clear();
        let screen = render_screen_to_string(&ChatScreen, &app);
        assert!(screen.contains("Well, hey there, partner!"));
        assert!(!screen.contains("Try an example"));
    }
}
