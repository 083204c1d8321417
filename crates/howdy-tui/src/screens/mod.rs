//! Screen definitions for the howdy TUI.

pub mod chat;

use crate::app::App;
use crate::ui::centered_fixed;
use crate::ui::theme::Styles;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::Line,
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

/// Trait for screens that can be rendered.
pub trait Screen {
    /// Render the screen to the buffer.
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
}

const ALERT_HINT: &str = "Press any key to continue";

/// Render the help overlay.
pub fn render_help_overlay(area: Rect, buf: &mut Buffer) {
    let help_text = r"
  Chat
    Enter               Send the message
    Ctrl+J, Alt+Enter   Insert a newline
    Shift+Enter         Newline where supported
    Up/Down, PgUp/PgDn  Scroll the conversation
    Esc / Ctrl+C        Quit

  Examples (empty conversation)
    Tab                 Focus the example list
    Up/Down             Choose an example
    Enter               Copy it into the input

  [Press any key to close]
";

    let width = 54.min(area.width.saturating_sub(4));
    let height = 16.min(area.height.saturating_sub(2));
    let overlay_area = centered_fixed(width, height, area);

    Clear.render(overlay_area, buf);

    let block = Block::default()
        .title(" Help ")
        .title_style(Styles::title())
        .borders(Borders::ALL)
        .border_style(Styles::border_active())
        .style(Styles::default());

    Paragraph::new(help_text)
        .block(block)
        .style(Styles::default())
        .render(overlay_area, buf);
}

/// Render a blocking notification.
#[allow(clippy::cast_possible_truncation)]
pub fn render_alert_overlay(message: &str, area: Rect, buf: &mut Buffer) {
    let text_width = message.width().max(ALERT_HINT.width()) as u16;
    let width = text_width.saturating_add(6).min(area.width);
    let height = 6.min(area.height);
    let overlay_area = centered_fixed(width, height, area);

    Clear.render(overlay_area, buf);

    let block = Block::default()
        .title(" Alert ")
        .title_style(Styles::error())
        .borders(Borders::ALL)
        .border_style(Styles::error())
        .style(Styles::default());

    let lines = vec![
        Line::default(),
        Line::styled(format!("  {message}"), Styles::default()),
        Line::default(),
        Line::styled(format!("  {ALERT_HINT}"), Styles::dim()),
    ];

    Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .render(overlay_area, buf);
}
