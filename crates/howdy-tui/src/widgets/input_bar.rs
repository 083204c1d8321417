//! Input form widget.
//!
//! Multi-line draft on the left, send control on the right. The send control
//! shows the loading spinner while a request is in flight and is dimmed when
//! there is nothing to send.

use howdy_engine::INPUT_PLACEHOLDER;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::icons::{icon, IconStyle, IconVariant};
use crate::ui::theme::Styles;
use crate::ui::widgets::TextInputState;

/// Columns reserved on the right for the send control.
const SEND_COLUMNS: u16 = 3;

const CURSOR: &str = "█";

/// Input form bound to the draft.
pub struct InputBar<'a> {
    input: &'a TextInputState,
    icons: IconStyle,
    focused: bool,
    busy: bool,
}

impl<'a> InputBar<'a> {
    /// Create a new input bar widget.
    pub fn new(input: &'a TextInputState, icons: IconStyle) -> Self {
        Self {
            input,
            icons,
            focused: false,
            busy: false,
        }
    }

    /// Set whether the input bar is focused.
    #[must_use]
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Set whether a request is in flight.
    #[must_use]
    pub fn busy(mut self, busy: bool) -> Self {
        self.busy = busy;
        self
    }

    /// The send control as it should currently appear.
    pub fn send_control(&self) -> Span<'static> {
        if self.busy {
            icon(IconVariant::Loading, self.icons)
        } else {
            icon(
                IconVariant::Send,
                self.icons.dimmed(self.input.is_empty()),
            )
        }
    }

    /// Build display lines and the index of the line holding the cursor.
    fn build_lines(&self) -> (Vec<Line<'static>>, usize) {
        if self.input.is_empty() {
            let mut spans = Vec::new();
            if self.focused {
                spans.push(Span::styled(CURSOR, Styles::active()));
            }
            spans.push(Span::styled(INPUT_PLACEHOLDER, Styles::dim()));
            return (vec![Line::from(spans)], 0);
        }

        let (cursor_line, cursor_col) = self.input.cursor_line_col();
        let lines = self
            .input
            .content()
            .split('\n')
            .enumerate()
            .map(|(idx, text)| {
                if self.focused && idx == cursor_line {
                    let split = text
                        .char_indices()
                        .nth(cursor_col)
                        .map_or(text.len(), |(i, _)| i);
                    Line::from(vec![
                        Span::raw(text[..split].to_string()),
                        Span::styled(CURSOR, Styles::active()),
                        Span::raw(text[split..].to_string()),
                    ])
                } else {
                    Line::from(text.to_string())
                }
            })
            .collect();

        (lines, cursor_line)
    }
}

impl Widget for InputBar<'_> {
    #[allow(clippy::cast_possible_truncation)]
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Styles::border_active()
        } else {
            Styles::border()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style);
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width <= SEND_COLUMNS || inner.height == 0 {
            return;
        }

        let text_area = Rect::new(
            inner.x,
            inner.y,
            inner.width - SEND_COLUMNS,
            inner.height,
        );
        let (lines, cursor_line) = self.build_lines();

        // Keep the cursor line visible
        let visible = usize::from(text_area.height);
        let scroll = cursor_line.saturating_sub(visible.saturating_sub(1));

        Paragraph::new(lines)
            .style(Styles::default())
            .scroll((scroll as u16, 0))
            .render(text_area, buf);

        let send = Line::from(self.send_control());
        let send_x = inner.x + inner.width - SEND_COLUMNS + 1;
        buf.set_line(send_x, inner.y, &send, SEND_COLUMNS - 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::buffer_to_string;
    use howdy_engine::IconMode;

    fn render(bar: InputBar<'_>, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        bar.render(area, &mut buf);
        buffer_to_string(&buf)
    }

    fn ascii() -> IconStyle {
        IconStyle::new(IconMode::Ascii)
    }

    #[test]
    fn test_empty_shows_placeholder_and_dim_send() {
        let input = TextInputState::new();
        let bar = InputBar::new(&input, ascii()).focused(true);
        assert_eq!(bar.send_control().style, Styles::dim());

        let text = render(bar, 30, 3);
        let row = text.lines().nth(1).unwrap();
        assert_eq!(row, "│█Send a message           > │");
    }

    #[test]
    fn test_draft_enables_send() {
        let mut input = TextInputState::new();
        input.set("howdy");
        let bar = InputBar::new(&input, ascii());
        assert_eq!(bar.send_control().style, Styles::active());
        assert_eq!(bar.send_control().content, ">");

        let text = render(bar, 30, 3);
        assert!(text.contains("│howdy"));
    }

    #[test]
    fn test_busy_shows_spinner() {
        let mut input = TextInputState::new();
        input.set("next question");
        let bar = InputBar::new(&input, ascii().frame(2)).busy(true);
        assert_eq!(bar.send_control().content, "-");
    }

    #[test]
    fn test_cursor_inside_multiline_draft() {
        let mut input = TextInputState::new();
        input.set("one\ntwo");
        input.move_left();
        let text = render(InputBar::new(&input, ascii()).focused(true), 30, 4);
        let rows: Vec<&str> = text.lines().collect();
        assert!(rows[1].starts_with("│one "));
        assert!(rows[2].starts_with("│tw█o"));
    }

    #[test]
    fn test_cursor_line_scrolls_into_view() {
        let mut input = TextInputState::new();
        input.set("a\nb\nc\nd");
        let text = render(InputBar::new(&input, ascii()).focused(true), 30, 3);
        assert!(text.contains("│d█"));
        assert!(!text.contains("│a"));
    }
}
