//! Message list widget.
//!
//! One row block per message, keyed by position:
//!
//! ```text
//! [U] You
//!   hello
//!
//!  HOWDY
//!   Howdy, partner! Pull up a
//!   chair.
//! ```
//!
//! The view sticks to the bottom unless scrolled back.

use howdy_engine::{Message, Role, ASSISTANT_NAME};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Widget,
};

use crate::icons::{icon, IconStyle, IconVariant};
use crate::ui::theme::Styles;

/// Indent for message content under the badge line.
const CONTENT_INDENT: &str = "  ";

/// A rendered line and the row style it belongs to.
struct RowLine {
    line: Line<'static>,
    row_style: Style,
}

/// Scrollable list of conversation messages.
pub struct MessageList<'a> {
    messages: &'a [Message],
    icons: IconStyle,
    pending: bool,
    scroll_back: usize,
}

impl<'a> MessageList<'a> {
    pub fn new(messages: &'a [Message], icons: IconStyle) -> Self {
        Self {
            messages,
            icons,
            pending: false,
            scroll_back: 0,
        }
    }

    /// Show a reply row with the loading icon below the last message.
    #[must_use]
    pub fn pending(mut self, pending: bool) -> Self {
        self.pending = pending;
        self
    }

    /// Lines scrolled back from the bottom.
    #[must_use]
    pub fn scroll_back(mut self, lines: usize) -> Self {
        self.scroll_back = lines;
        self
    }

    /// Total rendered height for a given width.
    pub fn total_lines(&self, width: u16) -> usize {
        self.build_lines(width).len()
    }

    fn header(&self, role: Role) -> Line<'static> {
        match role {
            Role::User => Line::from(vec![
                icon(IconVariant::User, self.icons),
                Span::styled(" You", Styles::user_row()),
            ]),
            Role::Assistant => Line::from(Span::styled(
                format!(" {ASSISTANT_NAME} "),
                Styles::assistant_badge(),
            )),
        }
    }

    fn build_lines(&self, width: u16) -> Vec<RowLine> {
        let wrap_width = usize::from(width)
            .saturating_sub(CONTENT_INDENT.len())
            .max(1);
        let mut rows = Vec::new();

        for (i, message) in self.messages.iter().enumerate() {
            let row_style = match message.role {
                Role::User => Styles::user_row(),
                Role::Assistant => Styles::assistant_row(),
            };

            if i > 0 {
                rows.push(RowLine {
                    line: Line::default(),
                    row_style: Styles::default(),
                });
            }

            rows.push(RowLine {
                line: self.header(message.role),
                row_style,
            });

            for wrapped in textwrap::wrap(&message.content, wrap_width) {
                rows.push(RowLine {
                    line: Line::from(format!("{CONTENT_INDENT}{wrapped}")),
                    row_style,
                });
            }
        }

        if self.pending {
            let row_style = Styles::assistant_row();
            if !rows.is_empty() {
                rows.push(RowLine {
                    line: Line::default(),
                    row_style: Styles::default(),
                });
            }
            rows.push(RowLine {
                line: self.header(Role::Assistant),
                row_style,
            });
            rows.push(RowLine {
                line: Line::from(vec![
                    Span::raw(CONTENT_INDENT),
                    icon(IconVariant::Loading, self.icons),
                ]),
                row_style,
            });
        }

        rows
    }
}

impl Widget for MessageList<'_> {
    #[allow(clippy::cast_possible_truncation)]
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let rows = self.build_lines(area.width);
        let height = usize::from(area.height);
        let max_scroll = rows.len().saturating_sub(height);
        let top = max_scroll - self.scroll_back.min(max_scroll);

        for (offset, row) in rows.iter().skip(top).take(height).enumerate() {
            let y = area.y + offset as u16;
            let row_area = Rect::new(area.x, y, area.width, 1);
            buf.set_style(row_area, row.row_style);
            buf.set_line(area.x, y, &row.line, area.width);
        }
    }
}
