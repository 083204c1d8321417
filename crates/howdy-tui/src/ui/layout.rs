//! Layout helpers for the howdy TUI.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Rows the input form may grow to, borders included.
pub const MAX_INPUT_HEIGHT: u16 = 8;

/// Create a centered rect with fixed dimensions.
pub fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

/// Areas of the chat screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatLayout {
    pub body: Rect,
    pub input: Rect,
    pub footer: Rect,
    pub status: Rect,
}

/// Split the screen into body, input form, footer line, and status bar.
///
/// `input_lines` is the number of draft lines; the form grows with it up to
/// [`MAX_INPUT_HEIGHT`].
#[allow(clippy::cast_possible_truncation)]
pub fn chat_layout(area: Rect, input_lines: usize) -> ChatLayout {
    let input_height = (input_lines.max(1) as u16)
        .saturating_add(2)
        .min(MAX_INPUT_HEIGHT);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(input_height),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);
    ChatLayout {
        body: chunks[0],
        input: chunks[1],
        footer: chunks[2],
        status: chunks[3],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_fixed() {
        let area = Rect::new(0, 0, 80, 24);
        let centered = centered_fixed(40, 10, area);
        assert_eq!(centered, Rect::new(20, 7, 40, 10));
    }

    #[test]
    fn test_centered_fixed_clamps_to_area() {
        let area = Rect::new(0, 0, 20, 5);
        let centered = centered_fixed(40, 10, area);
        assert_eq!(centered.width, 20);
        assert_eq!(centered.height, 5);
    }

    #[test]
    fn test_chat_layout_single_line_input() {
        let layout = chat_layout(Rect::new(0, 0, 80, 24), 1);
        assert_eq!(layout.input.height, 3);
        assert_eq!(layout.footer.height, 1);
        assert_eq!(layout.status.y, 23);
        assert_eq!(layout.body.height, 24 - 3 - 1 - 1);
    }

    #[test]
    fn test_chat_layout_input_growth_is_capped() {
        let layout = chat_layout(Rect::new(0, 0, 80, 24), 40);
        assert_eq!(layout.input.height, MAX_INPUT_HEIGHT);
    }
}
