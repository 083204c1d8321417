//! Example prompt picker shown while the conversation is empty.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::ui::theme::Styles;

/// Marker in front of the selected example.
const SELECTED_MARKER: &str = "> ";
const UNSELECTED_MARKER: &str = "  ";

/// Selectable list of example prompts.
pub struct ExamplePicker<'a> {
    examples: &'a [String],
    selected: usize,
    focused: bool,
}

impl<'a> ExamplePicker<'a> {
    pub fn new(examples: &'a [String]) -> Self {
        Self {
            examples,
            selected: 0,
            focused: false,
        }
    }

    #[must_use]
    pub fn selected(mut self, index: usize) -> Self {
        self.selected = index;
        self
    }

    #[must_use]
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Rows needed to draw every example, borders included.
    #[allow(clippy::cast_possible_truncation)]
    pub fn height(&self) -> u16 {
        (self.examples.len() as u16).saturating_add(2)
    }
}

impl Widget for ExamplePicker<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Styles::border_active()
        } else {
            Styles::border()
        };
        let block = Block::default()
            .title(" Try an example (Tab) ")
            .title_style(if self.focused {
                Styles::highlight()
            } else {
                Styles::dim()
            })
            .borders(Borders::ALL)
            .border_style(border_style);

        let lines: Vec<Line<'_>> = self
            .examples
            .iter()
            .enumerate()
            .map(|(i, example)| {
                if self.focused && i == self.selected {
                    Line::from(vec![
                        Span::styled(SELECTED_MARKER, Styles::highlight()),
                        Span::styled(example.as_str(), Styles::highlight()),
                    ])
                } else {
                    Line::from(vec![
                        Span::raw(UNSELECTED_MARKER),
                        Span::styled(example.as_str(), Styles::default()),
                    ])
                }
            })
            .collect();

        // One row per example; long prompts are cut at the border
        Paragraph::new(lines).block(block).render(area, buf);
    }
}
