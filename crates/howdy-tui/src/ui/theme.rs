//! Theme and styling definitions for the howdy TUI.
//!
//! Desert palette: amber background, rust accents, sand-coloured rows.

use ratatui::style::{Color, Modifier, Style};

/// Color palette for the TUI.
pub struct Palette;

impl Palette {
    // Base colors
    pub const BG: Color = Color::Rgb(40, 30, 20);
    pub const FG: Color = Color::Rgb(240, 228, 205);
    pub const DIM: Color = Color::Rgb(150, 135, 115);

    // Accent colors
    pub const ACCENT: Color = Color::Rgb(244, 163, 0);
    pub const RUST: Color = Color::Rgb(183, 65, 14);

    // Message rows
    pub const USER_ROW: Color = Color::Rgb(60, 45, 28);
    pub const ASSISTANT_ROW: Color = Color::Rgb(48, 36, 22);

    // Status bar colors (high contrast)
    pub const STATUS_BG: Color = Color::Rgb(70, 50, 30);
    pub const STATUS_KEY_BG: Color = Color::Rgb(229, 124, 36);

    pub const ERROR: Color = Color::Rgb(240, 100, 100);

    // Border colors
    pub const BORDER: Color = Color::Rgb(120, 85, 50);
    pub const BORDER_ACTIVE: Color = Color::Rgb(229, 124, 36);
}

/// Common styles used throughout the TUI.
pub struct Styles;

impl Styles {
    /// Default text style.
    pub fn default() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::BG)
    }

    /// Dimmed text for secondary information.
    pub fn dim() -> Style {
        Style::default().fg(Palette::DIM).bg(Palette::BG)
    }

    /// Highlighted/selected item.
    pub fn highlight() -> Style {
        Style::default()
            .fg(Palette::ACCENT)
            .bg(Palette::BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Active/focused element.
    pub fn active() -> Style {
        Style::default().fg(Palette::ACCENT).bg(Palette::BG)
    }

    /// Error text.
    pub fn error() -> Style {
        Style::default().fg(Palette::ERROR).bg(Palette::BG)
    }

    /// Title style.
    pub fn title() -> Style {
        Style::default()
            .fg(Palette::RUST)
            .add_modifier(Modifier::BOLD)
    }

    /// User message row.
    pub fn user_row() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::USER_ROW)
    }

    /// Assistant message row.
    pub fn assistant_row() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::ASSISTANT_ROW)
    }

    /// Badge next to user messages.
    pub fn user_badge() -> Style {
        Style::default()
            .fg(Palette::FG)
            .bg(Color::Black)
            .add_modifier(Modifier::BOLD)
    }

    /// Badge next to assistant messages.
    pub fn assistant_badge() -> Style {
        Style::default()
            .fg(Palette::RUST)
            .bg(Color::White)
            .add_modifier(Modifier::BOLD)
    }

    /// Key hint style (for status bar) - bright on dark for visibility.
    pub fn key_hint() -> Style {
        Style::default()
            .fg(Palette::BG)
            .bg(Palette::STATUS_KEY_BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Key hint label style - readable on status bar background.
    pub fn key_label() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::STATUS_BG)
    }

    /// Status bar background style.
    pub fn status_bar() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::STATUS_BG)
    }

    /// Border style for inactive elements.
    pub fn border() -> Style {
        Style::default().fg(Palette::BORDER)
    }

    /// Border style for active/focused elements.
    pub fn border_active() -> Style {
        Style::default().fg(Palette::BORDER_ACTIVE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_styles_differ_by_role() {
        assert_ne!(Styles::user_row(), Styles::assistant_row());
    }

    #[test]
    fn test_border_active_differs() {
        assert_ne!(Styles::border(), Styles::border_active());
    }
}
