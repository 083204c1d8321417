//! Icons for Nerd Fonts, Unicode, and ASCII fallback.
//!
//! Every icon goes through [`icon`], which takes the variant and a style;
//! there is no per-icon function.

use howdy_engine::IconMode;
use ratatui::text::Span;

use crate::ui::theme::Styles;

/// Icons the chat surface can draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconVariant {
    Vercel,
    Github,
    Loading,
    Send,
    User,
}

impl IconVariant {
    pub const ALL: [IconVariant; 5] = [
        IconVariant::Vercel,
        IconVariant::Github,
        IconVariant::Loading,
        IconVariant::Send,
        IconVariant::User,
    ];
}

/// How an icon is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IconStyle {
    /// Glyph set.
    pub mode: IconMode,
    /// Draw in the muted colour.
    pub dimmed: bool,
    /// Animation frame; only [`IconVariant::Loading`] uses it.
    pub frame: usize,
}

impl IconStyle {
    pub fn new(mode: IconMode) -> Self {
        Self {
            mode,
            dimmed: false,
            frame: 0,
        }
    }

    #[must_use]
    pub fn dimmed(mut self, dimmed: bool) -> Self {
        self.dimmed = dimmed;
        self
    }

    #[must_use]
    pub fn frame(mut self, frame: usize) -> Self {
        self.frame = frame;
        self
    }
}

/// Pick the glyph set, forcing ASCII when `NO_COLOR` is set.
pub fn resolve_mode(configured: IconMode, no_color: bool) -> IconMode {
    if no_color {
        IconMode::Ascii
    } else {
        configured
    }
}

/// Spinner animation frames for the loading icon.
pub fn spinner_frames(mode: IconMode) -> &'static [&'static str] {
    match mode {
        IconMode::Nerd => &["󰪞", "󰪟", "󰪠", "󰪡", "󰪢", "󰪣"],
        IconMode::Unicode => &["◐", "◓", "◑", "◒"],
        IconMode::Ascii => &["|", "/", "-", "\\"],
    }
}

/// Raw glyph for a variant.
pub fn glyph(variant: IconVariant, style: IconStyle) -> &'static str {
    match (variant, style.mode) {
        (IconVariant::Loading, mode) => {
            let frames = spinner_frames(mode);
            frames[style.frame % frames.len()]
        }
        (IconVariant::Vercel, IconMode::Nerd | IconMode::Unicode) => "▲",
        (IconVariant::Vercel, IconMode::Ascii) => "^",
        (IconVariant::Github, IconMode::Nerd) => "\u{f09b}",
        (IconVariant::Github, IconMode::Unicode) => "⎇",
        (IconVariant::Github, IconMode::Ascii) => "gh",
        (IconVariant::Send, IconMode::Nerd) => "󰒊",
        (IconVariant::Send, IconMode::Unicode) => "➤",
        (IconVariant::Send, IconMode::Ascii) => ">",
        (IconVariant::User, IconMode::Nerd) => "\u{f007}",
        (IconVariant::User, IconMode::Unicode) => "◆",
        (IconVariant::User, IconMode::Ascii) => "[U]",
    }
}

/// Render an icon as a styled span.
pub fn icon(variant: IconVariant, style: IconStyle) -> Span<'static> {
    let text_style = if style.dimmed {
        Styles::dim()
    } else {
        match variant {
            IconVariant::Loading | IconVariant::Send => Styles::active(),
            IconVariant::User => Styles::user_badge(),
            IconVariant::Vercel | IconVariant::Github => Styles::default(),
        }
    };
    Span::styled(glyph(variant, style), text_style)
}
