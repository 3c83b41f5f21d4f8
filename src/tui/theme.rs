//! TUI color semantics and style constants.
//!
//! Centralized so every face, control and overlay speaks the same palette.
//!
//! Color semantics:
//! - Magenta: the card itself (cover, title bar, question)
//! - Red: hearts and the "No" button
//! - Green: the "Yes" button
//! - Cyan: interactive elements (controls, hints, start overlay)
//! - Dim: de-emphasized (eyebrows, media placeholders, disabled controls)
//! - Bold: headings

use ratatui::style::{Color, Modifier, Style};

// ============================================================================
// SEMANTIC STYLES
// ============================================================================

/// Interactive element / keybinding hint — cyan.
pub const STYLE_INTERACTIVE: Style = Style::new().fg(Color::Cyan);

/// De-emphasized text — dark gray.
pub const STYLE_DIM: Style = Style::new().fg(Color::DarkGray);

/// Control that currently does nothing.
pub const STYLE_DISABLED: Style = Style::new()
    .fg(Color::DarkGray)
    .add_modifier(Modifier::CROSSED_OUT);

// ============================================================================
// PAGE STYLES
// ============================================================================

/// Title bar.
pub const STYLE_TITLE: Style = Style::new().fg(Color::Magenta).add_modifier(Modifier::BOLD);

/// Cover lettering.
pub const STYLE_COVER: Style = Style::new()
    .fg(Color::LightMagenta)
    .add_modifier(Modifier::BOLD);

/// Small label above a face's title.
pub const STYLE_EYEBROW: Style = Style::new()
    .fg(Color::DarkGray)
    .add_modifier(Modifier::ITALIC);

/// Face title.
pub const STYLE_HEADING: Style = Style::new().add_modifier(Modifier::BOLD);

/// Hero title on a face with a signature.
pub const STYLE_HERO: Style = Style::new()
    .fg(Color::LightMagenta)
    .add_modifier(Modifier::BOLD);

pub const STYLE_SIGNATURE: Style = Style::new()
    .fg(Color::Magenta)
    .add_modifier(Modifier::ITALIC);

/// Media caption or image reference.
pub const STYLE_MEDIA: Style = Style::new().fg(Color::DarkGray);

/// Leaf border.
pub const STYLE_BORDER: Style = Style::new().fg(Color::Gray);

/// Leaf border while the page bends.
pub const STYLE_CURL: Style = Style::new().fg(Color::Yellow);

// ============================================================================
// PROMPT STYLES
// ============================================================================

pub const STYLE_QUESTION: Style = Style::new()
    .fg(Color::LightMagenta)
    .add_modifier(Modifier::BOLD);

pub const STYLE_YES: Style = Style::new().fg(Color::Green).add_modifier(Modifier::BOLD);

pub const STYLE_NO: Style = Style::new().fg(Color::Red);

pub const STYLE_RESPONSE: Style = Style::new().add_modifier(Modifier::ITALIC);

// ============================================================================
// OVERLAY STYLES
// ============================================================================

pub const STYLE_HEART: Style = Style::new().fg(Color::Red);

pub const STYLE_HEART_LARGE: Style = Style::new().fg(Color::LightRed).add_modifier(Modifier::BOLD);

pub const STYLE_START: Style = Style::new()
    .fg(Color::Black)
    .bg(Color::Cyan)
    .add_modifier(Modifier::BOLD);

/// Footer / help line.
pub const STYLE_HELP: Style = Style::new().fg(Color::DarkGray);

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_buttons_are_distinguishable() {
        assert_eq!(STYLE_YES.fg, Some(Color::Green));
        assert_eq!(STYLE_NO.fg, Some(Color::Red));
        assert_ne!(STYLE_YES, STYLE_NO);
    }

    #[test]
    fn disabled_controls_are_dimmed() {
        assert_eq!(STYLE_DISABLED.fg, Some(Color::DarkGray));
        assert!(STYLE_DISABLED.add_modifier.contains(Modifier::CROSSED_OUT));
    }

    #[test]
    fn headings_are_bold() {
        assert!(STYLE_HEADING.add_modifier.contains(Modifier::BOLD));
        assert!(STYLE_HERO.add_modifier.contains(Modifier::BOLD));
    }
}
