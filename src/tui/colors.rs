//! TUI color scheme integration.
//!
//! Converts the RGB strings stored in
//! [`Config::colourscheme`](crate::config::Config) into Ratatui [`Style`]s,
//! so the editor matches the colours of the command line output.

use ratatui::style::{Color, Modifier, Style};

use crate::cli_pretty_printing::parse_rgb;
use crate::config::Config;

/// TUI color styles derived from the configuration.
#[derive(Debug, Clone)]
pub struct TuiColors {
    /// Style for success messages and enabled items.
    /// Derived from the "success" colorscheme key.
    pub success: Style,

    /// Style for disabled fields.
    /// Derived from the "warning" colorscheme key.
    pub warning: Style,

    /// Style for validation errors.
    /// Derived from the "error" colorscheme key, falls back to red.
    pub error: Style,

    /// Style for normal text content.
    pub text: Style,

    /// Style for secondary text such as tooltips and hints.
    pub muted: Style,

    /// Style for the value being edited.
    pub highlight: Style,

    /// Style for borders and dividers.
    pub border: Style,

    /// Accent color for selected items and key hints.
    pub accent: Style,

    /// Style for titles in panels and boxes.
    pub title: Style,

    /// Style for field labels.
    pub label: Style,

    /// Style for values that open a picker.
    pub info: Style,
}

impl TuiColors {
    /// Creates a [`TuiColors`] instance from the given configuration.
    ///
    /// Missing or malformed colours fall back to the defaults.
    pub fn from_config(config: &Config) -> Self {
        let pick = |role: &str, fallback: Color| {
            config
                .colourscheme
                .get(role)
                .and_then(|s| parse_color_string(s))
                .unwrap_or(fallback)
        };

        let informational = pick("informational", Color::Rgb(255, 215, 0));
        let success = pick("success", Color::Rgb(0, 255, 0));
        let warning = pick("warning", Color::Rgb(255, 165, 0));
        let error = pick("error", Color::Rgb(255, 0, 0));

        Self::with_palette(informational, success, warning, error)
    }

    fn with_palette(informational: Color, success: Color, warning: Color, error: Color) -> Self {
        Self {
            success: Style::default().fg(success),
            warning: Style::default().fg(warning),
            error: Style::default().fg(error),
            text: Style::default().fg(Color::White),
            muted: Style::default().fg(Color::DarkGray),
            highlight: Style::default()
                .fg(informational)
                .add_modifier(Modifier::BOLD),
            border: Style::default().fg(Color::Gray),
            accent: Style::default().fg(informational),
            title: Style::default()
                .fg(informational)
                .add_modifier(Modifier::BOLD),
            label: Style::default().fg(Color::Cyan),
            info: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::ITALIC),
        }
    }
}

impl Default for TuiColors {
    fn default() -> Self {
        Self::with_palette(
            Color::Rgb(255, 215, 0),
            Color::Rgb(0, 255, 0),
            Color::Rgb(255, 165, 0),
            Color::Rgb(255, 0, 0),
        )
    }
}

/// Parses an `"r,g,b"` colour string into a Ratatui [`Color`].
pub fn parse_color_string(color_str: &str) -> Option<Color> {
    parse_rgb(color_str).map(|(r, g, b)| Color::Rgb(r, g, b))
}
