use crate::cli::ColorChoice;
use colored::{ColoredString, Colorize};
use showcase_core::{ColorScheme, Palette};
use std::io::IsTerminal;

/// Explicit platform scheme, `dark` or `light`
pub const COLOR_SCHEME_ENV: &str = "SHOWCASE_COLOR_SCHEME";

/// Initialize color mode based on CLI choice and environment
pub fn init(choice: ColorChoice) {
    let should_color = match choice {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => {
            // Respect NO_COLOR standard (https://no-color.org/)
            if std::env::var("NO_COLOR").is_ok() {
                false
            } else {
                // Only colorize if stdout is a terminal
                std::io::stdout().is_terminal()
            }
        }
    };

    colored::control::set_override(should_color);
}

/// The terminal's preferred scheme, the CLI counterpart of
/// `prefers-color-scheme`
pub fn platform_scheme() -> ColorScheme {
    scheme_from(
        std::env::var(COLOR_SCHEME_ENV).ok().as_deref(),
        std::env::var("COLORFGBG").ok().as_deref(),
    )
}

fn scheme_from(explicit: Option<&str>, colorfgbg: Option<&str>) -> ColorScheme {
    if let Some(value) = explicit {
        match value.trim().to_ascii_lowercase().as_str() {
            "dark" => return ColorScheme::Dark,
            "light" => return ColorScheme::Light,
            _ => {}
        }
    }

    // "fg;bg" or "fg;default;bg"; backgrounds 0-6 and 8 are dark
    let background = colorfgbg
        .and_then(|v| v.rsplit(';').next())
        .and_then(|bg| bg.trim().parse::<u8>().ok());
    match background {
        Some(bg) if bg <= 6 || bg == 8 => ColorScheme::Dark,
        _ => ColorScheme::Light,
    }
}

/// Text styling driven by the active palette
pub struct Styler<'a> {
    palette: &'a Palette,
}

impl<'a> Styler<'a> {
    pub fn new(palette: &'a Palette) -> Self {
        Self { palette }
    }

    pub fn label(&self, text: &str) -> ColoredString {
        match self.palette.rgb("text-muted") {
            Some((r, g, b)) => text.truecolor(r, g, b),
            None => text.dimmed(),
        }
    }

    pub fn value(&self, text: &str) -> ColoredString {
        match self.palette.rgb("text-color") {
            Some((r, g, b)) => text.truecolor(r, g, b),
            None => text.normal(),
        }
    }

    pub fn heading(&self, text: &str) -> ColoredString {
        self.value(text).bold()
    }
}
