use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    /// Follow the platform colour scheme
    System,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        })
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            other => Err(format!(
                "unknown theme '{}' (expected light, dark or system)",
                other
            )),
        }
    }
}

/// Colour scheme preferred by the platform
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

/// Style variables overridden by the dark palette
pub const DARK_VARIABLES: [(&str, &str); 5] = [
    ("text-color", "#e1e4e8"),
    ("text-muted", "#959da5"),
    ("bg-color", "#24292e"),
    ("bg-secondary", "#2f363d"),
    ("border-color", "#444d56"),
];

/// The set of named style variables currently applied.
///
/// Light is the absence of overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    variables: Vec<(&'static str, &'static str)>,
    dark: bool,
}

impl Palette {
    pub fn light() -> Self {
        Self::default()
    }

    pub fn dark() -> Self {
        Self {
            variables: DARK_VARIABLES.to_vec(),
            dark: true,
        }
    }

    pub fn is_dark(&self) -> bool {
        self.dark
    }

    /// Value of a style variable, `None` when it is not overridden
    pub fn get(&self, name: &str) -> Option<&'static str> {
        self.variables
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }

    pub fn variables(&self) -> &[(&'static str, &'static str)] {
        &self.variables
    }

    /// RGB triple of a `#rrggbb` variable
    pub fn rgb(&self, name: &str) -> Option<(u8, u8, u8)> {
        let hex = self.get(name)?.strip_prefix('#')?;
        if hex.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some((channel(0)?, channel(2)?, channel(4)?))
    }
}

/// Applies a theme and keeps `system` in step with the platform.
///
/// Selecting `system` subscribes the controller to platform changes;
/// selecting `light` or `dark` drops the subscription.
#[derive(Debug, Clone)]
pub struct ThemeController {
    selected: Theme,
    platform: ColorScheme,
    palette: Palette,
    following_platform: bool,
}

impl ThemeController {
    pub fn new(platform: ColorScheme) -> Self {
        Self {
            selected: Theme::Light,
            platform,
            palette: Palette::light(),
            following_platform: false,
        }
    }

    pub fn apply(&mut self, theme: Theme) -> &Palette {
        self.selected = theme;
        self.following_platform = theme == Theme::System;
        self.palette = self.resolve();
        tracing::debug!(theme = %theme, dark = self.palette.is_dark(), "theme applied");
        &self.palette
    }

    /// Platform preference changed. Returns true when the palette was
    /// re-applied.
    pub fn platform_changed(&mut self, scheme: ColorScheme) -> bool {
        self.platform = scheme;
        if !self.following_platform {
            return false;
        }
        self.palette = self.resolve();
        true
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    fn resolve(&self) -> Palette {
        match (self.selected, self.platform) {
            (Theme::Dark, _) | (Theme::System, ColorScheme::Dark) => Palette::dark(),
            _ => Palette::light(),
        }
    }
}
