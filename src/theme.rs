//! Theme records and how they reach the presentation layer.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::color::{format_rgb, luminance, parse_rgb};
use crate::select::Palette;

pub const STROKE: &str = "color-mix(in srgb, var(--text) 18%, transparent)";
pub const SURFACE: &str = "color-mix(in srgb, #ffffff 82%, transparent)";
pub const SURFACE2: &str = "color-mix(in srgb, #ffffff 68%, transparent)";
pub const MUTED: &str = "color-mix(in srgb, var(--text) 68%, transparent)";

/// Text lighter than this is replaced by [`DARK_TEXT`].
pub const MAX_TEXT_LUMINANCE: f32 = 0.68;
pub const DARK_TEXT: &str = "rgb(26 22 16)";
pub const DARK_MUTED: &str = "color-mix(in srgb, rgb(26 22 16) 68%, transparent)";

/// Named colour roles, each a CSS colour value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub bg0: String,
    pub bg1: String,
    pub text: String,
    pub accent: String,
    pub accent2: String,
    pub leaf: String,
    pub stroke: String,
    pub surface: String,
    pub surface2: String,
    pub muted: String,
}

impl Theme {
    pub fn from_palette(palette: &Palette) -> Self {
        Self {
            bg0: format_rgb(palette.bg0),
            bg1: format_rgb(palette.bg1),
            text: format_rgb(palette.text),
            accent: format_rgb(palette.accent),
            accent2: format_rgb(palette.accent2),
            leaf: format_rgb(palette.leaf),
            stroke: STROKE.to_string(),
            surface: SURFACE.to_string(),
            surface2: SURFACE2.to_string(),
            muted: MUTED.to_string(),
        }
    }

    /// Custom property name and value for every role, in application order.
    pub fn properties(&self) -> [(&'static str, &str); 10] {
        [
            ("--bg0", self.bg0.as_str()),
            ("--bg1", self.bg1.as_str()),
            ("--text", self.text.as_str()),
            ("--accent", self.accent.as_str()),
            ("--accent2", self.accent2.as_str()),
            ("--leaf", self.leaf.as_str()),
            ("--stroke", self.stroke.as_str()),
            ("--surface", self.surface.as_str()),
            ("--surface2", self.surface2.as_str()),
            ("--muted", self.muted.as_str()),
        ]
    }
}

/// Where a theme is written: a page-wide store of custom properties.
pub trait ThemeSink {
    fn set_property(&mut self, name: &str, value: &str);

    /// Currently effective value of a custom property, if any.
    fn property(&self, name: &str) -> Option<String>;

    /// Browser chrome colour hint. Ignored by sinks that have none.
    fn set_theme_color(&mut self, _value: &str) {}
}

/// Write every role of `theme` to `sink` and point the theme-color hint at
/// the primary background.
pub fn apply_theme<S: ThemeSink + ?Sized>(theme: &Theme, sink: &mut S) {
    for (name, value) in theme.properties() {
        sink.set_property(name, value);
    }
    sink.set_theme_color(&theme.bg0);
    tracing::info!(bg0 = %theme.bg0, text = %theme.text, "theme applied");
}

/// Force a dark text colour when the effective `--text` is too light to read.
///
/// Only the `rgb(R G B)` form is inspected; other values are left alone.
/// Returns whether the text colour was replaced.
pub fn soften_text_color<S: ThemeSink + ?Sized>(sink: &mut S) -> bool {
    let Some(text) = sink.property("--text") else {
        return false;
    };
    let Some(rgb) = parse_rgb(&text) else {
        return false;
    };
    let lum = luminance(rgb.map(f32::from));
    if lum <= MAX_TEXT_LUMINANCE {
        return false;
    }

    tracing::warn!(text = %text, lum, "text colour too light, using dark fallback");
    sink.set_property("--text", DARK_TEXT);
    sink.set_property("--muted", DARK_MUTED);
    true
}

/// In-memory sink. Renders as a CSS `:root` block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StyleMap {
    properties: BTreeMap<String, String>,
    theme_color: Option<String>,
}

impl StyleMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn theme_color(&self) -> Option<&str> {
        self.theme_color.as_deref()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn to_css(&self) -> String {
        let mut css = String::from(":root {\n");
        for (name, value) in self.iter() {
            let _ = writeln!(css, "  {name}: {value};");
        }
        css.push_str("}\n");
        css
    }
}

impl ThemeSink for StyleMap {
    fn set_property(&mut self, name: &str, value: &str) {
        self.properties.insert(name.to_string(), value.to_string());
    }

    fn property(&self, name: &str) -> Option<String> {
        self.properties.get(name).cloned()
    }

    fn set_theme_color(&mut self, value: &str) {
        self.theme_color = Some(value.to_string());
    }
}
