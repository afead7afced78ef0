//! Small colour helpers shared by the clustering and theming stages.
//!
//! Channel values are kept in 0..=255 space throughout; only the HSL
//! conversion goes through the `palette` crate's normalised `Srgb`.

use palette::{Hsl, IntoColor, Srgb};

/// A centroid colour: real-valued RGB channels in 0..=255.
pub type Rgb = [f32; 3];

/// Hue (degrees, 0..360), saturation and lightness (both 0..=1).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HslTriple {
    pub h: f32,
    pub s: f32,
    pub l: f32,
}

/// Perceptual luminance in 0..=1 using Rec. 709 channel weights.
#[inline]
pub fn luminance(rgb: Rgb) -> f32 {
    (0.2126 * rgb[0] + 0.7152 * rgb[1] + 0.0722 * rgb[2]) / 255.0
}

pub fn to_hsl(rgb: Rgb) -> HslTriple {
    let hsl: Hsl = Srgb::new(rgb[0] / 255.0, rgb[1] / 255.0, rgb[2] / 255.0).into_color();
    HslTriple {
        h: hsl.hue.into_positive_degrees(),
        s: hsl.saturation,
        l: hsl.lightness,
    }
}

/// Squared Euclidean distance between a sample and a centroid.
#[inline(always)]
pub fn dist2(sample: Srgb<u8>, center: &Rgb) -> f32 {
    let dr = sample.red as f32 - center[0];
    let dg = sample.green as f32 - center[1];
    let db = sample.blue as f32 - center[2];
    dr * dr + dg * dg + db * db
}

/// Format as CSS `rgb(R G B)` with rounded integer channels.
pub fn format_rgb(rgb: Rgb) -> String {
    let [r, g, b] = rgb.map(|c| c.round().clamp(0.0, 255.0) as u8);
    format!("rgb({r} {g} {b})")
}

/// Parse the `rgb(R G B)` form produced by [`format_rgb`].
///
/// Anything else (hex, `color-mix(...)`, comma syntax) yields `None`. This is
/// stricter than a loose `rgb\((\d+)\s+(\d+)\s+(\d+)\)` match: the whole
/// value must be the function, with no trailing text, and channels above 255
/// are rejected rather than accepted as digit runs.
pub fn parse_rgb(value: &str) -> Option<[u8; 3]> {
    let inner = value
        .trim()
        .strip_prefix("rgb(")?
        .strip_suffix(')')?;

    let mut channels = [0u8; 3];
    let mut parts = inner.split_whitespace();
    for channel in channels.iter_mut() {
        let part = parts.next()?;
        if !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *channel = part.parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(channels)
}
