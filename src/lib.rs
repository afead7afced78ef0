//! Derive a page colour theme from a handful of photos.
//!
//! The pipeline downsamples each image, stride-samples its visible pixels,
//! runs a deterministic k-means over the pooled samples, and assigns the
//! resulting clusters to named roles (backgrounds, text, accents, leaf).
//! The theme is written to a [`ThemeSink`], which in the browser is the
//! document's custom-property store.
//!
//! ```
//! use image_theme_wasm::{ExtractOptions, StyleMap, apply_theme, extract_theme_from_pixels, soften_text_color};
//! use palette::Srgb;
//!
//! let mut samples = vec![Srgb::new(40u8, 20, 10); 300];
//! samples.extend(vec![Srgb::new(230u8, 220, 200); 300]);
//!
//! let theme = extract_theme_from_pixels(&samples, &ExtractOptions::default()).unwrap();
//! let mut sink = StyleMap::new();
//! apply_theme(&theme, &mut sink);
//! soften_text_color(&mut sink);
//! assert_eq!(theme.bg0, "rgb(230 220 200)");
//! assert_eq!(theme.text, "rgb(40 20 10)");
//! ```

use js_sys::{Array, Function, Object, Reflect, Uint8Array};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

pub mod color;
pub mod error;
pub mod extract;
pub mod kmeans;
pub mod sample;
pub mod select;
pub mod theme;

pub use error::ThemeError;
#[cfg(not(target_arch = "wasm32"))]
pub use extract::extract_theme_from_files;
pub use extract::{
    ExtractOptions, decode_images, extract_theme_from_bytes, extract_theme_from_images,
    extract_theme_from_pixels,
};
pub use kmeans::{Cluster, KMeansOptions, kmeans};
pub use sample::{SampleOptions, sample_image, sample_rgba};
pub use select::{Palette, pick_palette};
pub use theme::{StyleMap, Theme, ThemeSink, apply_theme, soften_text_color};

// ------------------------------------------------------------
// JavaScript bindings
// ------------------------------------------------------------

/// Sink backed by JS callbacks, typically wrapping
/// `document.documentElement.style.setProperty`,
/// `getComputedStyle(...).getPropertyValue` and the `theme-color` meta tag.
struct JsSink {
    set_property: Function,
    get_property: Function,
    set_theme_color: Option<Function>,
}

impl ThemeSink for JsSink {
    fn set_property(&mut self, name: &str, value: &str) {
        let result = self.set_property.call2(
            &JsValue::NULL,
            &JsValue::from_str(name),
            &JsValue::from_str(value),
        );
        if let Err(err) = result {
            tracing::warn!(name, ?err, "setProperty callback failed");
        }
    }

    fn property(&self, name: &str) -> Option<String> {
        match self.get_property.call1(&JsValue::NULL, &JsValue::from_str(name)) {
            Ok(value) => value.as_string(),
            Err(err) => {
                tracing::warn!(name, ?err, "getPropertyValue callback failed");
                None
            }
        }
    }

    fn set_theme_color(&mut self, value: &str) {
        let Some(callback) = &self.set_theme_color else {
            return;
        };
        if let Err(err) = callback.call1(&JsValue::NULL, &JsValue::from_str(value)) {
            tracing::warn!(?err, "setThemeColor callback failed");
        }
    }
}

fn parse_options(options: Option<String>) -> Result<ExtractOptions, JsValue> {
    match options {
        Some(json) => serde_json::from_str(&json)
            .map_err(|e| JsValue::from_str(&format!("Invalid options: {e}"))),
        None => Ok(ExtractOptions::default()),
    }
}

fn image_bytes(images: &Array) -> Result<Vec<Vec<u8>>, JsValue> {
    images
        .iter()
        .map(|val| {
            val.dyn_into::<Uint8Array>()
                .map(|bytes| bytes.to_vec())
                .map_err(|_| JsValue::from_str("Images must be Uint8Array values"))
        })
        .collect()
}

fn theme_to_js(theme: &Theme) -> Result<Object, JsValue> {
    let result = Object::new();
    for (name, value) in theme.properties() {
        let key = name.trim_start_matches("--");
        Reflect::set(&result, &JsValue::from_str(key), &JsValue::from_str(value))?;
    }
    Ok(result)
}

fn extract_from_js(images: &Array, options: Option<String>) -> Result<Option<Theme>, JsValue> {
    let opts = parse_options(options)?;
    let inputs = image_bytes(images)?;
    extract_theme_from_bytes(&inputs, &opts).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Extract a theme from encoded images (an array of `Uint8Array`).
///
/// Returns an object keyed by role (`bg0`, `text`, ...) or `null` when the
/// images did not contain enough usable pixels. `options` is an optional JSON
/// string shaped like [`ExtractOptions`].
#[wasm_bindgen]
pub fn extract_theme(images: Array, options: Option<String>) -> Result<JsValue, JsValue> {
    match extract_from_js(&images, options)? {
        Some(theme) => Ok(theme_to_js(&theme)?.into()),
        None => Ok(JsValue::NULL),
    }
}

/// Extract a theme, write it through the given callbacks, then run the
/// readability check on the effective text colour.
///
/// `set_property(name, value)` and `get_property(name)` receive custom
/// property names including the leading `--`. Nothing is written when the
/// result is `null`.
#[wasm_bindgen]
pub fn extract_and_apply_theme(
    images: Array,
    set_property: Function,
    get_property: Function,
    set_theme_color: Option<Function>,
    options: Option<String>,
) -> Result<JsValue, JsValue> {
    let Some(theme) = extract_from_js(&images, options)? else {
        return Ok(JsValue::NULL);
    };

    let mut sink = JsSink {
        set_property,
        get_property,
        set_theme_color,
    };
    apply_theme(&theme, &mut sink);
    soften_text_color(&mut sink);

    Ok(theme_to_js(&theme)?.into())
}

/// Replace a too-light `--text` with a dark fallback. Returns whether it did.
#[wasm_bindgen]
pub fn soften_theme_text(set_property: Function, get_property: Function) -> bool {
    let mut sink = JsSink {
        set_property,
        get_property,
        set_theme_color: None,
    };
    soften_text_color(&mut sink)
}
