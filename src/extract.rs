//! The full pipeline: bytes → decoded images → samples → clusters → theme.

use image::DynamicImage;
use palette::Srgb;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ThemeError;
use crate::kmeans::{KMeansOptions, kmeans};
use crate::sample::{SampleOptions, sample_image};
use crate::select::pick_palette;
use crate::theme::Theme;

/// Tunables for one extraction call. Missing JSON fields take defaults.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    pub sample: SampleOptions,
    pub kmeans: KMeansOptions,
    /// Below this many pooled samples no theme is produced.
    pub min_samples: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            sample: SampleOptions::default(),
            kmeans: KMeansOptions::default(),
            min_samples: 250,
        }
    }
}

/// Decode every input concurrently. The first failure aborts the whole batch.
pub fn decode_images<B>(inputs: &[B]) -> Result<Vec<DynamicImage>, ThemeError>
where
    B: AsRef<[u8]> + Sync,
{
    inputs
        .par_iter()
        .enumerate()
        .map(|(index, bytes)| {
            image::load_from_memory(bytes.as_ref()).map_err(|source| ThemeError::Decode { index, source })
        })
        .collect()
}

/// Cluster pooled samples into a theme.
///
/// `None` means there was not enough data and the current theme should stay.
pub fn extract_theme_from_pixels(samples: &[Srgb<u8>], opts: &ExtractOptions) -> Option<Theme> {
    if samples.len() < opts.min_samples {
        tracing::debug!(
            samples = samples.len(),
            min = opts.min_samples,
            "not enough samples for a theme"
        );
        return None;
    }

    let clusters = kmeans(samples, &opts.kmeans);
    let palette = pick_palette(&clusters)?;
    Some(Theme::from_palette(&palette))
}

pub fn extract_theme_from_images(images: &[DynamicImage], opts: &ExtractOptions) -> Option<Theme> {
    let per_image: Vec<Vec<Srgb<u8>>> = images
        .par_iter()
        .map(|img| sample_image(img, &opts.sample))
        .collect();

    for (index, samples) in per_image.iter().enumerate() {
        tracing::debug!(index, samples = samples.len(), "sampled image");
    }
    let pooled = per_image.concat();

    extract_theme_from_pixels(&pooled, opts)
}

/// Decode encoded images (PNG, JPEG, ...) and extract a theme from them.
pub fn extract_theme_from_bytes<B>(inputs: &[B], opts: &ExtractOptions) -> Result<Option<Theme>, ThemeError>
where
    B: AsRef<[u8]> + Sync,
{
    let images = decode_images(inputs)?;
    Ok(extract_theme_from_images(&images, opts))
}

/// Read image files from disk and extract a theme from them.
#[cfg(not(target_arch = "wasm32"))]
pub fn extract_theme_from_files<P>(paths: &[P], opts: &ExtractOptions) -> Result<Option<Theme>, ThemeError>
where
    P: AsRef<std::path::Path> + Sync,
{
    let inputs = paths
        .par_iter()
        .map(|path| {
            let path = path.as_ref();
            std::fs::read(path).map_err(|source| ThemeError::Read {
                path: path.to_path_buf(),
                source,
            })
        })
        .collect::<Result<Vec<Vec<u8>>, ThemeError>>()?;

    extract_theme_from_bytes(&inputs, opts)
}
