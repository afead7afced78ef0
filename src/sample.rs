use image::{DynamicImage, GenericImageView, imageops::FilterType};
use palette::Srgb;
use serde::{Deserialize, Serialize};

/// Pixels with alpha below this are treated as transparent and skipped.
pub const MIN_ALPHA: u8 = 40;
/// Pixels whose channel sum is below this are treated as shadow and skipped.
pub const MIN_CHANNEL_SUM: u16 = 38;

/// Bounds applied when turning one image into colour samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleOptions {
    /// Longest allowed width of the working bitmap.
    pub max_width: u32,
    /// Longest allowed height of the working bitmap.
    pub max_height: u32,
    /// Upper bound on the number of samples produced per image.
    pub max_samples: usize,
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self {
            max_width: 96,
            max_height: 96,
            max_samples: 4500,
        }
    }
}

/// Size of the working bitmap: the natural size scaled to fit inside
/// `max_width` × `max_height`, never upscaled, each side at least 1.
pub fn target_dimensions(width: u32, height: u32, opts: &SampleOptions) -> (u32, u32) {
    let scale = (opts.max_width as f32 / width as f32)
        .min(opts.max_height as f32 / height as f32)
        .min(1.0);
    let w = ((width as f32) * scale).round().max(1.0) as u32;
    let h = ((height as f32) * scale).round().max(1.0) as u32;
    (w, h)
}

/// Downscale `img` and collect representative, visible, non-black samples.
pub fn sample_image(img: &DynamicImage, opts: &SampleOptions) -> Vec<Srgb<u8>> {
    let (orig_w, orig_h) = img.dimensions();
    if orig_w == 0 || orig_h == 0 {
        return Vec::new();
    }
    let (w, h) = target_dimensions(orig_w, orig_h, opts);

    // Fast path – no scaling required.
    let raw = if w == orig_w && h == orig_h {
        img.to_rgba8().into_raw()
    } else if img.color().has_alpha() {
        resize_premultiplied(img, w, h)
    } else {
        image::imageops::resize(img, w, h, FilterType::Triangle).into_raw()
    };

    sample_rgba(&raw, opts.max_samples)
}

/// Resize with colour weighted by alpha, so transparent pixels contribute no
/// colour to their visible neighbours. Returns straight RGBA8.
fn resize_premultiplied(img: &DynamicImage, w: u32, h: u32) -> Vec<u8> {
    let mut premultiplied = img.to_rgba32f();
    for px in premultiplied.pixels_mut() {
        let a = px[3];
        px[0] *= a;
        px[1] *= a;
        px[2] *= a;
    }

    let resized = image::imageops::resize(&premultiplied, w, h, FilterType::Triangle);

    let to_u8 = |c: f32| (c * 255.0).round().clamp(0.0, 255.0) as u8;
    let mut raw = Vec::with_capacity((w * h * 4) as usize);
    for px in resized.pixels() {
        let a = px[3];
        let [r, g, b] = if a > 0.0 {
            [px[0] / a, px[1] / a, px[2] / a]
        } else {
            [0.0; 3]
        };
        raw.extend_from_slice(&[to_u8(r), to_u8(g), to_u8(b), to_u8(a)]);
    }
    raw
}

/// Stride-sample a raw RGBA8 buffer.
///
/// Every `stride`-th pixel is visited, `stride = max(1, pixels / max_samples)`,
/// and no more than `max_samples` pixels are visited. Near-transparent and
/// near-black pixels are dropped.
pub fn sample_rgba(raw: &[u8], max_samples: usize) -> Vec<Srgb<u8>> {
    let pixel_count = raw.len() / 4;
    if pixel_count == 0 || max_samples == 0 {
        return Vec::new();
    }
    let stride = (pixel_count / max_samples).max(1);

    raw.chunks_exact(4)
        .step_by(stride)
        .take(max_samples)
        .filter(|px| px[3] >= MIN_ALPHA)
        .filter(|px| px[0] as u16 + px[1] as u16 + px[2] as u16 >= MIN_CHANNEL_SUM)
        .map(|px| Srgb::<u8>::new(px[0], px[1], px[2]))
        .collect()
}
