//! Fixed tonal enhancement chain for finished document photos.
//!
//! Runs after crop and resize, and before any external upscaler, so the
//! upscaler never re-amplifies sharpening artifacts.

use image::{Rgb, RgbImage};

/// Deterministic enhancement multipliers.
///
/// Each factor follows the usual "enhance" convention: `1.0` leaves the image
/// unchanged, larger values strengthen the effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnhancementProfile {
    /// Scales every channel toward (below 1.0) or away from black.
    pub brightness: f32,
    /// Scales distance from the mean luminance of the image.
    pub contrast: f32,
    /// Scales distance from each pixel's own luminance.
    pub saturation: f32,
    /// Scales distance from a 3×3 smoothed copy.
    pub sharpness: f32,
    /// Gaussian blur sigma of the unsharp mask.
    pub unsharp_radius: f32,
    /// Unsharp mask strength, in percent of the detail signal.
    pub unsharp_percent: u32,
    /// Detail below this many levels is left alone.
    pub unsharp_threshold: u8,
}

impl Default for EnhancementProfile {
    fn default() -> Self {
        Self {
            brightness: 1.08,
            contrast: 1.12,
            saturation: 1.05,
            sharpness: 1.8,
            unsharp_radius: 1.0,
            unsharp_percent: 50,
            unsharp_threshold: 3,
        }
    }
}

impl EnhancementProfile {
    /// A profile that changes nothing.
    pub fn neutral() -> Self {
        Self {
            brightness: 1.0,
            contrast: 1.0,
            saturation: 1.0,
            sharpness: 1.0,
            unsharp_radius: 0.0,
            unsharp_percent: 0,
            unsharp_threshold: 0,
        }
    }
}

/// Apply brightness, contrast, saturation, sharpness, then the unsharp mask.
pub fn enhance(image: &RgbImage, profile: &EnhancementProfile) -> RgbImage {
    let out = adjust_brightness(image, profile.brightness);
    let out = adjust_contrast(&out, profile.contrast);
    let out = adjust_saturation(&out, profile.saturation);
    let out = adjust_sharpness(&out, profile.sharpness);
    unsharp_mask(
        &out,
        profile.unsharp_radius,
        profile.unsharp_percent,
        profile.unsharp_threshold,
    )
}

/// Rec. 601 luma.
fn luma(p: &Rgb<u8>) -> f32 {
    0.299 * p[0] as f32 + 0.587 * p[1] as f32 + 0.114 * p[2] as f32
}

fn to_channel(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// `base + factor * (value - base)`, per channel.
fn blend(base: [f32; 3], value: &Rgb<u8>, factor: f32) -> Rgb<u8> {
    Rgb([
        to_channel(base[0] + factor * (value[0] as f32 - base[0])),
        to_channel(base[1] + factor * (value[1] as f32 - base[1])),
        to_channel(base[2] + factor * (value[2] as f32 - base[2])),
    ])
}

fn adjust_brightness(image: &RgbImage, factor: f32) -> RgbImage {
    let mut out = image.clone();
    for p in out.pixels_mut() {
        *p = blend([0.0; 3], p, factor);
    }
    out
}

fn adjust_contrast(image: &RgbImage, factor: f32) -> RgbImage {
    let count = (image.width() as u64 * image.height() as u64).max(1);
    let sum: f64 = image.pixels().map(|p| luma(p) as f64).sum();
    let mean = (sum / count as f64).round() as f32;

    let mut out = image.clone();
    for p in out.pixels_mut() {
        *p = blend([mean; 3], p, factor);
    }
    out
}

fn adjust_saturation(image: &RgbImage, factor: f32) -> RgbImage {
    let mut out = image.clone();
    for p in out.pixels_mut() {
        let gray = luma(p);
        *p = blend([gray; 3], p, factor);
    }
    out
}

/// Blend against a smoothed copy. Border pixels have no full 3×3
/// neighbourhood and are left as they are.
fn adjust_sharpness(image: &RgbImage, factor: f32) -> RgbImage {
    const KERNEL: [f32; 9] = [1.0, 1.0, 1.0, 1.0, 5.0, 1.0, 1.0, 1.0, 1.0];
    const KERNEL_SUM: f32 = 13.0;

    let (w, h) = image.dimensions();
    let mut out = image.clone();
    if w < 3 || h < 3 {
        return out;
    }

    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let mut acc = [0.0f32; 3];
            for (i, weight) in KERNEL.iter().enumerate() {
                let nx = x + (i as u32 % 3) - 1;
                let ny = y + (i as u32 / 3) - 1;
                let n = image.get_pixel(nx, ny);
                for c in 0..3 {
                    acc[c] += weight * n[c] as f32;
                }
            }
            let smooth = acc.map(|v| v / KERNEL_SUM);
            out.put_pixel(x, y, blend(smooth, image.get_pixel(x, y), factor));
        }
    }
    out
}

fn unsharp_mask(image: &RgbImage, radius: f32, percent: u32, threshold: u8) -> RgbImage {
    if radius <= 0.0 || percent == 0 {
        return image.clone();
    }

    let blurred = image::imageops::blur(image, radius);
    let amount = percent as f32 / 100.0;

    let mut out = image.clone();
    for (p, b) in out.pixels_mut().zip(blurred.pixels()) {
        for c in 0..3 {
            let diff = p[c] as f32 - b[c] as f32;
            if diff.abs() > threshold as f32 {
                p[c] = to_channel(p[c] as f32 + diff * amount);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkerboard(size: u32) -> RgbImage {
        RgbImage::from_fn(size, size, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb([60, 60, 60])
            } else {
                Rgb([190, 190, 190])
            }
        })
    }

    #[test]
    fn neutral_profile_is_identity() {
        let img = RgbImage::from_fn(17, 11, |x, y| Rgb([(x * 13) as u8, (y * 20) as u8, 99]));
        assert_eq!(enhance(&img, &EnhancementProfile::neutral()), img);
    }

    #[test]
    fn preserves_dimensions() {
        let img = RgbImage::from_pixel(41, 53, Rgb([120, 130, 140]));
        let out = enhance(&img, &EnhancementProfile::default());
        assert_eq!(out.dimensions(), (41, 53));
    }

    #[test]
    fn brightness_scales_channels() {
        let img = RgbImage::from_pixel(2, 2, Rgb([100, 200, 250]));
        let out = adjust_brightness(&img, 1.08);
        assert_eq!(out.get_pixel(0, 0), &Rgb([108, 216, 255]));
    }

    #[test]
    fn contrast_spreads_around_mean() {
        let mut img = RgbImage::from_pixel(2, 1, Rgb([100, 100, 100]));
        img.put_pixel(1, 0, Rgb([200, 200, 200]));
        let out = adjust_contrast(&img, 1.2);
        // mean 150: 150 - 60, 150 + 60
        assert_eq!(out.get_pixel(0, 0), &Rgb([90, 90, 90]));
        assert_eq!(out.get_pixel(1, 0), &Rgb([210, 210, 210]));
    }

    #[test]
    fn saturation_leaves_gray_alone() {
        let img = RgbImage::from_pixel(3, 3, Rgb([128, 128, 128]));
        assert_eq!(adjust_saturation(&img, 1.05), img);
    }

    #[test]
    fn saturation_pushes_color_away_from_gray() {
        let img = RgbImage::from_pixel(1, 1, Rgb([200, 100, 100]));
        let out = adjust_saturation(&img, 1.5);
        let p = out.get_pixel(0, 0);
        assert!(p[0] > 200);
        assert!(p[1] < 100);
    }

    #[test]
    fn sharpness_keeps_borders_and_boosts_detail() {
        let img = checkerboard(8);
        let out = adjust_sharpness(&img, 1.8);
        for x in 0..8 {
            assert_eq!(out.get_pixel(x, 0), img.get_pixel(x, 0));
            assert_eq!(out.get_pixel(x, 7), img.get_pixel(x, 7));
        }
        // Dark interior pixels get darker, light ones lighter
        assert!(out.get_pixel(2, 2)[0] < 60);
        assert!(out.get_pixel(3, 2)[0] > 190);
    }

    #[test]
    fn sharpness_on_tiny_image_is_noop() {
        let img = RgbImage::from_pixel(2, 5, Rgb([10, 20, 30]));
        assert_eq!(adjust_sharpness(&img, 1.8), img);
    }

    #[test]
    fn unsharp_respects_threshold() {
        let flat = RgbImage::from_pixel(12, 12, Rgb([77, 77, 77]));
        assert_eq!(unsharp_mask(&flat, 1.0, 50, 3), flat);

        let board = checkerboard(12);
        let out = unsharp_mask(&board, 1.0, 50, 3);
        assert_ne!(out, board);
        assert!(out.get_pixel(5, 5)[0] < 60);
    }

    #[test]
    fn default_profile_brightens_midtones() {
        let img = RgbImage::from_pixel(16, 16, Rgb([120, 120, 120]));
        let out = enhance(&img, &EnhancementProfile::default());
        assert!(out.get_pixel(8, 8)[0] > 120);
    }
}
