//! Contracts for the remote services the pipeline depends on.
//!
//! Implementations live outside this crate (HTTP clients, model servers).
//! Calls are blocking; [`crate::SheetService`] runs them on the blocking pool
//! under a timeout.

use image::{DynamicImage, RgbImage, RgbaImage};

use crate::error::CollaboratorError;

/// Cuts the subject out of a portrait.
pub trait BackgroundRemover: Send + Sync {
    /// Return an RGBA cutout of `image` with a transparent background.
    fn remove_background(&self, image: &DynamicImage) -> Result<RgbaImage, CollaboratorError>;
}

/// Super-resolution service.
pub trait Upscaler: Send + Sync {
    /// Return an enhanced copy of `image` at exactly `width` × `height`.
    fn upscale(&self, image: &RgbImage, width: u32, height: u32)
        -> Result<RgbImage, CollaboratorError>;
}

/// Remover for input that already sits on a clean background: keeps every
/// pixel, fully opaque.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpaqueCutout;

impl BackgroundRemover for OpaqueCutout {
    fn remove_background(&self, image: &DynamicImage) -> Result<RgbaImage, CollaboratorError> {
        let mut rgba = image.to_rgba8();
        for pixel in rgba.pixels_mut() {
            pixel.0[3] = u8::MAX;
        }
        Ok(rgba)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_cutout_drops_transparency() {
        let mut src = RgbaImage::new(2, 1);
        src.put_pixel(0, 0, image::Rgba([10, 20, 30, 0]));
        src.put_pixel(1, 0, image::Rgba([40, 50, 60, 128]));
        let out = OpaqueCutout
            .remove_background(&DynamicImage::ImageRgba8(src))
            .unwrap();
        assert_eq!(out.get_pixel(0, 0), &image::Rgba([10, 20, 30, 255]));
        assert_eq!(out.get_pixel(1, 0), &image::Rgba([40, 50, 60, 255]));
    }
}
