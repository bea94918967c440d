use std::borrow::Cow;

use image::RgbImage;
use tracing::{debug, warn};

use crate::crop::CropWindow;

/// Pixels added on each side of a buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct Padding {
    pub top: u32,
    pub left: u32,
    pub bottom: u32,
    pub right: u32,
}

impl Padding {
    /// How far `window` reads past a `width` × `height` buffer on each side.
    pub fn for_window(window: &CropWindow, width: u32, height: u32) -> Self {
        let overflow = |v: i64| v.max(0) as u32;
        Self {
            top: overflow(-window.top),
            left: overflow(-window.left),
            bottom: overflow(window.bottom() - height as i64),
            right: overflow(window.right() - width as i64),
        }
    }

    /// No side needs extension.
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// Buffer and window after edge extension.
#[derive(Debug)]
pub struct PaddedCrop<'a> {
    /// The source, or a padded copy of it.
    pub image: Cow<'a, RgbImage>,
    /// Window in `image` coordinates; always inside `image`.
    pub window: CropWindow,
    /// Pixels added per side.
    pub padding: Padding,
    /// Whether the final clamp had to move or shrink the window.
    pub clamped: bool,
}

impl PaddedCrop<'_> {
    /// Copy the window out as a new buffer.
    pub fn extract(&self) -> RgbImage {
        image::imageops::crop_imm(
            &*self.image,
            self.window.left as u32,
            self.window.top as u32,
            self.window.width,
            self.window.height,
        )
        .to_image()
    }
}

/// Grow `image` by replicating its outermost pixels wherever `window` reads
/// outside it, then re-map `window` into the grown buffer.
///
/// A final clamp keeps the window inside the buffer even if the padding
/// arithmetic was off. It can cost some headroom; callers see it via
/// [`PaddedCrop::clamped`].
pub fn pad_to_window(image: &RgbImage, window: CropWindow) -> PaddedCrop<'_> {
    let (width, height) = image.dimensions();
    let padding = Padding::for_window(&window, width, height);

    let (image, window) = if padding.is_zero() {
        (Cow::Borrowed(image), window)
    } else {
        debug!(
            top = padding.top,
            left = padding.left,
            bottom = padding.bottom,
            right = padding.right,
            "extending image edges"
        );
        let shifted = CropWindow {
            top: window.top + padding.top as i64,
            left: window.left + padding.left as i64,
            ..window
        };
        (Cow::Owned(extend_edges(image, &padding)), shifted)
    };

    let (padded_w, padded_h) = image.dimensions();
    let clamped_window = clamp_window(window, padded_w, padded_h);
    let clamped = clamped_window != window;
    if clamped {
        warn!(
            requested = ?window,
            applied = ?clamped_window,
            "crop window clamped to image bounds, headroom may be reduced"
        );
    }

    PaddedCrop {
        image,
        window: clamped_window,
        padding,
        clamped,
    }
}

/// New buffer with `padding` added, each new pixel copied from the nearest
/// edge pixel of `image`.
pub fn extend_edges(image: &RgbImage, padding: &Padding) -> RgbImage {
    let (width, height) = image.dimensions();
    let out_w = width + padding.left + padding.right;
    let out_h = height + padding.top + padding.bottom;

    RgbImage::from_fn(out_w, out_h, |x, y| {
        let src_x = (x as i64 - padding.left as i64).clamp(0, width as i64 - 1) as u32;
        let src_y = (y as i64 - padding.top as i64).clamp(0, height as i64 - 1) as u32;
        *image.get_pixel(src_x, src_y)
    })
}

fn clamp_window(window: CropWindow, width: u32, height: u32) -> CropWindow {
    let w = window.width.clamp(1, width);
    let h = window.height.clamp(1, height);
    CropWindow {
        top: window.top.clamp(0, (height - h) as i64),
        left: window.left.clamp(0, (width - w) as i64),
        width: w,
        height: h,
    }
}
