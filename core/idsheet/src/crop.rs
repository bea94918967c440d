use crate::face_detector::FaceBounds;

/// Millimetres per inch, for physical size to pixel conversion.
const MM_PER_INCH: f64 = 25.4;

/// Convert a physical length to whole pixels at `dpi`, truncating.
pub fn mm_to_px(mm: f64, dpi: u32) -> u32 {
    (mm / MM_PER_INCH * dpi as f64) as u32
}

/// Exact output size of the document photo, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSpec {
    /// Output width in pixels.
    pub width_px: u32,
    /// Output height in pixels.
    pub height_px: u32,
}

impl TargetSpec {
    /// Target for a physical photo size printed at `dpi`.
    ///
    /// 35 × 45 mm at 300 dpi gives 413 × 531 px.
    pub fn from_mm(width_mm: f64, height_mm: f64, dpi: u32) -> Self {
        Self {
            width_px: mm_to_px(width_mm, dpi).max(1),
            height_px: mm_to_px(height_mm, dpi).max(1),
        }
    }

    /// Width / height.
    pub fn aspect(&self) -> f64 {
        self.width_px as f64 / self.height_px as f64
    }
}

/// Framing conventions for the face-driven crop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramingProfile {
    /// Fraction of the crop height the face box should occupy.
    pub face_height_ratio: f64,
    /// Empty space above the face box, as a fraction of crop height.
    pub headroom_ratio: f64,
    /// Upward shift of the no-face center crop, as a fraction of source height.
    pub fallback_top_bias: f64,
}

impl Default for FramingProfile {
    fn default() -> Self {
        Self {
            face_height_ratio: 0.75,
            headroom_ratio: 0.10,
            fallback_top_bias: 0.02,
        }
    }
}

/// Crop rectangle in source coordinates.
///
/// `top` and `left` are signed: a face near the border produces a window that
/// starts before the image does. [`crate::pad::pad_to_window`] makes it valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropWindow {
    /// First row, may be negative.
    pub top: i64,
    /// First column, may be negative.
    pub left: i64,
    /// Width in pixels, at least 1.
    pub width: u32,
    /// Height in pixels, at least 1.
    pub height: u32,
}

impl CropWindow {
    /// One past the last row.
    pub fn bottom(&self) -> i64 {
        self.top + self.height as i64
    }

    /// One past the last column.
    pub fn right(&self) -> i64 {
        self.left + self.width as i64
    }

    /// Whether the window reads only pixels of a `width` × `height` buffer.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.top >= 0
            && self.left >= 0
            && self.bottom() <= height as i64
            && self.right() <= width as i64
    }
}

/// Pick the crop window for a source image, with or without a face.
pub fn solve_crop(
    face: Option<&FaceBounds>,
    source_width: u32,
    source_height: u32,
    target: TargetSpec,
    framing: &FramingProfile,
    zoom: f64,
) -> CropWindow {
    match face {
        Some(face) => face_crop(face, target, framing, zoom),
        None => fallback_crop(source_width, source_height, target, framing),
    }
}

/// Crop sized so the face fills `face_height_ratio` of the height, with
/// `headroom_ratio` of the height above it, centered on the face horizontally.
///
/// Higher `zoom` gives a tighter crop. The result may extend past the source.
pub fn face_crop(
    face: &FaceBounds,
    target: TargetSpec,
    framing: &FramingProfile,
    zoom: f64,
) -> CropWindow {
    let crop_h = ((face.height / framing.face_height_ratio) / zoom).round().max(1.0) as u32;
    let crop_w = (crop_h as u64 * target.width_px as u64 / target.height_px as u64).max(1) as u32;

    let headroom = crop_h as f64 * framing.headroom_ratio;
    let top = (face.y - headroom).round() as i64;
    let left = (face.center_x() - crop_w as f64 / 2.0).round() as i64;

    CropWindow {
        top,
        left,
        width: crop_w,
        height: crop_h,
    }
}

/// Largest centered crop at the target aspect, nudged up by
/// `fallback_top_bias` of the source height for head-and-shoulders framing.
///
/// Always lies inside the source.
pub fn fallback_crop(
    source_width: u32,
    source_height: u32,
    target: TargetSpec,
    framing: &FramingProfile,
) -> CropWindow {
    let (tw, th) = (target.width_px as f64, target.height_px as f64);
    let (sw, sh) = (source_width as f64, source_height as f64);

    let (crop_w, crop_h) = if sw / sh > target.aspect() {
        // Source is wider than the target: full height
        let w = (sh * tw / th).round() as u32;
        (w.clamp(1, source_width), source_height)
    } else {
        let h = (sw * th / tw).round() as u32;
        (source_width, h.clamp(1, source_height))
    };

    let left = (source_width - crop_w) / 2;

    let slack = source_height - crop_h;
    let bias = (sh * framing.fallback_top_bias).round() as i64;
    let top = (slack as i64 / 2 - bias).clamp(0, slack as i64);

    CropWindow {
        top,
        left: left as i64,
        width: crop_w,
        height: crop_h,
    }
}
