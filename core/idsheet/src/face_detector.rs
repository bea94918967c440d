/// Bounding box of a detected face within an image.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceBounds {
    /// X coordinate of the top-left corner (pixels).
    pub x: f64,
    /// Y coordinate of the top-left corner (pixels).
    pub y: f64,
    /// Width of the bounding box (pixels).
    pub width: f64,
    /// Height of the bounding box (pixels).
    pub height: f64,
    /// Detection confidence score.
    pub confidence: f64,
}

impl FaceBounds {
    /// Box area in square pixels.
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Horizontal center of the box.
    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub(crate) fn has_extent(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }
}

/// Pluggable face detection strategy.
///
/// Implement this trait to provide a custom face detector (ONNX, dlib, etc.)
/// and register it with [`crate::FaceLocator::with_strategy`]. Strategies are
/// tried in registration order, so put the strictest one first.
pub trait FaceDetector: Send + Sync {
    /// Detect faces in a row-major grayscale buffer of `width` × `height` bytes.
    fn detect(&self, gray: &[u8], width: u32, height: u32) -> Vec<FaceBounds>;

    /// Short label used in logs.
    fn name(&self) -> &str {
        "custom"
    }
}
