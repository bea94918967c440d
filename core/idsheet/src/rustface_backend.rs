use std::io::Read;

use crate::error::IdSheetError;
use crate::face_detector::{FaceBounds, FaceDetector};
use crate::locator::FaceLocator;

/// Sensitivity settings for one SeetaFace pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RustfaceParams {
    /// Smallest face side, in pixels, the detector considers.
    pub min_face_size: u32,
    /// Minimum classifier score for a window to count as a face.
    pub score_thresh: f64,
    /// Scale step between image pyramid levels.
    pub pyramid_scale_factor: f32,
    /// Sliding window step in pixels (both axes).
    pub window_step: u32,
}

impl RustfaceParams {
    /// Few false positives; misses small or turned faces.
    pub const STRICT: Self = Self {
        min_face_size: 40,
        score_thresh: 2.0,
        pyramid_scale_factor: 0.8,
        window_step: 4,
    };

    /// Middle ground for ordinary portraits.
    pub const BALANCED: Self = Self {
        min_face_size: 30,
        score_thresh: 1.0,
        pyramid_scale_factor: 0.85,
        window_step: 3,
    };

    /// Dense scan at a low threshold, used only when the others find nothing.
    pub const PERMISSIVE: Self = Self {
        min_face_size: 20,
        score_thresh: 0.3,
        pyramid_scale_factor: 0.9,
        window_step: 2,
    };
}

/// Face detector backed by the `rustface` crate (SeetaFace engine).
///
/// The model is not bundled; load `seeta_fd_frontal_v1.0.bin` yourself and
/// pass its bytes or a reader.
pub struct RustfaceDetector {
    model: rustface::Model,
    params: RustfaceParams,
    label: &'static str,
}

impl RustfaceDetector {
    /// Create a detector from a SeetaFace model stream.
    pub fn from_reader<R: Read>(reader: R, params: RustfaceParams) -> Result<Self, IdSheetError> {
        let model = rustface::read_model(reader)
            .map_err(|e| IdSheetError::DecodeError(format!("seetaface model: {e}")))?;
        Ok(Self {
            model,
            params,
            label: "rustface",
        })
    }

    /// Create a detector from model bytes already in memory.
    pub fn from_model_bytes(model: &[u8], params: RustfaceParams) -> Result<Self, IdSheetError> {
        Self::from_reader(std::io::Cursor::new(model), params)
    }

    fn tier(model: rustface::Model, params: RustfaceParams, label: &'static str) -> Self {
        Self {
            model,
            params,
            label,
        }
    }
}

impl FaceDetector for RustfaceDetector {
    fn detect(&self, gray: &[u8], width: u32, height: u32) -> Vec<FaceBounds> {
        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(self.params.min_face_size);
        detector.set_score_thresh(self.params.score_thresh);
        detector.set_pyramid_scale_factor(self.params.pyramid_scale_factor);
        detector.set_slide_window_step(self.params.window_step, self.params.window_step);

        let faces = detector.detect(&rustface::ImageData::new(gray, width, height));

        faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                FaceBounds {
                    x: bbox.x() as f64,
                    y: bbox.y() as f64,
                    width: bbox.width() as f64,
                    height: bbox.height() as f64,
                    confidence: face.score(),
                }
            })
            .collect()
    }

    fn name(&self) -> &str {
        self.label
    }
}

impl FaceLocator {
    /// Strict, balanced, then permissive SeetaFace passes over one model.
    pub fn rustface_cascade(model: &[u8]) -> Result<Self, IdSheetError> {
        let base = RustfaceDetector::from_model_bytes(model, RustfaceParams::STRICT)?;
        let balanced = RustfaceDetector::tier(
            base.model.clone(),
            RustfaceParams::BALANCED,
            "rustface-balanced",
        );
        let permissive = RustfaceDetector::tier(
            base.model.clone(),
            RustfaceParams::PERMISSIVE,
            "rustface-permissive",
        );
        let strict = RustfaceDetector::tier(base.model, RustfaceParams::STRICT, "rustface-strict");

        Ok(FaceLocator::new()
            .with_strategy(Box::new(strict))
            .with_strategy(Box::new(balanced))
            .with_strategy(Box::new(permissive)))
    }
}
