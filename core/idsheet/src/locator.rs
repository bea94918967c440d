use image::{GrayImage, RgbImage};
use imageproc::contrast::equalize_histogram;
use tracing::debug;

use crate::face_detector::{FaceBounds, FaceDetector};

/// Runs an ordered chain of detector strategies and picks one face.
///
/// Strategies go from strict to permissive. The first strategy that reports
/// any candidate wins, and the largest of its candidates is returned. An empty
/// chain, or a chain where every strategy comes back empty, yields `None`.
#[derive(Default)]
pub struct FaceLocator {
    strategies: Vec<Box<dyn FaceDetector>>,
}

impl FaceLocator {
    /// A locator with no strategies. It never finds a face.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a strategy at the lowest priority.
    pub fn with_strategy(mut self, detector: Box<dyn FaceDetector>) -> Self {
        self.strategies.push(detector);
        self
    }

    /// Number of registered strategies.
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Whether no strategy is registered.
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Locate the best face in `image`.
    pub fn locate(&self, image: &RgbImage) -> Option<FaceBounds> {
        if self.strategies.is_empty() {
            return None;
        }

        let gray = detection_view(image);
        let (width, height) = gray.dimensions();

        for strategy in &self.strategies {
            let candidates = strategy.detect(gray.as_raw(), width, height);
            let best = largest_face(candidates);
            if let Some(face) = best {
                debug!(
                    strategy = strategy.name(),
                    x = face.x,
                    y = face.y,
                    width = face.width,
                    height = face.height,
                    "face located"
                );
                return Some(face);
            }
            debug!(strategy = strategy.name(), "no face candidates");
        }

        None
    }
}

/// Grayscale, histogram-equalized view handed to every strategy.
pub(crate) fn detection_view(image: &RgbImage) -> GrayImage {
    let gray = image::imageops::grayscale(image);
    equalize_histogram(&gray)
}

fn largest_face(candidates: Vec<FaceBounds>) -> Option<FaceBounds> {
    candidates
        .into_iter()
        .filter(FaceBounds::has_extent)
        .max_by(|a, b| {
            a.area()
                .partial_cmp(&b.area())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}
