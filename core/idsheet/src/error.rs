use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdSheetError {
    #[error("failed to decode image: {0}")]
    DecodeError(String),

    #[error("image dimensions are zero")]
    ZeroDimensions,

    #[error("upload is {size} bytes, limit is {limit} bytes")]
    UploadTooLarge { size: usize, limit: usize },

    #[error("unsupported document type: {0}")]
    UnsupportedDocument(String),

    #[error("unsupported dpi: {0} (expected 150, 300 or 600)")]
    UnsupportedDpi(u32),

    #[error("unsupported layout: {0}")]
    UnsupportedLayout(String),

    #[error("unsupported background color: {0}")]
    UnsupportedBackground(String),

    #[error("sheet layout must have at least one column and one row, got {cols}x{rows}")]
    InvalidLayoutGrid { cols: u32, rows: u32 },

    #[error("zoom must be a finite value > 0, got {0}")]
    InvalidZoom(f64),

    #[error("zoom {zoom} frames a {width}x{height} region, limit is {limit} px per side")]
    ZoomOutOfRange {
        zoom: f64,
        width: u64,
        height: u64,
        limit: u64,
    },

    #[error("background removal failed: {0}")]
    BackgroundRemoval(#[source] CollaboratorError),

    #[error("failed to encode image: {0}")]
    EncodeError(String),

    #[error("processing task failed: {0}")]
    Worker(String),
}

impl IdSheetError {
    /// Stable machine-readable code for callers that surface errors to users.
    pub fn code(&self) -> &'static str {
        match self {
            IdSheetError::DecodeError(_) => "DECODE_ERROR",
            IdSheetError::ZeroDimensions => "ZERO_DIMENSIONS",
            IdSheetError::UploadTooLarge { .. } => "UPLOAD_TOO_LARGE",
            IdSheetError::UnsupportedDocument(_) => "UNSUPPORTED_DOCUMENT",
            IdSheetError::UnsupportedDpi(_) => "UNSUPPORTED_DPI",
            IdSheetError::UnsupportedLayout(_) => "UNSUPPORTED_LAYOUT",
            IdSheetError::UnsupportedBackground(_) => "UNSUPPORTED_BACKGROUND",
            IdSheetError::InvalidLayoutGrid { .. } => "INVALID_LAYOUT_GRID",
            IdSheetError::InvalidZoom(_) | IdSheetError::ZoomOutOfRange { .. } => "INVALID_ZOOM",
            IdSheetError::BackgroundRemoval(_) => "BACKGROUND_REMOVAL_FAILED",
            IdSheetError::EncodeError(_) => "ENCODE_ERROR",
            IdSheetError::Worker(_) => "WORKER_FAILED",
        }
    }

    /// Whether the request was rejected as invalid input rather than failing
    /// in processing or in a collaborator.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            IdSheetError::DecodeError(_)
                | IdSheetError::ZeroDimensions
                | IdSheetError::UploadTooLarge { .. }
                | IdSheetError::UnsupportedDocument(_)
                | IdSheetError::UnsupportedDpi(_)
                | IdSheetError::UnsupportedLayout(_)
                | IdSheetError::UnsupportedBackground(_)
                | IdSheetError::InvalidLayoutGrid { .. }
                | IdSheetError::InvalidZoom(_)
                | IdSheetError::ZoomOutOfRange { .. }
        )
    }
}

/// Failure reported by an external collaborator (background remover, upscaler).
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}
