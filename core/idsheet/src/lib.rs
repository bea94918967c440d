//! Identity photo sheets: frame a portrait to document-photo conventions and
//! tile copies onto a printable contact sheet.
//!
//! The pixel pipeline ([`PhotoPipeline`]) is synchronous and pure: locate a
//! face, solve the crop window, extend edges where the window leaves the
//! image, resample to the exact print size, and apply a fixed tonal
//! enhancement. [`SheetService`] wraps it with the external background remover
//! and optional upscaler and produces the final JPEG sheet.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use idsheet::{DocumentType, Dpi, LayoutPreset, OpaqueCutout, SheetRequest, SheetService};
//!
//! # async fn run() -> Result<(), idsheet::IdSheetError> {
//! let raw_bytes = std::fs::read("portrait.jpg").unwrap();
//! let service = SheetService::new(Arc::new(OpaqueCutout));
//! let request = SheetRequest::new(raw_bytes)?
//!     .document(DocumentType::Passport)
//!     .dpi(Dpi::STANDARD)
//!     .layout(LayoutPreset::FourByTwo);
//! let sheet = service.render(request).await?;
//! println!("{}: {} bytes", sheet.file_name, sheet.data.len());
//! # Ok(())
//! # }
//! ```
#![warn(missing_docs)]

mod collaborator;
/// Crop window geometry and print-size targets.
pub mod crop;
mod document;
/// Tonal enhancement chain.
pub mod enhance;
mod error;
/// Face detection traits and data types.
pub mod face_detector;
mod locator;
/// Edge-extension padding for crop windows that leave the image.
pub mod pad;
mod pipeline;
mod resample;
#[cfg(feature = "rustface")]
/// SeetaFace-based detector strategies.
pub mod rustface_backend;
mod service;
/// Contact sheet layout and composition.
pub mod sheet;

use image::RgbImage;

/// Collaborator contracts and the pass-through remover.
pub use collaborator::{BackgroundRemover, OpaqueCutout, Upscaler};
pub use crop::{CropWindow, FramingProfile, TargetSpec};
/// Document presets and request options.
pub use document::{BackgroundColor, DocumentType, Dpi, LayoutPreset, SheetOptions};
pub use enhance::EnhancementProfile;
/// Error types returned by idsheet operations.
pub use error::{CollaboratorError, IdSheetError};
/// Face detection trait and face bounding-box type.
pub use face_detector::{FaceBounds, FaceDetector};
pub use locator::FaceLocator;
pub use pipeline::{flatten_onto, PhotoPipeline, PipelineConfig, ProcessedPhoto};
pub use resample::resample;
#[cfg(feature = "rustface")]
pub use rustface_backend::{RustfaceDetector, RustfaceParams};
pub use service::{CollaboratorTimeouts, SheetService};
pub use sheet::{compose, SheetLayout};

/// Largest accepted upload.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Finished print job.
#[derive(Debug, Clone)]
pub struct PrintSheet {
    /// The single document photo, exactly at the document's pixel size.
    pub photo: RgbImage,

    /// The tiled contact sheet.
    pub sheet: RgbImage,

    /// The sheet encoded as JPEG.
    pub data: Vec<u8>,

    /// Suggested download name, e.g. `photo_passport_4x2.jpg`.
    pub file_name: String,

    /// Print resolution stored in the JPEG.
    pub dpi: Dpi,

    /// Face used for framing, in source coordinates, if one was found.
    pub face_bounds: Option<FaceBounds>,

    /// Whether the upscaler's output was used.
    pub upscaled: bool,

    /// Size of the original input in bytes.
    pub original_size: usize,
}

/// One sheet request: the uploaded bytes plus document, print and layout
/// choices.
///
/// Validation happens as early as possible: size and format on construction,
/// enum values when parsed from [`SheetOptions`].
#[derive(Debug, Clone)]
pub struct SheetRequest {
    input: Vec<u8>,
    document: DocumentType,
    dpi: Dpi,
    layout: LayoutPreset,
    background: BackgroundColor,
    zoom: f64,
}

impl SheetRequest {
    /// Create a request from raw image bytes (JPEG, PNG, or WebP).
    pub fn new(input: Vec<u8>) -> Result<Self, IdSheetError> {
        if input.len() > MAX_UPLOAD_BYTES {
            return Err(IdSheetError::UploadTooLarge {
                size: input.len(),
                limit: MAX_UPLOAD_BYTES,
            });
        }
        image::guess_format(&input).map_err(|e| IdSheetError::DecodeError(e.to_string()))?;

        Ok(Self {
            input,
            document: DocumentType::default(),
            dpi: Dpi::default(),
            layout: LayoutPreset::default(),
            background: BackgroundColor::default(),
            zoom: 1.0,
        })
    }

    /// Apply options from a form or JSON body. Unknown values are rejected.
    ///
    /// ```
    /// use idsheet::{SheetOptions, SheetRequest};
    ///
    /// let png = b"\x89PNG\r\n\x1a\n".to_vec();
    /// let opts = SheetOptions {
    ///     doc_type: Some("visa".into()),
    ///     layout: Some("3x3".into()),
    ///     ..Default::default()
    /// };
    /// let request = SheetRequest::new(png).unwrap().options(&opts).unwrap();
    /// assert_eq!(request.file_name(), "photo_visa_3x3.jpg");
    /// ```
    pub fn options(mut self, opts: &SheetOptions) -> Result<Self, IdSheetError> {
        if let Some(ref doc) = opts.doc_type {
            self.document = doc.parse()?;
        }
        if let Some(ref color) = opts.bg_color {
            self.background = color.parse()?;
        }
        if let Some(ref layout) = opts.layout {
            self.layout = layout.parse()?;
        }
        if let Some(dpi) = opts.dpi {
            self.dpi = Dpi::new(dpi)?;
        }
        if let Some(zoom) = opts.zoom {
            pipeline::validate_zoom(zoom)?;
            self.zoom = zoom;
        }
        Ok(self)
    }

    /// Set the document type (default: `DocumentType::Cin`).
    pub fn document(mut self, document: DocumentType) -> Self {
        self.document = document;
        self
    }

    /// Set the print resolution (default: 300 dpi).
    pub fn dpi(mut self, dpi: Dpi) -> Self {
        self.dpi = dpi;
        self
    }

    /// Set the sheet grid (default: 4x2).
    pub fn layout(mut self, layout: LayoutPreset) -> Self {
        self.layout = layout;
        self
    }

    /// Set the background color behind the cutout (default: gray).
    pub fn background(mut self, background: BackgroundColor) -> Self {
        self.background = background;
        self
    }

    /// Set the zoom factor (default: 1.0). Values above 1.0 frame the face
    /// tighter. Checked when the request is rendered.
    pub fn zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom;
        self
    }

    /// Pixel size of the document photo.
    pub fn target(&self) -> TargetSpec {
        self.document.target(self.dpi)
    }

    /// Grid and margin of the contact sheet.
    pub fn sheet_layout(&self) -> SheetLayout {
        self.layout.layout(self.dpi)
    }

    /// Suggested download name.
    pub fn file_name(&self) -> String {
        format!("photo_{}_{}.jpg", self.document, self.layout)
    }
}
