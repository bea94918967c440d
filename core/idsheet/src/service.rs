use std::sync::Arc;
use std::time::{Duration, Instant};

use image::RgbImage;
use tracing::{debug, info, warn};

use crate::collaborator::{BackgroundRemover, Upscaler};
use crate::crop::TargetSpec;
use crate::error::{CollaboratorError, IdSheetError};
use crate::pipeline::{
    decode_image, encode_jpeg, flatten_onto, validate_zoom, PhotoPipeline, PRINT_JPEG_QUALITY,
};
use crate::resample::resample;
use crate::sheet::compose;
use crate::{PrintSheet, SheetRequest};

/// Per-call limits for the external collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollaboratorTimeouts {
    /// Limit for one background removal call.
    pub removal: Duration,
    /// Limit for one upscale call.
    pub upscale: Duration,
}

impl Default for CollaboratorTimeouts {
    fn default() -> Self {
        Self {
            removal: Duration::from_secs(30),
            upscale: Duration::from_secs(120),
        }
    }
}

/// Runs full sheet requests: background removal, the photo pipeline, the
/// optional upscaler, then the contact sheet.
///
/// Collaborator calls and pixel work run on tokio's blocking pool, so one
/// request waiting on the network never stalls another's CPU work. The
/// service holds no per-request state and can be shared behind an `Arc`.
///
/// A collaborator call that times out keeps its blocking thread until the
/// call returns. Those threads count against the runtime's blocking pool
/// (`tokio::runtime::Builder::max_blocking_threads`, 512 by default), so a
/// stalled remote slows new requests once the pool is exhausted. Give the
/// collaborator clients their own transport timeouts to release threads.
pub struct SheetService {
    remover: Arc<dyn BackgroundRemover>,
    upscaler: Option<Arc<dyn Upscaler>>,
    pipeline: Arc<PhotoPipeline>,
    timeouts: CollaboratorTimeouts,
}

impl SheetService {
    /// Service with the default pipeline (no face strategies, enhancement on).
    pub fn new(remover: Arc<dyn BackgroundRemover>) -> Self {
        Self {
            remover,
            upscaler: None,
            pipeline: Arc::new(PhotoPipeline::default()),
            timeouts: CollaboratorTimeouts::default(),
        }
    }

    /// Replace the photo pipeline (face strategies and config).
    pub fn pipeline(mut self, pipeline: PhotoPipeline) -> Self {
        self.pipeline = Arc::new(pipeline);
        self
    }

    /// Upscaler used when the pipeline config enables upscaling.
    pub fn upscaler(mut self, upscaler: Arc<dyn Upscaler>) -> Self {
        self.upscaler = Some(upscaler);
        self
    }

    /// Override the collaborator time limits.
    pub fn timeouts(mut self, timeouts: CollaboratorTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Produce the print sheet for one request.
    pub async fn render(&self, request: SheetRequest) -> Result<PrintSheet, IdSheetError> {
        let started = Instant::now();
        validate_zoom(request.zoom)?;

        let target = request.target();
        let layout = request.sheet_layout();
        let background = request.background.rgb();
        let zoom = request.zoom;
        let original_size = request.input.len();
        let file_name = request.file_name();

        let input = request.input;
        let decoded = run_blocking(move || decode_image(&input)).await??;
        debug!(
            width = decoded.width(),
            height = decoded.height(),
            "input decoded"
        );

        let remover = Arc::clone(&self.remover);
        let cutout = with_timeout(self.timeouts.removal, move || {
            remover.remove_background(&decoded)
        })
        .await
        .map_err(IdSheetError::BackgroundRemoval)?;
        debug!("background removed");

        let pipeline = Arc::clone(&self.pipeline);
        let processed = run_blocking(move || {
            let flattened = flatten_onto(&cutout, background);
            pipeline.process(&flattened, target, zoom)
        })
        .await??;

        let (photo, upscaled) = self.maybe_upscale(processed.image, target).await;

        let dpi = request.dpi;
        let (photo, sheet, encoded) = run_blocking(move || {
            let sheet = compose(&photo, &layout);
            let encoded = encode_jpeg(&sheet, PRINT_JPEG_QUALITY, dpi.value());
            (photo, sheet, encoded)
        })
        .await?;
        let data = encoded?;

        info!(
            document = %request.document,
            layout = %request.layout,
            face_found = processed.face.is_some(),
            clamped = processed.clamped,
            upscaled,
            bytes = data.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "sheet rendered"
        );

        Ok(PrintSheet {
            photo,
            sheet,
            data,
            file_name,
            dpi,
            face_bounds: processed.face,
            upscaled,
            original_size,
        })
    }

    /// Run the upscaler if enabled. Any failure keeps the photo as it was.
    async fn maybe_upscale(&self, photo: RgbImage, target: TargetSpec) -> (RgbImage, bool) {
        let upscaler = match (&self.upscaler, self.pipeline.config().upscale) {
            (Some(upscaler), true) => Arc::clone(upscaler),
            _ => return (photo, false),
        };

        let input = photo.clone();
        let result = with_timeout(self.timeouts.upscale, move || {
            upscaler.upscale(&input, target.width_px, target.height_px)
        })
        .await;

        match result {
            Ok(upscaled) if upscaled.dimensions() == (target.width_px, target.height_px) => {
                (upscaled, true)
            }
            Ok(upscaled) => {
                warn!(
                    got = ?upscaled.dimensions(),
                    "upscaler returned the wrong size, resampling"
                );
                (resample(&upscaled, target), true)
            }
            Err(e) => {
                warn!(error = %e, "upscale failed, keeping the resized photo");
                (photo, false)
            }
        }
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T, IdSheetError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| IdSheetError::Worker(e.to_string()))
}

/// Offload a blocking collaborator call and bound it by `limit`.
///
/// On timeout the blocking thread is left to finish on its own; its result is
/// dropped.
async fn with_timeout<T, F>(limit: Duration, f: F) -> Result<T, CollaboratorError>
where
    F: FnOnce() -> Result<T, CollaboratorError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::time::timeout(limit, tokio::task::spawn_blocking(f)).await {
        Ok(Ok(result)) => result,
        Ok(Err(join)) => Err(CollaboratorError::Transport(format!("call aborted: {join}"))),
        Err(_) => Err(CollaboratorError::Timeout(limit)),
    }
}
