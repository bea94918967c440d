use image::codecs::jpeg::{JpegEncoder, PixelDensity};
use image::{DynamicImage, ImageEncoder, Rgb, RgbImage, RgbaImage};
use tracing::debug;

use crate::crop::{solve_crop, CropWindow, FramingProfile, TargetSpec};
use crate::enhance::{enhance, EnhancementProfile};
use crate::error::IdSheetError;
use crate::face_detector::FaceBounds;
use crate::locator::FaceLocator;
use crate::pad::{pad_to_window, Padding};
use crate::resample::resample;

/// JPEG quality used for print output.
pub(crate) const PRINT_JPEG_QUALITY: u8 = 95;

/// The padded buffer may span at most this many times the source's longer side.
const MAX_FRAME_SCALE: u64 = 4;

/// Immutable settings for the photo pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Face-height ratio, headroom and fallback bias.
    pub framing: FramingProfile,
    /// Multipliers for the tonal enhancement stage.
    pub enhancement: EnhancementProfile,
    /// Run the tonal enhancement stage.
    pub enhance: bool,
    /// Hand the finished photo to the external upscaler, when one is configured.
    pub upscale: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            framing: FramingProfile::default(),
            enhancement: EnhancementProfile::default(),
            enhance: true,
            upscale: false,
        }
    }
}

/// A document photo at its exact target size, with how it was framed.
#[derive(Debug, Clone)]
pub struct ProcessedPhoto {
    /// Exactly `TargetSpec` pixels.
    pub image: RgbImage,
    /// Face used for framing, in source coordinates. `None` means the
    /// centered fallback crop was used.
    pub face: Option<FaceBounds>,
    /// Crop window as solved, in source coordinates, before padding.
    pub crop: CropWindow,
    /// Edge extension applied before cropping.
    pub padding: Padding,
    /// Whether the crop had to be clamped into the padded buffer.
    pub clamped: bool,
}

/// Locate → solve → pad → resample → enhance, as one pure function of its
/// inputs.
#[derive(Default)]
pub struct PhotoPipeline {
    locator: FaceLocator,
    config: PipelineConfig,
}

impl PhotoPipeline {
    /// Pipeline with the given face strategies and settings.
    pub fn new(locator: FaceLocator, config: PipelineConfig) -> Self {
        Self { locator, config }
    }

    /// Current settings.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Turn a flattened RGB portrait into a document photo of exactly
    /// `target` pixels. `zoom` above 1.0 frames the face tighter.
    pub fn process(
        &self,
        image: &RgbImage,
        target: TargetSpec,
        zoom: f64,
    ) -> Result<ProcessedPhoto, IdSheetError> {
        validate_zoom(zoom)?;
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 || target.width_px == 0 || target.height_px == 0 {
            return Err(IdSheetError::ZeroDimensions);
        }

        let face = self.locator.locate(image);
        if face.is_none() {
            debug!(width, height, "no face found, using centered crop");
        }

        let crop = solve_crop(face.as_ref(), width, height, target, &self.config.framing, zoom);
        debug!(?crop, "crop window solved");
        check_frame(&crop, width, height, zoom)?;

        let padded = pad_to_window(image, crop);
        let cropped = padded.extract();
        let resized = resample(&cropped, target);

        let photo = if self.config.enhance {
            enhance(&resized, &self.config.enhancement)
        } else {
            resized
        };

        Ok(ProcessedPhoto {
            image: photo,
            face,
            crop,
            padding: padded.padding,
            clamped: padded.clamped,
        })
    }
}

/// Reject windows whose padded buffer would dwarf the source. A small zoom
/// grows the window without bound.
fn check_frame(
    crop: &CropWindow,
    width: u32,
    height: u32,
    zoom: f64,
) -> Result<(), IdSheetError> {
    let limit = MAX_FRAME_SCALE * u64::from(width.max(height));
    let span = |start: i64, end: i64, size: u32| {
        end.max(i64::from(size)).saturating_sub(start.min(0)) as u64
    };
    let padded_w = span(crop.left, crop.right(), width);
    let padded_h = span(crop.top, crop.bottom(), height);

    if padded_w > limit || padded_h > limit {
        return Err(IdSheetError::ZoomOutOfRange {
            zoom,
            width: padded_w,
            height: padded_h,
            limit,
        });
    }
    Ok(())
}

pub(crate) fn validate_zoom(zoom: f64) -> Result<(), IdSheetError> {
    if zoom.is_finite() && zoom > 0.0 {
        Ok(())
    } else {
        Err(IdSheetError::InvalidZoom(zoom))
    }
}

/// Decode input bytes into a `DynamicImage`.
pub(crate) fn decode_image(input: &[u8]) -> Result<DynamicImage, IdSheetError> {
    let image =
        image::load_from_memory(input).map_err(|e| IdSheetError::DecodeError(e.to_string()))?;
    if image.width() == 0 || image.height() == 0 {
        return Err(IdSheetError::ZeroDimensions);
    }
    Ok(image)
}

/// Composite an RGBA cutout onto a solid background color.
pub fn flatten_onto(cutout: &RgbaImage, background: Rgb<u8>) -> RgbImage {
    let (width, height) = cutout.dimensions();
    let mut rgb = RgbImage::new(width, height);

    for (x, y, pixel) in cutout.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = a as f32 / 255.0;
        let inv_alpha = 1.0 - alpha;
        let mix = |c: u8, bg: u8| (c as f32 * alpha + bg as f32 * inv_alpha).round() as u8;
        rgb.put_pixel(
            x,
            y,
            Rgb([
                mix(r, background[0]),
                mix(g, background[1]),
                mix(b, background[2]),
            ]),
        );
    }

    rgb
}

/// Encode as baseline JPEG with `dpi` recorded as pixel density.
pub(crate) fn encode_jpeg(image: &RgbImage, quality: u8, dpi: u32) -> Result<Vec<u8>, IdSheetError> {
    let mut buffer = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    let density = u16::try_from(dpi).unwrap_or(u16::MAX);
    encoder.set_pixel_density(PixelDensity::dpi(density));
    encoder
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| IdSheetError::EncodeError(e.to_string()))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face_detector::FaceDetector;

    struct FixedFace(FaceBounds);

    impl FaceDetector for FixedFace {
        fn detect(&self, _gray: &[u8], _width: u32, _height: u32) -> Vec<FaceBounds> {
            vec![self.0.clone()]
        }
    }

    fn make_test_rgb(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                128,
            ])
        })
    }

    const TARGET: TargetSpec = TargetSpec {
        width_px: 413,
        height_px: 531,
    };

    fn pipeline_with_face(face: FaceBounds) -> PhotoPipeline {
        PhotoPipeline::new(
            FaceLocator::new().with_strategy(Box::new(FixedFace(face))),
            PipelineConfig::default(),
        )
    }

    #[test]
    fn fallback_output_is_exact_target() {
        let out = PhotoPipeline::default()
            .process(&make_test_rgb(800, 600), TARGET, 1.0)
            .unwrap();
        assert_eq!(out.image.dimensions(), (413, 531));
        assert!(out.face.is_none());
        assert_eq!(out.crop.left, 166);
        assert!(out.padding.is_zero());
    }

    #[test]
    fn face_near_edge_is_padded_not_clamped() {
        let face = FaceBounds {
            x: 0.0,
            y: 2.0,
            width: 300.0,
            height: 300.0,
            confidence: 1.0,
        };
        let out = pipeline_with_face(face)
            .process(&make_test_rgb(400, 300), TARGET, 1.0)
            .unwrap();
        assert_eq!(out.image.dimensions(), (413, 531));
        assert!(out.face.is_some());
        assert!(out.padding.top > 0);
        assert!(out.padding.left > 0);
        assert!(out.padding.bottom > 0);
        assert!(!out.clamped);
    }

    #[test]
    fn enhancement_toggle_changes_output() {
        let img = make_test_rgb(300, 400);
        let plain = PhotoPipeline::new(
            FaceLocator::new(),
            PipelineConfig {
                enhance: false,
                ..PipelineConfig::default()
            },
        )
        .process(&img, TARGET, 1.0)
        .unwrap();
        let enhanced = PhotoPipeline::default().process(&img, TARGET, 1.0).unwrap();
        assert_eq!(plain.crop, enhanced.crop);
        assert_ne!(plain.image, enhanced.image);
    }

    #[test]
    fn tiny_zoom_is_rejected_before_padding() {
        let pipeline = pipeline_with_face(FaceBounds {
            x: 100.0,
            y: 80.0,
            width: 200.0,
            height: 200.0,
            confidence: 1.0,
        });
        let img = make_test_rgb(400, 300);
        for zoom in [0.01, 0.001, 1e-300] {
            let err = pipeline.process(&img, TARGET, zoom).unwrap_err();
            match &err {
                IdSheetError::ZoomOutOfRange { limit, .. } => assert_eq!(*limit, 1600),
                other => panic!("zoom {zoom}: unexpected {other:?}"),
            }
            assert_eq!(err.code(), "INVALID_ZOOM");
            assert!(err.is_validation());
        }
    }

    #[test]
    fn moderate_zoom_out_still_renders() {
        let pipeline = pipeline_with_face(FaceBounds {
            x: 100.0,
            y: 80.0,
            width: 200.0,
            height: 200.0,
            confidence: 1.0,
        });
        let out = pipeline.process(&make_test_rgb(400, 300), TARGET, 0.5).unwrap();
        assert_eq!(out.crop.height, 533);
        assert_eq!(out.image.dimensions(), (413, 531));
    }

    #[test]
    fn fallback_crop_ignores_zoom_bound() {
        let out = PhotoPipeline::default()
            .process(&make_test_rgb(400, 300), TARGET, 0.001)
            .unwrap();
        assert!(out.crop.fits_within(400, 300));
    }

    #[test]
    fn rejects_bad_zoom() {
        let img = make_test_rgb(50, 50);
        for zoom in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = PhotoPipeline::default().process(&img, TARGET, zoom).unwrap_err();
            assert!(matches!(err, IdSheetError::InvalidZoom(_)));
        }
    }

    #[test]
    fn flatten_transparent_takes_background() {
        let mut rgba = RgbaImage::new(2, 1);
        rgba.put_pixel(0, 0, image::Rgba([255, 0, 0, 0]));
        rgba.put_pixel(1, 0, image::Rgba([100, 150, 200, 255]));
        let rgb = flatten_onto(&rgba, Rgb([210, 210, 210]));
        assert_eq!(rgb.get_pixel(0, 0), &Rgb([210, 210, 210]));
        assert_eq!(rgb.get_pixel(1, 0), &Rgb([100, 150, 200]));
    }

    #[test]
    fn flatten_blends_semitransparent() {
        let mut rgba = RgbaImage::new(1, 1);
        rgba.put_pixel(0, 0, image::Rgba([255, 0, 0, 128]));
        let rgb = flatten_onto(&rgba, Rgb([255, 255, 255]));
        let pixel = rgb.get_pixel(0, 0);
        assert!((pixel.0[0] as i16 - 255).abs() <= 1);
        assert!((pixel.0[1] as i16 - 127).abs() <= 2);
        assert!((pixel.0[2] as i16 - 127).abs() <= 2);
    }

    #[test]
    fn encode_jpeg_produces_valid_output() {
        let data = encode_jpeg(&make_test_rgb(48, 64), PRINT_JPEG_QUALITY, 300).unwrap();
        assert_eq!(data[0], 0xFF);
        assert_eq!(data[1], 0xD8);
    }

    #[test]
    fn invalid_input_returns_error() {
        let err = decode_image(b"not an image").unwrap_err();
        assert!(err.is_validation());
    }
}
