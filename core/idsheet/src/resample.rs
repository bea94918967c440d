use image::imageops::FilterType;
use image::RgbImage;

use crate::crop::TargetSpec;

/// Resize `image` to exactly the target dimensions with a Lanczos3 filter.
///
/// Crop windows are built at the target aspect already, so this only changes
/// resolution. A buffer that is already target-sized comes back unchanged.
pub fn resample(image: &RgbImage, target: TargetSpec) -> RgbImage {
    if image.dimensions() == (target.width_px, target.height_px) {
        return image.clone();
    }
    image::imageops::resize(image, target.width_px, target.height_px, FilterType::Lanczos3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn make_test_rgb(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                128,
            ])
        })
    }

    #[test]
    fn downscale_hits_exact_target() {
        let target = TargetSpec {
            width_px: 413,
            height_px: 531,
        };
        let out = resample(&make_test_rgb(207, 267), target);
        assert_eq!(out.dimensions(), (413, 531));
    }

    #[test]
    fn target_sized_input_is_unchanged() {
        let img = make_test_rgb(35, 45);
        let target = TargetSpec {
            width_px: 35,
            height_px: 45,
        };
        assert_eq!(resample(&img, target), img);
    }

    #[test]
    fn resampling_twice_is_stable() {
        let target = TargetSpec {
            width_px: 60,
            height_px: 77,
        };
        let once = resample(&make_test_rgb(120, 154), target);
        let twice = resample(&once, target);
        assert_eq!(once, twice);
    }

    #[test]
    fn flat_color_survives_resize() {
        let img = RgbImage::from_pixel(90, 120, Rgb([210, 210, 210]));
        let target = TargetSpec {
            width_px: 33,
            height_px: 44,
        };
        let out = resample(&img, target);
        assert!(out.pixels().all(|p| p.0.iter().all(|&c| (c as i16 - 210).abs() <= 1)));
    }
}
