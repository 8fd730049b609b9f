//! Resampling helpers shared by the fit engine and the context-window
//! builder.
//!
//! Images are resized with a smooth interpolating filter chosen by
//! [`ResampleFilter`]. Masks are always resized with nearest-neighbor
//! sampling so label boundaries stay hard: a resized mask never contains
//! values that were not present in the source.

use std::fmt;

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, RgbImage};
use serde::{Deserialize, Serialize};

use crate::types::{BACKGROUND, Dimensions, FOREGROUND};

/// Resampling filter used for image (not mask) resizing.
///
/// Ordered from fastest/lowest-quality to slowest/highest-quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResampleFilter {
    /// Nearest-neighbor: fastest, blocky artifacts.
    Nearest,
    /// Bilinear interpolation: fast, decent quality.
    Triangle,
    /// Bicubic (Catmull-Rom): moderate speed, good quality.
    #[default]
    CatmullRom,
    /// Gaussian: moderate speed, smooth output.
    Gaussian,
    /// Lanczos with 3 lobes: slowest, sharpest.
    Lanczos3,
}

impl ResampleFilter {
    /// Convert to the `image` crate's `FilterType`.
    const fn to_image_filter(self) -> FilterType {
        match self {
            Self::Nearest => FilterType::Nearest,
            Self::Triangle => FilterType::Triangle,
            Self::CatmullRom => FilterType::CatmullRom,
            Self::Gaussian => FilterType::Gaussian,
            Self::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl fmt::Display for ResampleFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nearest => f.write_str("nearest"),
            Self::Triangle => f.write_str("triangle"),
            Self::CatmullRom => f.write_str("catmull-rom"),
            Self::Gaussian => f.write_str("gaussian"),
            Self::Lanczos3 => f.write_str("lanczos3"),
        }
    }
}

/// Resize an image to exactly `size`.
///
/// Returns a copy without resampling when the image already has the
/// requested size.
#[must_use]
pub fn resize_image(image: &RgbImage, size: Dimensions, filter: ResampleFilter) -> RgbImage {
    if Dimensions::of(image) == size {
        return image.clone();
    }
    imageops::resize(image, size.width, size.height, filter.to_image_filter())
}

/// Resize a mask to exactly `size` with nearest-neighbor sampling.
#[must_use]
pub fn resize_mask(mask: &GrayImage, size: Dimensions) -> GrayImage {
    if Dimensions::of(mask) == size {
        return mask.clone();
    }
    imageops::resize(mask, size.width, size.height, FilterType::Nearest)
}

/// Map every nonzero sample to [`FOREGROUND`] and zero to [`BACKGROUND`].
#[must_use]
pub fn binarize(mask: &GrayImage) -> GrayImage {
    GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
        if mask.get_pixel(x, y).0[0] > 0 {
            Luma([FOREGROUND])
        } else {
            Luma([BACKGROUND])
        }
    })
}

/// A mask of the given size with every sample set to `value`.
#[must_use]
pub fn solid_mask(size: Dimensions, value: u8) -> GrayImage {
    GrayImage::from_pixel(size.width, size.height, Luma([value]))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn gradient(w: u32, h: u32) -> RgbImage {
        #[allow(clippy::cast_possible_truncation)]
        RgbImage::from_fn(w, h, |x, y| image::Rgb([(x % 256) as u8, (y % 256) as u8, 128]))
    }

    #[test]
    fn default_filter_is_catmull_rom() {
        assert_eq!(ResampleFilter::default(), ResampleFilter::CatmullRom);
    }

    #[test]
    fn filter_serializes_kebab_case() {
        let json = serde_json::to_string(&ResampleFilter::CatmullRom).unwrap();
        assert_eq!(json, "\"catmull-rom\"");
    }

    #[test]
    fn resize_image_hits_exact_size() {
        let img = gradient(37, 91);
        let resized = resize_image(&img, Dimensions::new(64, 128), ResampleFilter::Triangle);
        assert_eq!(Dimensions::of(&resized), Dimensions::new(64, 128));
    }

    #[test]
    fn resize_image_same_size_is_identity() {
        let img = gradient(20, 10);
        let resized = resize_image(&img, Dimensions::new(20, 10), ResampleFilter::Lanczos3);
        assert_eq!(resized.as_raw(), img.as_raw());
    }

    #[test]
    fn resize_mask_keeps_only_source_values() {
        let mask = GrayImage::from_fn(10, 10, |x, _| {
            if x < 5 { Luma([0]) } else { Luma([FOREGROUND]) }
        });
        let resized = resize_mask(&mask, Dimensions::new(33, 7));
        assert_eq!(Dimensions::of(&resized), Dimensions::new(33, 7));
        assert!(
            resized
                .pixels()
                .all(|p| p.0[0] == BACKGROUND || p.0[0] == FOREGROUND)
        );
    }

    #[test]
    fn binarize_maps_any_nonzero_to_foreground() {
        let mask = GrayImage::from_fn(4, 1, |x, _| Luma([[0, 1, 127, 255][x as usize]]));
        let binary = binarize(&mask);
        let values: Vec<u8> = binary.pixels().map(|p| p.0[0]).collect();
        assert_eq!(values, vec![0, 255, 255, 255]);
    }
}
