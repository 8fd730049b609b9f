//! Context-window builder: crop a target-shaped window around a mask's
//! region of interest and resize it to the resolved canvas.
//!
//! The window is the smallest rectangle with the target's aspect ratio
//! that covers the buffered region. It is centered on the region, then
//! shifted (never shrunk) to stay inside the image. It is only shrunk,
//! uniformly, when the image itself is too small to hold it.
//!
//! When the mask has no foreground the whole image is fitted instead and
//! the window reports zero offsets and unit scale.

use image::imageops;
use image::{GrayImage, RgbImage};
use serde::{Deserialize, Serialize};

use crate::config::ContextWindowConfig;
use crate::fit::{FitOptions, ensure_same_size, fit};
use crate::resample::{binarize, resize_image, resize_mask};
use crate::resolve::resolve;
use crate::roi::{RegionOfInterest, locate};
use crate::types::{CanvasError, Dimensions, Placement, Rect};

/// A prepared context window.
#[derive(Debug, Clone)]
pub struct ContextWindow {
    /// Window resized to the target canvas.
    pub image: RgbImage,
    /// Binary mask resized to the target canvas.
    pub mask: GrayImage,
    /// Raw window at source resolution.
    pub raw_image: RgbImage,
    /// Raw binary mask at source resolution.
    pub raw_mask: GrayImage,
    /// Geometry of the window in source coordinates.
    pub info: ContextWindowInfo,
}

/// Where a context window came from and how it was scaled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContextWindowInfo {
    /// Placement after resolving `auto`.
    pub placement: Placement,
    /// Left edge of the window in source pixels.
    pub x_offset: u32,
    /// Top edge of the window in source pixels.
    pub y_offset: u32,
    /// Source pixels per canvas pixel (`crop.width / target.width`).
    pub scale: f64,
    /// Size of the resized window.
    pub target: Dimensions,
    /// The window in source coordinates; `None` on the no-region fallback.
    pub crop: Option<Rect>,
    /// The located region; `None` when the mask had no foreground.
    pub region: Option<RegionOfInterest>,
}

/// Build a context window around the region of interest in `mask`.
///
/// # Errors
///
/// Returns [`CanvasError::EmptyImage`] for an empty source,
/// [`CanvasError::MaskSizeMismatch`] if `mask` does not match `image`,
/// and [`CanvasError::DegenerateTarget`] when the output length is too
/// small to produce a canvas.
pub fn build(
    image: &RgbImage,
    mask: &GrayImage,
    config: &ContextWindowConfig,
) -> Result<ContextWindow, CanvasError> {
    let source = Dimensions::of(image);
    if source.is_empty() {
        return Err(CanvasError::EmptyImage);
    }
    ensure_same_size(source, mask)?;

    let resolution = resolve(source, &config.resolve_config());
    let target = resolution.target;
    if target.is_empty() {
        return Err(CanvasError::DegenerateTarget(target));
    }

    let Some(region) = locate(mask, config.pixel_buffer) else {
        tracing::info!("mask has no foreground; fitting the whole image");
        return fit_whole_image(image, resolution.placement, target, config);
    };

    let crop = window_rect(&region, target, source);
    tracing::debug!(?crop, %target, "cropping context window");

    let binary = binarize(mask);
    let raw_image = imageops::crop_imm(image, crop.x, crop.y, crop.width, crop.height).to_image();
    let raw_mask = imageops::crop_imm(&binary, crop.x, crop.y, crop.width, crop.height).to_image();

    Ok(ContextWindow {
        image: resize_image(&raw_image, target, config.filter),
        mask: resize_mask(&raw_mask, target),
        raw_image,
        raw_mask,
        info: ContextWindowInfo {
            placement: resolution.placement,
            x_offset: crop.x,
            y_offset: crop.y,
            scale: f64::from(crop.width) / f64::from(target.width),
            target,
            crop: Some(crop),
            region: Some(region),
        },
    })
}

fn fit_whole_image(
    image: &RgbImage,
    placement: Placement,
    target: Dimensions,
    config: &ContextWindowConfig,
) -> Result<ContextWindow, CanvasError> {
    let options = FitOptions {
        filter: config.filter,
        ..FitOptions::default()
    };
    let fitted = fit(image, None, target, &options)?;
    Ok(ContextWindow {
        raw_image: fitted.image.clone(),
        raw_mask: fitted.mask.clone(),
        image: fitted.image,
        mask: fitted.mask,
        info: ContextWindowInfo {
            placement,
            x_offset: 0,
            y_offset: 0,
            scale: 1.0,
            target,
            crop: None,
            region: None,
        },
    })
}

/// The window rectangle for `region`, in source coordinates.
fn window_rect(region: &RegionOfInterest, target: Dimensions, source: Dimensions) -> Rect {
    let size = window_size(region.expanded.dimensions(), target, source);
    let (center_x, center_y) = region.center();
    Rect::new(
        place(center_x, size.width, source.width),
        place(center_y, size.height, source.height),
        size.width,
        size.height,
    )
}

/// Smallest `target`-shaped size covering `covered`, shrunk uniformly to
/// fit inside `source` when necessary.
fn window_size(covered: Dimensions, target: Dimensions, source: Dimensions) -> Dimensions {
    let (bw, bh) = (u64::from(covered.width), u64::from(covered.height));
    let (tw, th) = (u64::from(target.width), u64::from(target.height));
    let (sw, sh) = (u64::from(source.width), u64::from(source.height));

    let (mut width, mut height) = if bw * th >= bh * tw {
        (bw, (bw * th).div_ceil(tw))
    } else {
        ((bh * tw).div_ceil(th), bh)
    };
    if width > sw {
        width = sw;
        height = sw * th / tw;
    }
    if height > sh {
        height = sh;
        width = sh * tw / th;
    }

    // Both values are bounded by the source size, which fits in u32.
    Dimensions::new(
        u32::try_from(width.max(1)).unwrap_or(source.width),
        u32::try_from(height.max(1)).unwrap_or(source.height),
    )
}

/// Start of a span of `extent` centered on `center`, shifted into
/// `[0, bound)`.
const fn place(center: u32, extent: u32, bound: u32) -> u32 {
    let start = center.saturating_sub(extent / 2);
    let last_start = bound.saturating_sub(extent);
    if start > last_start { last_start } else { start }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use image::{Luma, Rgb};

    use super::*;
    use crate::types::{FOREGROUND, PatchMode, PatchType};

    fn square_mask(w: u32, h: u32, rect: Rect) -> GrayImage {
        GrayImage::from_fn(w, h, |x, y| {
            let inside = x >= rect.x && x < rect.right() && y >= rect.y && y < rect.bottom();
            Luma([if inside { FOREGROUND } else { 0 }])
        })
    }

    fn config(patch_type: PatchType, pixel_buffer: u32) -> ContextWindowConfig {
        ContextWindowConfig {
            patch_type,
            pixel_buffer,
            ..ContextWindowConfig::default()
        }
    }

    #[test]
    fn empty_mask_falls_back_to_whole_image() {
        let image = RgbImage::from_pixel(2000, 1000, Rgb([10, 20, 30]));
        let mask = GrayImage::new(2000, 1000);
        let window = build(&image, &mask, &config(PatchType::SQUARE, 64)).unwrap();

        assert_eq!(window.info.x_offset, 0);
        assert_eq!(window.info.y_offset, 0);
        assert!((window.info.scale - 1.0).abs() < f64::EPSILON);
        assert_eq!(window.info.placement, Placement::PatchBottom);
        assert_eq!(window.info.target, Dimensions::new(768, 768));
        assert!(window.info.crop.is_none());
        assert_eq!(Dimensions::of(&window.image), Dimensions::new(768, 768));
        assert_eq!(Dimensions::of(&window.raw_image), Dimensions::new(768, 768));
        assert!(window.mask.pixels().all(|p| p.0[0] == FOREGROUND));
    }

    #[test]
    fn centered_square_region() {
        let image = RgbImage::from_pixel(1000, 1000, Rgb([200, 100, 50]));
        let mask = square_mask(1000, 1000, Rect::new(450, 450, 100, 100));
        let window = build(&image, &mask, &config(PatchType::SQUARE, 64)).unwrap();

        let crop = window.info.crop.unwrap();
        assert_eq!(crop, Rect::new(418, 418, 164, 164));
        assert_eq!(window.info.placement, Placement::PatchRight);
        assert_eq!(window.info.target, Dimensions::new(768, 768));
        assert!((window.info.scale - 164.0 / 768.0).abs() < 1e-12);
        assert_eq!(Dimensions::of(&window.image), Dimensions::new(768, 768));
        assert_eq!(Dimensions::of(&window.mask), Dimensions::new(768, 768));
        assert_eq!(Dimensions::of(&window.raw_image), Dimensions::new(164, 164));
        assert_eq!(Dimensions::of(&window.raw_mask), Dimensions::new(164, 164));
    }

    #[test]
    fn window_covers_buffered_region_with_target_ratio() {
        // Wide region on a tall 3:4 canvas: width drives the window.
        let image = RgbImage::new(1000, 1200);
        let mask = square_mask(1000, 1200, Rect::new(300, 500, 240, 60));
        let window = build(&image, &mask, &config(PatchType::THREE_FOUR, 60)).unwrap();

        let crop = window.info.crop.unwrap();
        let region = window.info.region.unwrap();
        assert_eq!(region.expanded, Rect::new(270, 470, 300, 120));
        assert_eq!(crop.width, 300);
        assert_eq!(crop.height, 400);
        assert!(crop.x <= region.expanded.x && crop.right() >= region.expanded.right());
        assert!(crop.y <= region.expanded.y && crop.bottom() >= region.expanded.bottom());
    }

    #[test]
    fn window_is_shifted_inside_image_near_edges() {
        let image = RgbImage::new(1000, 1000);
        let mask = square_mask(1000, 1000, Rect::new(0, 950, 40, 50));
        let window = build(&image, &mask, &config(PatchType::SQUARE, 64)).unwrap();

        let crop = window.info.crop.unwrap();
        assert_eq!(crop.x, 0);
        assert_eq!(crop.bottom(), 1000);
        assert!(crop.fits_within(Dimensions::new(1000, 1000)));
    }

    #[test]
    fn window_larger_than_image_is_shrunk_uniformly() {
        // Whole-width region on a square canvas in a wide image: the
        // covering window would be taller than the image.
        let image = RgbImage::new(400, 100);
        let mask = square_mask(400, 100, Rect::new(0, 40, 400, 20));
        let cfg = ContextWindowConfig {
            patch_mode: PatchMode::PatchRight,
            ..config(PatchType::SQUARE, 0)
        };
        let window = build(&image, &mask, &cfg).unwrap();

        let crop = window.info.crop.unwrap();
        assert_eq!(crop, Rect::new(150, 0, 100, 100));
        assert_eq!(Dimensions::of(&window.image), Dimensions::new(768, 768));
    }

    #[test]
    fn full_foreground_mask_crops_whole_image() {
        let image = RgbImage::new(1000, 1000);
        let mask = GrayImage::from_pixel(1000, 1000, Luma([FOREGROUND]));
        let window = build(&image, &mask, &config(PatchType::SQUARE, 64)).unwrap();

        assert_eq!(window.info.region.unwrap().bounds, Rect::new(0, 0, 1000, 1000));
        assert_eq!(window.info.crop, Some(Rect::new(0, 0, 1000, 1000)));
        assert!((window.info.scale - 1000.0 / 768.0).abs() < 1e-12);
    }

    #[test]
    fn resized_mask_stays_binary() {
        let image = RgbImage::new(500, 500);
        let mut mask = square_mask(500, 500, Rect::new(200, 200, 37, 53));
        mask.put_pixel(210, 210, Luma([3]));
        let window = build(&image, &mask, &config(PatchType::NINE_SIXTEEN, 64)).unwrap();
        assert!(window.mask.pixels().all(|p| p.0[0] == 0 || p.0[0] == FOREGROUND));
        assert!(window.raw_mask.pixels().all(|p| p.0[0] == 0 || p.0[0] == FOREGROUND));
    }

    #[test]
    fn rejects_mismatched_mask() {
        let result = build(&RgbImage::new(10, 10), &GrayImage::new(10, 9), &config(PatchType::SQUARE, 64));
        assert!(matches!(result, Err(CanvasError::MaskSizeMismatch { .. })));
    }

    #[test]
    fn rejects_output_length_below_stride() {
        let cfg = ContextWindowConfig {
            output_length: 32,
            ..ContextWindowConfig::default()
        };
        let result = build(&RgbImage::new(10, 10), &GrayImage::new(10, 10), &cfg);
        assert!(matches!(result, Err(CanvasError::DegenerateTarget(_))));
    }

    #[test]
    fn place_clamps_both_ends() {
        assert_eq!(place(500, 164, 1000), 418);
        assert_eq!(place(10, 100, 1000), 0);
        assert_eq!(place(990, 100, 1000), 900);
        assert_eq!(place(50, 100, 100), 0);
    }
}
