//! Canvas composer: fit two images to the same canvas and join them
//! side by side (`patch_right`) or stacked (`patch_bottom`).
//!
//! The first canvas is the reference: its mask is always background.
//! The second canvas is the editable area. When no second image is
//! given, a solid [`PatchColor`](crate::PatchColor) canvas stands in for
//! it.

use image::imageops;
use image::{GrayImage, ImageBuffer, Pixel, RgbImage};
use serde::{Deserialize, Serialize};

use crate::config::ConcatConfig;
use crate::fit::{FitOptions, fit};
use crate::resample::solid_mask;
use crate::resolve::resolve;
use crate::types::{BACKGROUND, CanvasError, Dimensions, Placement};

/// Position of the second-canvas marker as a percentage of the composite
/// extent along the placement axis.
pub const SECOND_CANVAS_MARKER_PERCENT: u32 = 50;

/// Two canvases joined into one.
#[derive(Debug, Clone)]
pub struct Composite {
    /// The joined image.
    pub image: RgbImage,
    /// The joined mask.
    pub mask: GrayImage,
    /// Layout metadata.
    pub info: CompositeInfo,
}

/// Layout of a [`Composite`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeInfo {
    /// Placement after resolving `auto`.
    pub placement: Placement,
    /// Size of each individual canvas.
    pub target: Dimensions,
    /// Horizontal marker for the second canvas; 0 for `patch_bottom`.
    pub x_offset: u32,
    /// Vertical marker for the second canvas; 0 for `patch_right`.
    pub y_offset: u32,
    /// Size of the composite.
    pub total: Dimensions,
}

/// Fit `first` and `second` to the resolved canvas and join them.
///
/// Mask defaults: the first canvas is all background; a real second
/// image without a mask is all foreground; the stand-in canvas is all
/// background unless `second_mask` is given.
///
/// # Errors
///
/// Returns [`CanvasError::EmptyImage`] for an empty input,
/// [`CanvasError::DegenerateTarget`] when the output length is too small,
/// and [`CanvasError::MaskSizeMismatch`] if `second_mask` does not match
/// `second`.
pub fn compose(
    first: &RgbImage,
    second: Option<&RgbImage>,
    second_mask: Option<&GrayImage>,
    config: &ConcatConfig,
) -> Result<Composite, CanvasError> {
    let source = Dimensions::of(first);
    if source.is_empty() {
        return Err(CanvasError::EmptyImage);
    }

    let resolution = resolve(source, &config.resolve_config());
    let target = resolution.target;
    if target.is_empty() {
        return Err(CanvasError::DegenerateTarget(target));
    }

    let plain = FitOptions {
        filter: config.filter,
        ..FitOptions::default()
    };
    let reference = fit(first, None, target, &plain)?.image;
    let reference_mask = solid_mask(target, BACKGROUND);

    let (editable, editable_mask) = if let Some(second) = second {
        let fitted = fit(second, second_mask, target, &plain)?;
        (fitted.image, fitted.mask)
    } else {
        stand_in_canvas(second_mask, target, config)?
    };

    let placement = resolution.placement;
    let image = concatenate(&reference, &editable, placement);
    let mask = concatenate(&reference_mask, &editable_mask, placement);

    let total = Dimensions::of(&image);
    let (x_offset, y_offset) = match placement {
        Placement::PatchRight => (marker(total.width), 0),
        Placement::PatchBottom => (0, marker(total.height)),
    };
    tracing::debug!(%placement, %target, %total, x_offset, y_offset, "composed canvases");

    Ok(Composite {
        image,
        mask,
        info: CompositeInfo {
            placement,
            target,
            x_offset,
            y_offset,
            total,
        },
    })
}

/// A solid patch-color canvas fitted like a real second image.
///
/// The canvas takes the mask's size when a mask is supplied so the pair
/// stays aligned through the fit.
fn stand_in_canvas(
    mask: Option<&GrayImage>,
    target: Dimensions,
    config: &ConcatConfig,
) -> Result<(RgbImage, GrayImage), CanvasError> {
    let fill = config.patch_color.to_rgb();
    let size = mask.map_or(target, Dimensions::of);
    let canvas = RgbImage::from_pixel(size.width, size.height, fill);

    let options = FitOptions {
        fill,
        filter: config.filter,
    };
    let fitted = fit(&canvas, mask, target, &options)?;
    let mask = if mask.is_some() {
        fitted.mask
    } else {
        solid_mask(target, BACKGROUND)
    };
    Ok((fitted.image, mask))
}

/// `SECOND_CANVAS_MARKER_PERCENT` percent of `extent`, truncated.
#[allow(clippy::cast_possible_truncation)]
const fn marker(extent: u32) -> u32 {
    let scaled = extent as u64 * SECOND_CANVAS_MARKER_PERCENT as u64 / 100;
    scaled as u32
}

/// Join two buffers along the placement axis.
fn concatenate<P>(
    first: &ImageBuffer<P, Vec<P::Subpixel>>,
    second: &ImageBuffer<P, Vec<P::Subpixel>>,
    placement: Placement,
) -> ImageBuffer<P, Vec<P::Subpixel>>
where
    P: Pixel + 'static,
{
    let (w1, h1) = first.dimensions();
    let (w2, h2) = second.dimensions();
    let (width, height, x, y) = match placement {
        Placement::PatchRight => (w1 + w2, h1.max(h2), w1, 0),
        Placement::PatchBottom => (w1.max(w2), h1 + h2, 0, h1),
    };

    let mut joined = ImageBuffer::new(width, height);
    imageops::replace(&mut joined, first, 0, 0);
    imageops::replace(&mut joined, second, i64::from(x), i64::from(y));
    joined
}
