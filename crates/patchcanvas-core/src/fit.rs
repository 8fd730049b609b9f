//! Fit engine: force an image/mask pair to an exact canvas size while
//! preserving aspect ratio.
//!
//! Two branches, chosen by comparing the source to the target:
//!
//! - **Pad** (source narrower *or* shorter than target): resize so the
//!   limiting axis matches the target exactly, then center the result on
//!   a filled canvas. The other axis never overflows with integer
//!   scaling, but if it did it would be center-cropped rather than
//!   padded.
//! - **Crop** (source at least as large on both axes): center-crop the
//!   largest region with the target's aspect ratio, then resize it down
//!   to the target.
//!
//! All centering uses the floor of half the difference on the leading
//! side and the remainder on the trailing side.

use image::imageops;
use image::{GrayImage, ImageBuffer, Luma, Pixel, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use crate::resample::{ResampleFilter, resize_image, resize_mask, solid_mask};
use crate::types::{BACKGROUND, CanvasError, Dimensions, FOREGROUND};

/// How a source became the fitted canvas.
///
/// `scale` is always source pixels per canvas pixel (greater than one
/// when the source was shrunk).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FitTransform {
    /// The resized source was placed on a larger canvas.
    Padded {
        /// Fill columns left of the content, in canvas pixels.
        pad_x: u32,
        /// Fill rows above the content, in canvas pixels.
        pad_y: u32,
        /// Source pixels per canvas pixel.
        scale: f64,
    },
    /// A centered region of the source was resized to the canvas.
    Cropped {
        /// Source columns dropped on the left, in source pixels.
        crop_x: u32,
        /// Source rows dropped on the top, in source pixels.
        crop_y: u32,
        /// Source pixels per canvas pixel.
        scale: f64,
    },
}

impl FitTransform {
    /// Source pixels per canvas pixel.
    #[must_use]
    pub const fn scale(&self) -> f64 {
        match *self {
            Self::Padded { scale, .. } | Self::Cropped { scale, .. } => scale,
        }
    }
}

/// Fill and resampling policy for [`fit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitOptions {
    /// Image fill used for padding. Mask padding is always background.
    pub fill: Rgb<u8>,
    /// Filter for the image. The mask always uses nearest neighbor.
    pub filter: ResampleFilter,
}

impl FitOptions {
    /// Default image padding color.
    pub const DEFAULT_FILL: Rgb<u8> = Rgb([255, 255, 255]);
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            fill: Self::DEFAULT_FILL,
            filter: ResampleFilter::default(),
        }
    }
}

/// A canvas of exactly the requested size.
#[derive(Debug, Clone)]
pub struct Fitted {
    /// Fitted image.
    pub image: RgbImage,
    /// Fitted mask; all foreground when no mask was supplied.
    pub mask: GrayImage,
    /// How the source maps onto the canvas.
    pub transform: FitTransform,
}

/// Fit `image` (and `mask`, if any) to exactly `target`.
///
/// When `mask` is `None` the returned mask is entirely foreground.
///
/// # Errors
///
/// Returns [`CanvasError::DegenerateTarget`] if `target` has a zero axis,
/// [`CanvasError::EmptyImage`] if `image` has no pixels, and
/// [`CanvasError::MaskSizeMismatch`] if `mask` does not match `image`.
pub fn fit(
    image: &RgbImage,
    mask: Option<&GrayImage>,
    target: Dimensions,
    options: &FitOptions,
) -> Result<Fitted, CanvasError> {
    let source = Dimensions::of(image);
    if target.is_empty() {
        return Err(CanvasError::DegenerateTarget(target));
    }
    if source.is_empty() {
        return Err(CanvasError::EmptyImage);
    }
    if let Some(mask) = mask {
        ensure_same_size(source, mask)?;
    }

    let (image, mask, transform) =
        if source.width < target.width || source.height < target.height {
            resize_and_pad(image, mask, target, options)
        } else {
            crop_and_resize(image, mask, target, options.filter)
        };

    tracing::debug!(%source, %target, ?transform, "fitted canvas");

    Ok(Fitted {
        image,
        mask: mask.unwrap_or_else(|| solid_mask(target, FOREGROUND)),
        transform,
    })
}

/// Fail fast when a mask does not share its image's pixel grid.
pub(crate) fn ensure_same_size(image: Dimensions, mask: &GrayImage) -> Result<(), CanvasError> {
    let mask = Dimensions::of(mask);
    if mask == image {
        Ok(())
    } else {
        Err(CanvasError::MaskSizeMismatch { image, mask })
    }
}

/// Size of `source` scaled so its limiting axis matches `target`.
///
/// The limiting axis is the one with the larger source-to-target ratio;
/// the other axis is truncated and therefore never exceeds its target.
fn contained_size(source: Dimensions, target: Dimensions) -> Dimensions {
    let (sw, sh) = (u64::from(source.width), u64::from(source.height));
    let (tw, th) = (u64::from(target.width), u64::from(target.height));

    if sw * th >= sh * tw {
        let height = u32::try_from(sh * tw / sw).unwrap_or(target.height);
        Dimensions::new(target.width, height.max(1))
    } else {
        let width = u32::try_from(sw * th / sh).unwrap_or(target.width);
        Dimensions::new(width.max(1), target.height)
    }
}

fn resize_and_pad(
    image: &RgbImage,
    mask: Option<&GrayImage>,
    target: Dimensions,
    options: &FitOptions,
) -> (RgbImage, Option<GrayImage>, FitTransform) {
    let source = Dimensions::of(image);
    let resized_size = contained_size(source, target);

    let resized = resize_image(image, resized_size, options.filter);
    let canvas = center_on_canvas(&resized, target, options.fill);
    let mask = mask.map(|m| {
        let resized_mask = resize_mask(m, resized_size);
        center_on_canvas(&resized_mask, target, Luma([BACKGROUND]))
    });

    let scale = if resized_size.width == target.width {
        f64::from(source.width) / f64::from(target.width)
    } else {
        f64::from(source.height) / f64::from(target.height)
    };
    let transform = FitTransform::Padded {
        pad_x: target.width.saturating_sub(resized_size.width) / 2,
        pad_y: target.height.saturating_sub(resized_size.height) / 2,
        scale,
    };

    (canvas, mask, transform)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn crop_and_resize(
    image: &RgbImage,
    mask: Option<&GrayImage>,
    target: Dimensions,
    filter: ResampleFilter,
) -> (RgbImage, Option<GrayImage>, FitTransform) {
    let source = Dimensions::of(image);
    let (sw, sh) = (f64::from(source.width), f64::from(source.height));
    let (tw, th) = (f64::from(target.width), f64::from(target.height));

    // Source relatively wider than the target: height drives the scale.
    let up_scale = if u64::from(source.width) * u64::from(target.height)
        > u64::from(source.height) * u64::from(target.width)
    {
        sh / th
    } else {
        sw / tw
    };

    let crop_width = ((tw * up_scale).round() as u32).clamp(1, source.width);
    let crop_height = ((th * up_scale).round() as u32).clamp(1, source.height);
    let crop_x = (source.width - crop_width) / 2;
    let crop_y = (source.height - crop_height) / 2;

    let cropped = imageops::crop_imm(image, crop_x, crop_y, crop_width, crop_height).to_image();
    let fitted = resize_image(&cropped, target, filter);
    let mask = mask.map(|m| {
        let cropped = imageops::crop_imm(m, crop_x, crop_y, crop_width, crop_height).to_image();
        resize_mask(&cropped, target)
    });

    let transform = FitTransform::Cropped {
        crop_x,
        crop_y,
        scale: up_scale,
    };
    (fitted, mask, transform)
}

/// Center `content` on a `target`-sized canvas filled with `fill`.
///
/// Axes where the content is larger than the target are center-cropped;
/// axes where it is smaller are padded.
fn center_on_canvas<P>(
    content: &ImageBuffer<P, Vec<P::Subpixel>>,
    target: Dimensions,
    fill: P,
) -> ImageBuffer<P, Vec<P::Subpixel>>
where
    P: Pixel + 'static,
{
    let (width, height) = content.dimensions();
    let visible = imageops::crop_imm(
        content,
        width.saturating_sub(target.width) / 2,
        height.saturating_sub(target.height) / 2,
        width.min(target.width),
        height.min(target.height),
    )
    .to_image();

    let mut canvas = ImageBuffer::from_pixel(target.width, target.height, fill);
    imageops::replace(
        &mut canvas,
        &visible,
        i64::from(target.width.saturating_sub(width) / 2),
        i64::from(target.height.saturating_sub(height) / 2),
    );
    canvas
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn gray_image(w: u32, h: u32) -> RgbImage {
        RgbImage::from_pixel(w, h, Rgb([128, 128, 128]))
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn rejects_empty_target() {
        let result = fit(&gray_image(10, 10), None, Dimensions::new(0, 64), &FitOptions::default());
        assert!(matches!(result, Err(CanvasError::DegenerateTarget(_))));
    }

    #[test]
    fn rejects_empty_image() {
        let result = fit(&RgbImage::new(0, 0), None, Dimensions::new(64, 64), &FitOptions::default());
        assert!(matches!(result, Err(CanvasError::EmptyImage)));
    }

    #[test]
    fn rejects_mismatched_mask() {
        let mask = GrayImage::new(10, 11);
        let result = fit(
            &gray_image(10, 10),
            Some(&mask),
            Dimensions::new(64, 64),
            &FitOptions::default(),
        );
        assert!(matches!(result, Err(CanvasError::MaskSizeMismatch { .. })));
    }

    #[test]
    fn identity_when_already_target_size() {
        let img = RgbImage::from_fn(64, 128, |x, y| {
            #[allow(clippy::cast_possible_truncation)]
            Rgb([x as u8, y as u8, 7])
        });
        let mask = GrayImage::from_fn(64, 128, |x, _| Luma([if x > 30 { 255 } else { 0 }]));
        let fitted = fit(&img, Some(&mask), Dimensions::new(64, 128), &FitOptions::default()).unwrap();
        assert_eq!(fitted.image.as_raw(), img.as_raw());
        assert_eq!(fitted.mask.as_raw(), mask.as_raw());
        assert_eq!(
            fitted.transform,
            FitTransform::Cropped {
                crop_x: 0,
                crop_y: 0,
                scale: 1.0
            }
        );
    }

    #[test]
    fn small_tall_source_is_scaled_and_padded_horizontally() {
        // 100x200 into 768x1024: height limits (200/1024 > 100/768),
        // resized to 512x1024, padded by 128 on each side.
        let fitted = fit(&gray_image(100, 200), None, Dimensions::new(768, 1024), &FitOptions::default())
            .unwrap();
        assert_eq!(Dimensions::of(&fitted.image), Dimensions::new(768, 1024));
        assert!(
            matches!(fitted.transform, FitTransform::Padded { pad_x: 128, pad_y: 0, .. }),
            "unexpected transform {:?}",
            fitted.transform,
        );
        assert_close(fitted.transform.scale(), 200.0 / 1024.0);
        // Padding is white, content is the source color.
        assert_eq!(fitted.image.get_pixel(0, 500), &Rgb([255, 255, 255]));
        assert_eq!(fitted.image.get_pixel(127, 500), &Rgb([255, 255, 255]));
        assert_eq!(fitted.image.get_pixel(384, 500), &Rgb([128, 128, 128]));
        assert_eq!(fitted.image.get_pixel(767, 500), &Rgb([255, 255, 255]));
    }

    #[test]
    fn odd_padding_puts_remainder_on_trailing_side() {
        // 10x3 into 64x64: width limits, resized to 64x19, 45 rows of
        // padding split 22 above and 23 below.
        let fitted = fit(&gray_image(10, 3), None, Dimensions::new(64, 64), &FitOptions::default()).unwrap();
        assert!(matches!(fitted.transform, FitTransform::Padded { pad_x: 0, pad_y: 22, .. }));
        assert_eq!(fitted.image.get_pixel(10, 21), &Rgb([255, 255, 255]));
        assert_eq!(fitted.image.get_pixel(10, 22), &Rgb([128, 128, 128]));
        assert_eq!(fitted.image.get_pixel(10, 40), &Rgb([128, 128, 128]));
        assert_eq!(fitted.image.get_pixel(10, 41), &Rgb([255, 255, 255]));
    }

    #[test]
    fn padded_mask_is_background_outside_content() {
        let mask = GrayImage::from_pixel(100, 200, Luma([255]));
        let fitted = fit(
            &gray_image(100, 200),
            Some(&mask),
            Dimensions::new(768, 1024),
            &FitOptions::default(),
        )
        .unwrap();
        assert_eq!(fitted.mask.get_pixel(0, 0).0[0], 0);
        assert_eq!(fitted.mask.get_pixel(128, 0).0[0], 255);
        assert_eq!(fitted.mask.get_pixel(639, 1023).0[0], 255);
        assert_eq!(fitted.mask.get_pixel(640, 1023).0[0], 0);
    }

    #[test]
    fn custom_fill_color_is_used_for_padding() {
        let options = FitOptions {
            fill: Rgb([255, 0, 0]),
            ..FitOptions::default()
        };
        let fitted = fit(&gray_image(10, 20), None, Dimensions::new(64, 64), &options).unwrap();
        assert_eq!(fitted.image.get_pixel(0, 0), &Rgb([255, 0, 0]));
    }

    #[test]
    fn mixed_source_is_padded_not_cropped() {
        // Wider than the target but shorter: width limits and the image
        // is shrunk, then padded vertically.
        let fitted = fit(&gray_image(2000, 500), None, Dimensions::new(768, 1024), &FitOptions::default())
            .unwrap();
        assert_eq!(Dimensions::of(&fitted.image), Dimensions::new(768, 1024));
        assert!(
            matches!(fitted.transform, FitTransform::Padded { pad_x: 0, pad_y: 416, .. }),
            "unexpected transform {:?}",
            fitted.transform,
        );
        assert_close(fitted.transform.scale(), 2000.0 / 768.0);
    }

    #[test]
    fn large_wide_source_is_cropped_horizontally() {
        // 2000x1000 into 768x768: height drives the scale, crop 1000x1000
        // from x = 500.
        let fitted = fit(&gray_image(2000, 1000), None, Dimensions::new(768, 768), &FitOptions::default())
            .unwrap();
        assert_eq!(Dimensions::of(&fitted.image), Dimensions::new(768, 768));
        assert!(
            matches!(fitted.transform, FitTransform::Cropped { crop_x: 500, crop_y: 0, .. }),
            "unexpected transform {:?}",
            fitted.transform,
        );
        assert_close(fitted.transform.scale(), 1000.0 / 768.0);
    }

    #[test]
    fn large_tall_source_is_cropped_vertically() {
        // 800x1600 into 768x1024: width drives the scale (800/768),
        // crop height round(1024 * 800/768) = 1067, crop_y = 266.
        let fitted = fit(&gray_image(800, 1600), None, Dimensions::new(768, 1024), &FitOptions::default())
            .unwrap();
        assert!(
            matches!(fitted.transform, FitTransform::Cropped { crop_x: 0, crop_y: 266, .. }),
            "unexpected transform {:?}",
            fitted.transform,
        );
        assert_close(fitted.transform.scale(), 800.0 / 768.0);
    }

    #[test]
    fn cropped_mask_tracks_image() {
        // Foreground only in the left quarter of a wide source: after a
        // center crop it is gone entirely.
        let mask = GrayImage::from_fn(2000, 1000, |x, _| Luma([if x < 400 { 255 } else { 0 }]));
        let fitted = fit(
            &gray_image(2000, 1000),
            Some(&mask),
            Dimensions::new(768, 768),
            &FitOptions::default(),
        )
        .unwrap();
        assert!(fitted.mask.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn missing_mask_becomes_all_foreground() {
        let fitted = fit(&gray_image(300, 300), None, Dimensions::new(128, 64), &FitOptions::default())
            .unwrap();
        assert_eq!(Dimensions::of(&fitted.mask), Dimensions::new(128, 64));
        assert!(fitted.mask.pixels().all(|p| p.0[0] == FOREGROUND));
    }

    #[test]
    fn contained_size_never_overflows_target() {
        for (sw, sh) in [(1, 1), (3, 7), (7, 3), (100, 101), (999, 1), (1, 999)] {
            for (tw, th) in [(64, 64), (768, 1024), (1024, 768), (768, 1344)] {
                let size = contained_size(Dimensions::new(sw, sh), Dimensions::new(tw, th));
                assert!(size.width <= tw && size.height <= th, "{sw}x{sh} -> {tw}x{th}: {size}");
                assert!(size.width == tw || size.height == th);
                assert!(size.width >= 1 && size.height >= 1);
            }
        }
    }

    #[test]
    fn center_on_canvas_crops_overflowing_axis() {
        let content = GrayImage::from_fn(10, 4, |x, _| {
            #[allow(clippy::cast_possible_truncation)]
            Luma([x as u8])
        });
        let canvas = center_on_canvas(&content, Dimensions::new(6, 8), Luma([99]));
        assert_eq!(canvas.dimensions(), (6, 8));
        // Columns 2..8 of the content survive, rows padded 2 above.
        assert_eq!(canvas.get_pixel(0, 2).0[0], 2);
        assert_eq!(canvas.get_pixel(5, 2).0[0], 7);
        assert_eq!(canvas.get_pixel(0, 1).0[0], 99);
        assert_eq!(canvas.get_pixel(0, 6).0[0], 99);
    }
}
