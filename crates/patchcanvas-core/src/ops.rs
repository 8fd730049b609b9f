//! Host-facing operations over floating-point buffers.
//!
//! Each function mirrors one operation a host exposes to its users: it
//! quantizes the incoming [`FloatImage`]/[`FloatMask`] buffers, runs the
//! pure pipeline, and converts the results back. Outputs are flat structs
//! with a fixed set of named fields so a host can map them positionally.

use serde::Serialize;

use crate::compose::compose;
use crate::config::{ConcatConfig, ContextWindowConfig, ResolveConfig};
use crate::context::build;
use crate::resolve::resolve;
use crate::tensor::{FloatImage, FloatMask};
use crate::types::{CanvasError, Dimensions, Placement};

/// Result of [`resolve_dimensions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolveOutput {
    /// Stride-aligned output length.
    pub output_length: u32,
    /// Resolved placement.
    pub patch_mode: Placement,
    /// Width of one canvas.
    pub target_width: u32,
    /// Height of one canvas.
    pub target_height: u32,
}

/// Result of [`create_context_window`].
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOutput {
    /// Context window resized to the target canvas.
    pub image: FloatImage,
    /// Its binary mask.
    pub mask: FloatMask,
    /// Resolved placement.
    pub patch_mode: Placement,
    /// Left edge of the window in the source image.
    pub x_offset: u32,
    /// Top edge of the window in the source image.
    pub y_offset: u32,
    /// Source pixels per canvas pixel.
    pub scale: f64,
    /// The window at source resolution.
    pub raw_image: FloatImage,
    /// Its mask at source resolution.
    pub raw_mask: FloatMask,
}

/// Result of [`concat_context_window`].
#[derive(Debug, Clone, PartialEq)]
pub struct ComposeOutput {
    /// Joined image.
    pub image: FloatImage,
    /// Joined mask.
    pub mask: FloatMask,
    /// Width of one canvas.
    pub target_width: u32,
    /// Height of one canvas.
    pub target_height: u32,
    /// Horizontal marker of the second canvas.
    pub x_offset: u32,
    /// Vertical marker of the second canvas.
    pub y_offset: u32,
    /// Width of the joined image.
    pub total_width: u32,
    /// Height of the joined image.
    pub total_height: u32,
}

/// Resolve the canvas geometry for `image`.
#[must_use]
pub fn resolve_dimensions(image: &FloatImage, config: &ResolveConfig) -> ResolveOutput {
    let source = Dimensions::new(image.width(), image.height());
    let resolution = resolve(source, config);
    ResolveOutput {
        output_length: resolution.output_length,
        patch_mode: resolution.placement,
        target_width: resolution.target.width,
        target_height: resolution.target.height,
    }
}

/// Crop and resize a context window around the region of interest.
///
/// # Errors
///
/// Propagates every error of [`build`].
pub fn create_context_window(
    image: &FloatImage,
    mask: &FloatMask,
    config: &ContextWindowConfig,
) -> Result<BuildOutput, CanvasError> {
    let window = build(&image.to_rgb8(), &mask.to_gray8(), config)?;
    Ok(BuildOutput {
        image: FloatImage::from_rgb8(&window.image),
        mask: FloatMask::from_gray8(&window.mask),
        patch_mode: window.info.placement,
        x_offset: window.info.x_offset,
        y_offset: window.info.y_offset,
        scale: window.info.scale,
        raw_image: FloatImage::from_rgb8(&window.raw_image),
        raw_mask: FloatMask::from_gray8(&window.raw_mask),
    })
}

/// Fit two images to the same canvas and join them.
///
/// # Errors
///
/// Propagates every error of [`compose`].
pub fn concat_context_window(
    first: &FloatImage,
    second: Option<&FloatImage>,
    second_mask: Option<&FloatMask>,
    config: &ConcatConfig,
) -> Result<ComposeOutput, CanvasError> {
    let second = second.map(FloatImage::to_rgb8);
    let second_mask = second_mask.map(FloatMask::to_gray8);
    let composite = compose(
        &first.to_rgb8(),
        second.as_ref(),
        second_mask.as_ref(),
        config,
    )?;

    let info = composite.info;
    Ok(ComposeOutput {
        image: FloatImage::from_rgb8(&composite.image),
        mask: FloatMask::from_gray8(&composite.mask),
        target_width: info.target.width,
        target_height: info.target.height,
        x_offset: info.x_offset,
        y_offset: info.y_offset,
        total_width: info.total.width,
        total_height: info.total.height,
    })
}
