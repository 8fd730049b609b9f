//! Dimension resolver: turn a requested output length and patch type
//! into a stride-aligned target canvas.
//!
//! The output length describes the long side of the final two-canvas
//! composite. It is split by `short * 2` so that two canvases placed
//! along the resolved axis add up to roughly the requested length:
//!
//! ```text
//! patch_bottom: width = len * long / total, height = len * short / total
//! patch_right:  width = len * short / total, height = len * long / total
//! ```
//!
//! The shorter side is floored to a multiple of [`STRIDE`] and the longer
//! side is scaled from it and floored again, so ratios whose quotient is
//! not stride aligned (`9:16` → 1365) still yield a valid canvas (1344)
//! that stays within one stride of the requested ratio.

use serde::{Deserialize, Serialize};

use crate::config::ResolveConfig;
use crate::types::{Dimensions, Placement, STRIDE};

/// Outcome of resolving the target canvas geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Requested length floored to a multiple of [`STRIDE`].
    pub output_length: u32,
    /// Placement after resolving `auto`.
    pub placement: Placement,
    /// Size of a single canvas. Empty when `output_length` is zero.
    pub target: Dimensions,
}

/// Floor `value` to a multiple of [`STRIDE`].
#[must_use]
pub const fn align_to_stride(value: u32) -> u32 {
    value - value % STRIDE
}

/// Resolve target canvas dimensions for a source image.
///
/// Only the source's aspect ratio matters, and only when the mode is
/// `auto`. A requested length below [`STRIDE`] resolves to a zero-sized
/// target; operations that need a canvas reject it with
/// [`CanvasError::DegenerateTarget`](crate::CanvasError::DegenerateTarget).
#[must_use]
pub fn resolve(source: Dimensions, config: &ResolveConfig) -> Resolution {
    let output_length = align_to_stride(config.output_length);
    let placement = config.patch_mode.placement_for(source);
    let patch = config.patch_type;

    let (width_part, height_part) = match placement {
        Placement::PatchBottom => (patch.long, patch.short),
        Placement::PatchRight => (patch.short, patch.long),
    };
    let target = canvas_size(output_length, width_part, height_part, patch.total());

    if target.is_empty() {
        tracing::warn!(
            requested = config.output_length,
            "output length is below the {STRIDE}px stride; target canvas is empty"
        );
    } else {
        tracing::debug!(
            %placement,
            %target,
            patch_type = %patch,
            output_length,
            "resolved canvas geometry"
        );
    }

    Resolution {
        output_length,
        placement,
        target,
    }
}

/// Stride-aligned canvas for `length` split as `width_part:height_part`.
///
/// The shorter side is `length * part / total`, floored to the stride.
/// The longer side is derived from that aligned value and floored again,
/// so it never exceeds the exact ratio and falls short of it by less than
/// one stride. Neither side drops below one stride for a nonzero length.
fn canvas_size(length: u32, width_part: u32, height_part: u32, total: u32) -> Dimensions {
    if length == 0 || total == 0 || width_part == 0 || height_part == 0 {
        return Dimensions::new(0, 0);
    }
    let minor_part = u64::from(width_part.min(height_part));
    let major_part = u64::from(width_part.max(height_part));

    let minor = stride_side(u64::from(length) * minor_part / u64::from(total));
    let major = stride_side(u64::from(minor) * major_part / minor_part);

    if width_part <= height_part {
        Dimensions::new(minor, major)
    } else {
        Dimensions::new(major, minor)
    }
}

fn stride_side(raw: u64) -> u32 {
    align_to_stride(u32::try_from(raw).unwrap_or(u32::MAX)).max(STRIDE)
}
