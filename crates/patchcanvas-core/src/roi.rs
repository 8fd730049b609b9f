//! Region-of-interest locator: find the foreground of a mask and grow it
//! by a pixel buffer.
//!
//! Only the first outer border discovered by Suzuki-Abe border following
//! (`imageproc::contours::find_contours`, raster scan order) is used. A
//! mask with several disjoint blobs therefore yields the region of the
//! top-most, then left-most blob; the others are ignored.

use image::{GrayImage, imageops};
use imageproc::contours::{BorderType, Contour, find_contours};
use imageproc::point::Point;
use serde::{Deserialize, Serialize};

use crate::resample::binarize;
use crate::types::{Dimensions, Rect};

/// Foreground region located in a mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionOfInterest {
    /// Tight bounding box of the first foreground component.
    pub bounds: Rect,
    /// `bounds` grown by the pixel buffer and clamped to the mask.
    pub expanded: Rect,
}

impl RegionOfInterest {
    /// Center of the tight bounding box, using floor halves.
    #[must_use]
    pub const fn center(&self) -> (u32, u32) {
        (
            self.bounds.x + self.bounds.width / 2,
            self.bounds.y + self.bounds.height / 2,
        )
    }
}

/// Locate the region of interest in `mask`.
///
/// Any nonzero sample counts as foreground. Returns `None` when the mask
/// has no foreground at all.
///
/// The buffer is split across both sides: `pixel_buffer / 2` is added
/// before the box and the remainder after it, so the expanded box is
/// `pixel_buffer` pixels larger on each axis unless it hits the mask edge.
#[must_use]
pub fn locate(mask: &GrayImage, pixel_buffer: u32) -> Option<RegionOfInterest> {
    if !mask.pixels().any(|p| p.0[0] > 0) {
        return None;
    }

    let contours: Vec<Contour<u32>> = find_contours(&with_border(&binarize(mask)));
    let first = contours
        .iter()
        .find(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())?;
    let padded = bounding_rect(&first.points)?;
    let bounds = Rect::new(
        padded.x.saturating_sub(1),
        padded.y.saturating_sub(1),
        padded.width,
        padded.height,
    );
    let expanded = expand(bounds, pixel_buffer, Dimensions::of(mask));

    tracing::debug!(?bounds, ?expanded, contours = contours.len(), "located region of interest");

    Some(RegionOfInterest { bounds, expanded })
}

/// Copy `mask` into a buffer with a one-pixel background frame.
///
/// Border following misses components that touch column 0, so every
/// component is moved off the edge before tracing. Contour points are
/// then one pixel right of and below their mask coordinates.
fn with_border(mask: &GrayImage) -> GrayImage {
    let mut framed = GrayImage::new(mask.width().saturating_add(2), mask.height().saturating_add(2));
    imageops::replace(&mut framed, mask, 1, 1);
    framed
}

/// Smallest rectangle containing every point.
fn bounding_rect(points: &[Point<u32>]) -> Option<Rect> {
    let first = points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in &points[1..] {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Some(Rect::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
}

/// Grow `bounds` by `pixel_buffer` and clamp it to `image`.
fn expand(bounds: Rect, pixel_buffer: u32, image: Dimensions) -> Rect {
    let lead = pixel_buffer / 2;
    let trail = pixel_buffer - lead;

    let left = bounds.x.saturating_sub(lead);
    let top = bounds.y.saturating_sub(lead);
    let right = bounds.right().saturating_add(trail).min(image.width);
    let bottom = bounds.bottom().saturating_add(trail).min(image.height);

    Rect::new(left, top, right - left, bottom - top)
}
