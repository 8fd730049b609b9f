//! Floating-point image and mask buffers used at host boundaries.
//!
//! Hosts exchange pixels as `f32` samples in `[0, 1]`, row-major and
//! channel-interleaved (height × width × 3). Masks carry one sample per
//! pixel where any positive value is foreground. Conversion to 8-bit is
//! `round(clamp(v, 0, 1) * 255)`; conversion back divides by 255.

use image::{GrayImage, Luma, Rgb, RgbImage};

use crate::types::{BACKGROUND, CanvasError, FOREGROUND};

/// Number of color channels in a [`FloatImage`].
pub const CHANNELS: usize = 3;

/// An RGB image with `f32` samples in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatImage {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl FloatImage {
    /// Wrap interleaved RGB samples.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::BufferLength`] if `data` does not hold
    /// exactly `width * height * 3` samples.
    pub fn new(width: u32, height: u32, data: Vec<f32>) -> Result<Self, CanvasError> {
        check_len(width, height, CHANNELS, data.len())?;
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Interleaved samples.
    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Consume the buffer and return its samples.
    #[must_use]
    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    /// Quantize to 8-bit RGB.
    #[must_use]
    pub fn to_rgb8(&self) -> RgbImage {
        let mut samples = self.data.chunks_exact(CHANNELS);
        RgbImage::from_fn(self.width, self.height, |_, _| {
            samples
                .next()
                .map_or(Rgb([0, 0, 0]), |px| Rgb([to_u8(px[0]), to_u8(px[1]), to_u8(px[2])]))
        })
    }

    /// Expand 8-bit RGB to `[0, 1]` samples.
    #[must_use]
    pub fn from_rgb8(image: &RgbImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            data: image.as_raw().iter().map(|&v| to_f32(v)).collect(),
        }
    }
}

/// A single-channel mask with `f32` samples.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatMask {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl FloatMask {
    /// Wrap mask samples.
    ///
    /// # Errors
    ///
    /// Returns [`CanvasError::BufferLength`] if `data` does not hold
    /// exactly `width * height` samples.
    pub fn new(width: u32, height: u32, data: Vec<f32>) -> Result<Self, CanvasError> {
        check_len(width, height, 1, data.len())?;
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Row-major samples.
    #[must_use]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Consume the buffer and return its samples.
    #[must_use]
    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    /// Threshold into a binary 8-bit mask (`> 0` is foreground).
    #[must_use]
    pub fn to_gray8(&self) -> GrayImage {
        let mut samples = self.data.iter();
        GrayImage::from_fn(self.width, self.height, |_, _| {
            let on = samples.next().is_some_and(|&v| v > 0.0);
            Luma([if on { FOREGROUND } else { BACKGROUND }])
        })
    }

    /// Convert an 8-bit mask to `0.0`/`1.0` samples.
    #[must_use]
    pub fn from_gray8(mask: &GrayImage) -> Self {
        Self {
            width: mask.width(),
            height: mask.height(),
            data: mask
                .as_raw()
                .iter()
                .map(|&v| if v > BACKGROUND { 1.0 } else { 0.0 })
                .collect(),
        }
    }
}

fn check_len(width: u32, height: u32, channels: usize, actual: usize) -> Result<(), CanvasError> {
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(channels));
    match expected {
        Some(expected) if expected == actual => Ok(()),
        expected => Err(CanvasError::BufferLength {
            expected: expected.unwrap_or(usize::MAX),
            actual,
        }),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_u8(v: f32) -> u8 {
    // NaN clamps to 0 via the saturating cast.
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn to_f32(v: u8) -> f32 {
    f32::from(v) / 255.0
}
