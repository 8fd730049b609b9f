//! Shared types for the patchcanvas geometry engine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Re-export `RgbImage` so downstream crates can pass image buffers
/// without depending on `image` directly.
pub use image::RgbImage;

/// Re-export `GrayImage` so downstream crates can pass mask buffers
/// without depending on `image` directly.
pub use image::GrayImage;

/// Alignment stride for every canvas dimension.
pub const STRIDE: u32 = 64;

/// Mask sample value for foreground pixels produced by this crate.
pub const FOREGROUND: u8 = 255;

/// Mask sample value for background pixels.
pub const BACKGROUND: u8 = 0;

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Create a new size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Size of an image or mask buffer.
    #[must_use]
    pub fn of<I: image::GenericImageView>(image: &I) -> Self {
        let (width, height) = image.dimensions();
        Self { width, height }
    }

    /// Returns `true` if either axis is zero.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns `true` if the width is strictly greater than the height.
    #[must_use]
    pub const fn is_wide(self) -> bool {
        self.width > self.height
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Axis-aligned rectangle in pixel coordinates, origin at the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: u32,
    /// Top edge (inclusive).
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge (exclusive).
    #[must_use]
    pub const fn right(self) -> u32 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[must_use]
    pub const fn bottom(self) -> u32 {
        self.y + self.height
    }

    /// Width and height of the rectangle.
    #[must_use]
    pub const fn dimensions(self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    /// Returns `true` if the rectangle has zero area.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns `true` if the rectangle lies entirely inside an image of
    /// the given size.
    #[must_use]
    pub const fn fits_within(self, bounds: Dimensions) -> bool {
        self.right() <= bounds.width && self.bottom() <= bounds.height
    }
}

/// Aspect-ratio family expressed as a `short:long` integer pair.
///
/// The pair is not normalized: `4:3` and `3:4` are distinct families
/// because the resolver always assigns `short` and `long` to specific
/// axes based on the placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PatchType {
    /// The short side of the ratio.
    pub short: u32,
    /// The long side of the ratio.
    pub long: u32,
}

impl PatchType {
    /// `1:1`
    pub const SQUARE: Self = Self::new(1, 1);
    /// `3:4`
    pub const THREE_FOUR: Self = Self::new(3, 4);
    /// `4:3`
    pub const FOUR_THREE: Self = Self::new(4, 3);
    /// `9:16`
    pub const NINE_SIXTEEN: Self = Self::new(9, 16);

    /// The fixed table of patch types this crate accepts.
    pub const SUPPORTED: [Self; 4] = [
        Self::SQUARE,
        Self::THREE_FOUR,
        Self::FOUR_THREE,
        Self::NINE_SIXTEEN,
    ];

    const fn new(short: u32, long: u32) -> Self {
        Self { short, long }
    }

    /// Normalization denominator used to split an output length into a
    /// width/height pair.
    #[must_use]
    pub const fn total(self) -> u32 {
        self.short * 2
    }
}

impl fmt::Display for PatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.short, self.long)
    }
}

impl FromStr for PatchType {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CanvasError::InvalidPatchType(s.to_string());
        let (short, long) = s.split_once(':').ok_or_else(invalid)?;
        let short: u32 = short.trim().parse().map_err(|_| invalid())?;
        let long: u32 = long.trim().parse().map_err(|_| invalid())?;
        if short == 0 || long == 0 {
            return Err(invalid());
        }

        let patch = Self::new(short, long);
        if Self::SUPPORTED.contains(&patch) {
            Ok(patch)
        } else {
            Err(CanvasError::UnsupportedPatchType(patch))
        }
    }
}

impl TryFrom<String> for PatchType {
    type Error = CanvasError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PatchType> for String {
    fn from(value: PatchType) -> Self {
        value.to_string()
    }
}

/// Requested orientation for the two-canvas layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchMode {
    /// Pick [`Placement::PatchBottom`] for wide sources, otherwise
    /// [`Placement::PatchRight`].
    #[default]
    Auto,
    /// Always place the second canvas to the right.
    PatchRight,
    /// Always place the second canvas below.
    PatchBottom,
}

impl PatchMode {
    /// Resolve `Auto` against the source image's aspect ratio.
    #[must_use]
    pub const fn placement_for(self, source: Dimensions) -> Placement {
        match self {
            Self::Auto if source.is_wide() => Placement::PatchBottom,
            Self::Auto | Self::PatchRight => Placement::PatchRight,
            Self::PatchBottom => Placement::PatchBottom,
        }
    }
}

impl fmt::Display for PatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::PatchRight => f.write_str("patch_right"),
            Self::PatchBottom => f.write_str("patch_bottom"),
        }
    }
}

impl FromStr for PatchMode {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "auto" => Ok(Self::Auto),
            "patch_right" => Ok(Self::PatchRight),
            "patch_bottom" => Ok(Self::PatchBottom),
            other => Err(CanvasError::InvalidPatchMode(other.to_string())),
        }
    }
}

impl From<Placement> for PatchMode {
    fn from(value: Placement) -> Self {
        match value {
            Placement::PatchRight => Self::PatchRight,
            Placement::PatchBottom => Self::PatchBottom,
        }
    }
}

/// A resolved [`PatchMode`]: never `auto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Tall canvases laid out side by side.
    PatchRight,
    /// Wide canvases stacked vertically.
    PatchBottom,
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        PatchMode::from(*self).fmt(f)
    }
}

/// Solid RGB fill color, written as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PatchColor(pub [u8; 3]);

impl PatchColor {
    /// `#FF0000`
    pub const RED: Self = Self([255, 0, 0]);
    /// `#00FF00`
    pub const GREEN: Self = Self([0, 255, 0]);
    /// `#0000FF`
    pub const BLUE: Self = Self([0, 0, 255]);
    /// `#FFFFFF`
    pub const WHITE: Self = Self([255, 255, 255]);

    /// The colors offered to hosts as a fixed choice list.
    pub const PALETTE: [Self; 4] = [Self::RED, Self::GREEN, Self::BLUE, Self::WHITE];

    /// The color as an `image` pixel.
    #[must_use]
    pub const fn to_rgb(self) -> image::Rgb<u8> {
        image::Rgb(self.0)
    }
}

impl Default for PatchColor {
    fn default() -> Self {
        Self::RED
    }
}

impl fmt::Display for PatchColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02X}{g:02X}{b:02X}")
    }
}

impl FromStr for PatchColor {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CanvasError::InvalidColor(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }

        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self([channel(0)?, channel(2)?, channel(4)?]))
    }
}

impl TryFrom<String> for PatchColor {
    type Error = CanvasError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PatchColor> for String {
    fn from(value: PatchColor) -> Self {
        value.to_string()
    }
}

/// Errors that can occur while preparing canvases.
#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    /// The patch type was not of the form `short:long` with positive integers.
    #[error("invalid patch type {0:?}: expected \"short:long\" with positive integers")]
    InvalidPatchType(String),

    /// The patch type parsed but is not one of [`PatchType::SUPPORTED`].
    #[error("unsupported patch type {0}")]
    UnsupportedPatchType(PatchType),

    /// The placement mode string was not recognized.
    #[error("invalid patch mode {0:?}: expected auto, patch_right or patch_bottom")]
    InvalidPatchMode(String),

    /// The fill color was not a `#RRGGBB` hex string.
    #[error("invalid patch color {0:?}: expected #RRGGBB")]
    InvalidColor(String),

    /// A mask does not cover the same pixel grid as its image.
    #[error("mask size {mask} does not match image size {image}")]
    MaskSizeMismatch {
        /// Size of the image buffer.
        image: Dimensions,
        /// Size of the mask buffer.
        mask: Dimensions,
    },

    /// The requested output length resolved to a zero-sized canvas.
    #[error("target canvas {0} is empty; output length must be at least {stride}", stride = STRIDE)]
    DegenerateTarget(Dimensions),

    /// The source image has no pixels.
    #[error("source image is empty")]
    EmptyImage,

    /// A boundary buffer's sample count does not match its declared shape.
    #[error("buffer holds {actual} samples, expected {expected}")]
    BufferLength {
        /// `width * height * channels`.
        expected: usize,
        /// Actual number of samples supplied.
        actual: usize,
    },
}
