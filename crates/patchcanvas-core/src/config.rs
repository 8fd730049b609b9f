//! Named-parameter configuration for each host-invokable operation.
//!
//! Every struct carries `DEFAULT_*` constants so adapters (CLI flags,
//! host schemas) can share the same defaults without duplicating them.

use serde::{Deserialize, Serialize};

use crate::resample::ResampleFilter;
use crate::types::{PatchColor, PatchMode, PatchType};

/// Parameters for [`crate::resolve::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// Requested output length before stride alignment.
    pub output_length: u32,
    /// Requested placement.
    pub patch_mode: PatchMode,
    /// Aspect-ratio family.
    pub patch_type: PatchType,
}

impl ResolveConfig {
    /// Default requested output length.
    pub const DEFAULT_OUTPUT_LENGTH: u32 = 1536;
    /// Default patch type.
    pub const DEFAULT_PATCH_TYPE: PatchType = PatchType::SQUARE;
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            output_length: Self::DEFAULT_OUTPUT_LENGTH,
            patch_mode: PatchMode::default(),
            patch_type: Self::DEFAULT_PATCH_TYPE,
        }
    }
}

/// Parameters for [`crate::context::build`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextWindowConfig {
    /// Requested output length before stride alignment.
    pub output_length: u32,
    /// Requested placement.
    pub patch_mode: PatchMode,
    /// Aspect-ratio family.
    pub patch_type: PatchType,
    /// Pixels added around the region of interest (split across both sides).
    pub pixel_buffer: u32,
    /// Filter used when resizing the cropped image.
    pub filter: ResampleFilter,
}

impl ContextWindowConfig {
    /// Default requested output length.
    pub const DEFAULT_OUTPUT_LENGTH: u32 = 1536;
    /// Default patch type.
    pub const DEFAULT_PATCH_TYPE: PatchType = PatchType::THREE_FOUR;
    /// Default buffer around the region of interest.
    pub const DEFAULT_PIXEL_BUFFER: u32 = 64;
    /// Default image resampling filter.
    pub const DEFAULT_FILTER: ResampleFilter = ResampleFilter::CatmullRom;

    /// The equivalent resolver parameters.
    #[must_use]
    pub const fn resolve_config(&self) -> ResolveConfig {
        ResolveConfig {
            output_length: self.output_length,
            patch_mode: self.patch_mode,
            patch_type: self.patch_type,
        }
    }
}

impl Default for ContextWindowConfig {
    fn default() -> Self {
        Self {
            output_length: Self::DEFAULT_OUTPUT_LENGTH,
            patch_mode: PatchMode::default(),
            patch_type: Self::DEFAULT_PATCH_TYPE,
            pixel_buffer: Self::DEFAULT_PIXEL_BUFFER,
            filter: Self::DEFAULT_FILTER,
        }
    }
}

/// Parameters for [`crate::compose::compose`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcatConfig {
    /// Requested output length before stride alignment.
    pub output_length: u32,
    /// Requested placement.
    pub patch_mode: PatchMode,
    /// Aspect-ratio family.
    pub patch_type: PatchType,
    /// Fill color of the stand-in second canvas.
    pub patch_color: PatchColor,
    /// Filter used when fitting both canvases.
    pub filter: ResampleFilter,
}

impl ConcatConfig {
    /// Default requested output length.
    pub const DEFAULT_OUTPUT_LENGTH: u32 = 1536;
    /// Default patch type.
    pub const DEFAULT_PATCH_TYPE: PatchType = PatchType::THREE_FOUR;
    /// Default stand-in color.
    pub const DEFAULT_PATCH_COLOR: PatchColor = PatchColor::RED;
    /// Default image resampling filter.
    pub const DEFAULT_FILTER: ResampleFilter = ResampleFilter::CatmullRom;

    /// The equivalent resolver parameters.
    #[must_use]
    pub const fn resolve_config(&self) -> ResolveConfig {
        ResolveConfig {
            output_length: self.output_length,
            patch_mode: self.patch_mode,
            patch_type: self.patch_type,
        }
    }
}

impl Default for ConcatConfig {
    fn default() -> Self {
        Self {
            output_length: Self::DEFAULT_OUTPUT_LENGTH,
            patch_mode: PatchMode::default(),
            patch_type: Self::DEFAULT_PATCH_TYPE,
            patch_color: Self::DEFAULT_PATCH_COLOR,
            filter: Self::DEFAULT_FILTER,
        }
    }
}
