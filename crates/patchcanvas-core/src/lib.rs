//! patchcanvas-core: Pure context-window geometry (sans-IO).
//!
//! Prepares image/mask pairs for in-context editing models that expect a
//! reference canvas and an editable canvas side by side:
//!
//! resolve target size -> locate region of interest -> crop context
//! window -> fit to canvas -> compose two canvases.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! `image` buffers (or the float buffers in [`tensor`]) and returns new
//! buffers plus the metadata needed to map results back onto the source.
//! All filesystem interaction lives in the `patchcanvas` binary.

pub mod compose;
pub mod config;
pub mod context;
pub mod fit;
pub mod ops;
pub mod resample;
pub mod resolve;
pub mod roi;
pub mod tensor;
pub mod types;

pub use compose::{Composite, CompositeInfo, compose};
pub use config::{ConcatConfig, ContextWindowConfig, ResolveConfig};
pub use context::{ContextWindow, ContextWindowInfo, build};
pub use fit::{FitOptions, FitTransform, Fitted, fit};
pub use resample::ResampleFilter;
pub use resolve::{Resolution, resolve};
pub use roi::{RegionOfInterest, locate};
pub use tensor::{FloatImage, FloatMask};
pub use types::{
    CanvasError, Dimensions, GrayImage, PatchColor, PatchMode, PatchType, Placement, Rect,
    RgbImage, STRIDE,
};
