//! patchcanvas: prepare context-window canvases from image files.
//!
//! Thin filesystem adapter over `patchcanvas-core`. Three subcommands
//! mirror the core operations:
//!
//! - `resolve`: print the canvas size and placement for an image
//! - `build`: crop a context window around a mask's region of interest
//! - `compose`: fit two images to one canvas size and join them
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin patchcanvas -- build photo.png mask.png \
//!     --out-image window.png --out-mask window-mask.png --json
//! ```

#![allow(clippy::print_stdout)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use patchcanvas_core::{
    ConcatConfig, ContextWindowConfig, Dimensions, GrayImage, PatchColor, PatchMode, PatchType,
    ResampleFilter, ResolveConfig, RgbImage,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Fit images and masks into stride-aligned context-window canvases.
#[derive(Parser, Debug)]
#[command(name = "patchcanvas", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print result metadata as JSON instead of a human-readable report.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the target canvas size and placement for an image.
    Resolve {
        /// Path to the source image.
        image: PathBuf,

        #[command(flatten)]
        geometry: GeometryArgs,
    },

    /// Crop a context window around the foreground of a mask.
    Build {
        /// Path to the source image.
        image: PathBuf,

        /// Path to the mask (any nonzero pixel is foreground).
        mask: PathBuf,

        /// Where to write the resized window.
        #[arg(long)]
        out_image: PathBuf,

        /// Where to write the resized window mask.
        #[arg(long)]
        out_mask: PathBuf,

        /// Where to write the window at source resolution.
        #[arg(long)]
        raw_image: Option<PathBuf>,

        /// Where to write the window mask at source resolution.
        #[arg(long)]
        raw_mask: Option<PathBuf>,

        /// Pixels added around the region of interest.
        #[arg(long, default_value_t = ContextWindowConfig::DEFAULT_PIXEL_BUFFER)]
        pixel_buffer: u32,

        #[command(flatten)]
        geometry: GeometryArgs,

        #[command(flatten)]
        resample: ResampleArgs,
    },

    /// Fit two images to the same canvas and join them.
    Compose {
        /// Path to the reference image.
        first: PathBuf,

        /// Path to the editable image; a solid patch color is used if absent.
        #[arg(long)]
        second: Option<PathBuf>,

        /// Path to the mask of the editable image.
        #[arg(long)]
        second_mask: Option<PathBuf>,

        /// Where to write the joined image.
        #[arg(long)]
        out_image: PathBuf,

        /// Where to write the joined mask.
        #[arg(long)]
        out_mask: PathBuf,

        /// Color of the stand-in canvas (#FF0000, #00FF00, #0000FF, #FFFFFF).
        #[arg(long, default_value_t = ConcatConfig::DEFAULT_PATCH_COLOR)]
        patch_color: PatchColor,

        #[command(flatten)]
        geometry: GeometryArgs,

        #[command(flatten)]
        resample: ResampleArgs,
    },
}

/// Geometry flags shared by every subcommand. Unset flags keep the
/// operation's own default.
#[derive(Args, Debug)]
struct GeometryArgs {
    /// Requested output length (floored to a multiple of 64).
    #[arg(long)]
    output_length: Option<u32>,

    /// Placement of the second canvas (auto, patch_right, patch_bottom).
    #[arg(long)]
    patch_mode: Option<PatchMode>,

    /// Aspect-ratio family (1:1, 3:4, 4:3, 9:16).
    #[arg(long)]
    patch_type: Option<PatchType>,

    /// Full operation config as a JSON string.
    ///
    /// When provided, all other parameter flags are ignored.
    #[arg(long)]
    config_json: Option<String>,
}

impl GeometryArgs {
    /// Parse `--config-json`, if present.
    fn json_config<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        self.config_json
            .as_deref()
            .map(|json| serde_json::from_str(json).context("failed to parse --config-json"))
            .transpose()
    }
}

#[derive(Args, Debug)]
struct ResampleArgs {
    /// Image resampling filter.
    #[arg(long, value_enum, default_value_t = CLI_DEFAULT_FILTER)]
    filter: Filter,
}

/// Image resampling filter selection.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Filter {
    /// Nearest-neighbor (fastest, blocky).
    Nearest,
    /// Bilinear interpolation (fast, decent quality).
    Triangle,
    /// Bicubic Catmull-Rom (moderate, good quality).
    CatmullRom,
    /// Gaussian (moderate, smooth).
    Gaussian,
    /// Lanczos with 3 lobes (slowest, sharpest).
    Lanczos3,
}

impl From<Filter> for ResampleFilter {
    fn from(filter: Filter) -> Self {
        match filter {
            Filter::Nearest => Self::Nearest,
            Filter::Triangle => Self::Triangle,
            Filter::CatmullRom => Self::CatmullRom,
            Filter::Gaussian => Self::Gaussian,
            Filter::Lanczos3 => Self::Lanczos3,
        }
    }
}

/// Maps a [`ResampleFilter`] to the local CLI [`Filter`] enum.
const fn filter_from_core(f: ResampleFilter) -> Filter {
    match f {
        ResampleFilter::Nearest => Filter::Nearest,
        ResampleFilter::Triangle => Filter::Triangle,
        ResampleFilter::CatmullRom => Filter::CatmullRom,
        ResampleFilter::Gaussian => Filter::Gaussian,
        ResampleFilter::Lanczos3 => Filter::Lanczos3,
    }
}

/// The CLI default filter, derived from the core default so the two
/// cannot silently diverge.
const CLI_DEFAULT_FILTER: Filter = filter_from_core(ContextWindowConfig::DEFAULT_FILTER);

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("patchcanvas={log_level},patchcanvas_core={log_level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(err) = run(&cli) {
        tracing::error!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Command::Resolve { image, geometry } => {
            let config = resolve_config(geometry)?;
            let image = load_image(image)?;
            let resolution = patchcanvas_core::resolve(Dimensions::of(&image), &config);
            report(cli.json, &resolution, || {
                format!(
                    "output_length: {}\npatch_mode: {}\ntarget: {}",
                    resolution.output_length, resolution.placement, resolution.target,
                )
            })
        }
        Command::Build {
            image,
            mask,
            out_image,
            out_mask,
            raw_image,
            raw_mask,
            pixel_buffer,
            geometry,
            resample,
        } => {
            let config = match geometry.json_config()? {
                Some(config) => config,
                None => ContextWindowConfig {
                    pixel_buffer: *pixel_buffer,
                    filter: resample.filter.into(),
                    ..apply_geometry(ContextWindowConfig::default(), geometry)
                },
            };
            let window = patchcanvas_core::build(&load_image(image)?, &load_mask(mask)?, &config)
                .context("failed to build context window")?;

            save(&window.image, out_image)?;
            save(&window.mask, out_mask)?;
            if let Some(path) = raw_image {
                save(&window.raw_image, path)?;
            }
            if let Some(path) = raw_mask {
                save(&window.raw_mask, path)?;
            }

            let info = window.info;
            report(cli.json, &info, || {
                format!(
                    "patch_mode: {}\nx_offset: {}\ny_offset: {}\nscale: {:.4}\ntarget: {}",
                    info.placement, info.x_offset, info.y_offset, info.scale, info.target,
                )
            })
        }
        Command::Compose {
            first,
            second,
            second_mask,
            out_image,
            out_mask,
            patch_color,
            geometry,
            resample,
        } => {
            let config = match geometry.json_config()? {
                Some(config) => config,
                None => ConcatConfig {
                    patch_color: *patch_color,
                    filter: resample.filter.into(),
                    ..apply_geometry(ConcatConfig::default(), geometry)
                },
            };
            let second = second.as_deref().map(load_image).transpose()?;
            let second_mask = second_mask.as_deref().map(load_mask).transpose()?;
            let composite = patchcanvas_core::compose(
                &load_image(first)?,
                second.as_ref(),
                second_mask.as_ref(),
                &config,
            )
            .context("failed to compose canvases")?;

            save(&composite.image, out_image)?;
            save(&composite.mask, out_mask)?;

            let info = composite.info;
            report(cli.json, &info, || {
                format!(
                    "patch_mode: {}\ntarget: {}\nx_offset: {}\ny_offset: {}\ntotal: {}",
                    info.placement, info.target, info.x_offset, info.y_offset, info.total,
                )
            })
        }
    }
}

fn resolve_config(geometry: &GeometryArgs) -> Result<ResolveConfig> {
    Ok(geometry
        .json_config()?
        .unwrap_or_else(|| apply_geometry(ResolveConfig::default(), geometry)))
}

/// Config types that carry the shared geometry parameters.
trait Geometry {
    fn set_output_length(&mut self, value: u32);
    fn set_patch_mode(&mut self, value: PatchMode);
    fn set_patch_type(&mut self, value: PatchType);
}

macro_rules! impl_geometry {
    ($($config:ty),+) => {
        $(impl Geometry for $config {
            fn set_output_length(&mut self, value: u32) {
                self.output_length = value;
            }
            fn set_patch_mode(&mut self, value: PatchMode) {
                self.patch_mode = value;
            }
            fn set_patch_type(&mut self, value: PatchType) {
                self.patch_type = value;
            }
        })+
    };
}

impl_geometry!(ResolveConfig, ContextWindowConfig, ConcatConfig);

/// Overlay the flags that were given on top of `config`.
fn apply_geometry<C: Geometry>(mut config: C, geometry: &GeometryArgs) -> C {
    if let Some(length) = geometry.output_length {
        config.set_output_length(length);
    }
    if let Some(mode) = geometry.patch_mode {
        config.set_patch_mode(mode);
    }
    if let Some(patch_type) = geometry.patch_type {
        config.set_patch_type(patch_type);
    }
    config
}

fn load_image(path: &Path) -> Result<RgbImage> {
    let image = image::open(path).with_context(|| format!("failed to read {}", path.display()))?;
    tracing::debug!(path = %path.display(), width = image.width(), height = image.height(), "loaded image");
    Ok(image.to_rgb8())
}

fn load_mask(path: &Path) -> Result<GrayImage> {
    let mask = image::open(path).with_context(|| format!("failed to read {}", path.display()))?;
    Ok(mask.to_luma8())
}

fn save<P>(buffer: &image::ImageBuffer<P, Vec<u8>>, path: &Path) -> Result<()>
where
    P: image::PixelWithColorType<Subpixel = u8>,
{
    buffer
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "wrote {}x{}", buffer.width(), buffer.height());
    Ok(())
}

/// Print `value` as JSON, or the human-readable text from `text`.
fn report<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    if json {
        let json = serde_json::to_string_pretty(value).context("failed to serialize result")?;
        println!("{json}");
    } else {
        println!("{}", text());
    }
    Ok(())
}
