//! inpaint - exemplar-based image inpainting
//!
//! Implements the greedy, priority-driven scheme of Criminisi-Perez-Toyama,
//! augmented with forward look-ahead over the top-K target patches and a
//! continuation-difference tiebreaker over the top-K source candidates.
//!
//! ## Example
//!
//! ```rust,no_run
//! use inpaint::{inpaint_file, EngineOptions};
//! use std::path::Path;
//!
//! let options = EngineOptions {
//!     patch_radius: 4,
//!     ..Default::default()
//! };
//!
//! inpaint_file(Path::new("input.png"), Path::new("mask.png"), Path::new("output.png"), &options)
//!     .expect("inpainting failed");
//! ```

pub mod acceptance;
pub mod boundary;
pub mod buffers;
pub mod debug;
pub mod engine;
pub mod filters;
pub mod geometry;
pub mod isophote;
pub mod mask;
pub mod priority;
pub mod raster_io;
pub mod search;
pub mod source_index;
pub mod verification;

pub use anyhow::Result;
pub use buffers::MultiChannelField;
pub use engine::{CoreError, Engine, IterationRecord, PatchPair, StepOutcome};
pub use mask::Mask;

use std::path::Path;

use acceptance::{AcceptanceVisitor, AverageDifference, Composite, VarianceDifference};
use priority::PriorityStrategy;
use search::{DifferenceFn, GradientMagnitudeHistogramDifference, HsvHistogramDifference, LuminanceDifference, SquaredL2Difference};

/// Which pluggable patch-difference function `EngineOptions` wires up.
/// Kept free of `clap` here; the CLI maps its own argument enum onto
/// this one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DifferenceKind {
    SquaredL2,
    Luminance,
    GradientMagnitudeHistogram,
    HsvHistogram,
}

impl Default for DifferenceKind {
    fn default() -> Self {
        DifferenceKind::SquaredL2
    }
}

impl DifferenceKind {
    pub fn build(self) -> Box<dyn DifferenceFn> {
        match self {
            DifferenceKind::SquaredL2 => Box::new(SquaredL2Difference),
            DifferenceKind::Luminance => Box::new(LuminanceDifference),
            DifferenceKind::GradientMagnitudeHistogram => Box::new(GradientMagnitudeHistogramDifference),
            DifferenceKind::HsvHistogram => Box::new(HsvHistogramDifference),
        }
    }
}

/// Tunables for `inpaint_file`, analogous to `ConversionOptions`.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub patch_radius: u32,
    pub max_forward_look: usize,
    pub top_patches: usize,
    pub recompute_isophotes_every_n_steps: u32,
    pub priority: PriorityStrategy,
    pub difference: DifferenceKind,
    pub acceptance_average_threshold: Option<f32>,
    pub acceptance_variance_threshold: Option<f32>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            patch_radius: 5,
            max_forward_look: 10,
            top_patches: 10,
            recompute_isophotes_every_n_steps: 0,
            priority: PriorityStrategy::default(),
            difference: DifferenceKind::default(),
            acceptance_average_threshold: None,
            acceptance_variance_threshold: None,
        }
    }
}

fn build_acceptance(options: &EngineOptions) -> Box<dyn AcceptanceVisitor> {
    let mut children: Vec<Box<dyn AcceptanceVisitor>> = Vec::new();
    if let Some(threshold) = options.acceptance_average_threshold {
        children.push(Box::new(AverageDifference { threshold }));
    }
    if let Some(threshold) = options.acceptance_variance_threshold {
        children.push(Box::new(VarianceDifference { threshold }));
    }
    Box::new(Composite { children })
}

/// Read `input_path`/`mask_path`, run the engine to completion under
/// `options`, and write the result to `output_path`. Returns the
/// finished engine so callers can inspect `iteration()`/`history()`.
pub fn inpaint_file(input_path: &Path, mask_path: &Path, output_path: &Path, options: &EngineOptions) -> Result<Engine> {
    let image = raster_io::read_image(input_path)?;
    let mask = raster_io::read_mask(mask_path)?;

    let mut engine = Engine::new(image, mask, options.patch_radius)?;
    engine.set_priority(options.priority);
    engine.set_difference(options.difference.build());
    engine.set_acceptance(build_acceptance(options));
    engine.set_max_forward_look(options.max_forward_look);
    engine.set_top_patches(options.top_patches);
    engine.set_recompute_isophotes_every_n_steps(options.recompute_isophotes_every_n_steps);

    engine.run_to_completion()?;
    raster_io::write_image(output_path, engine.image())?;
    Ok(engine)
}
