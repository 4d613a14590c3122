use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser)]
#[command(name = "inpaint")]
#[command(about = "Exemplar-based image inpainting (Criminisi-Perez-Toyama) with forward look-ahead")]
#[command(version)]
pub struct Cli {
    /// Image to inpaint
    pub image: PathBuf,

    /// Hole mask: 0 = hole, 255 = valid, anything else = ignored
    pub mask: PathBuf,

    /// Patch half-width; patches are (2r+1) x (2r+1)
    pub patch_half_width: u32,

    /// Where to write the completed image
    pub output: PathBuf,

    /// Highest-priority target patches evaluated jointly each step
    #[arg(long, default_value = "10")]
    pub max_forward_look: usize,

    /// Ranked source candidates kept per target
    #[arg(long, default_value = "10")]
    pub top_patches: usize,

    /// Recompute the isophote field from scratch every N steps instead of
    /// transporting it with each patch copy (0 = never)
    #[arg(long, default_value = "0")]
    pub recompute_isophotes_every_n_steps: u32,

    /// Patch-difference function used to rank source candidates
    #[arg(long, value_enum, default_value = "squared-l2")]
    pub difference: DifferenceArg,

    /// Reject a candidate whose mean absolute difference from the target
    /// exceeds this threshold
    #[arg(long)]
    pub acceptance_average_threshold: Option<f32>,

    /// Reject a candidate whose per-channel variance difference from the
    /// target exceeds this threshold
    #[arg(long)]
    pub acceptance_variance_threshold: Option<f32>,

    /// Write iter_N_source/target/mask.png for every step
    #[arg(long)]
    pub debug: bool,

    /// Directory for --debug images
    #[arg(long, default_value = "./inpaint-debug")]
    pub debug_dir: PathBuf,

    /// Write the per-iteration history as JSON to this path
    #[arg(long)]
    pub history_json: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DifferenceArg {
    SquaredL2,
    Luminance,
    GradientMagnitudeHistogram,
    HsvHistogram,
}

impl From<DifferenceArg> for inpaint::DifferenceKind {
    fn from(arg: DifferenceArg) -> Self {
        match arg {
            DifferenceArg::SquaredL2 => inpaint::DifferenceKind::SquaredL2,
            DifferenceArg::Luminance => inpaint::DifferenceKind::Luminance,
            DifferenceArg::GradientMagnitudeHistogram => inpaint::DifferenceKind::GradientMagnitudeHistogram,
            DifferenceArg::HsvHistogram => inpaint::DifferenceKind::HsvHistogram,
        }
    }
}
