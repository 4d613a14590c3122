//! The orchestration loop: `Engine`, `StepOutcome`, `CoreError`, and the
//! per-step pipeline of boundary -> normals -> priority -> top-K targets
//! -> ranked sources -> accept/verify -> copy -> update.
//!
//! Grounded on the top-level `convert()` (`lib.rs`) for the "load, run
//! fixed stages, hand back a result" shape, generalised here from a
//! single linear pipeline into a stateful step/loop machine.

use thiserror::Error;

use crate::acceptance::{AcceptanceVisitor, Composite};
use crate::boundary::{compute_normals, extract_boundary};
use crate::buffers::{MultiChannelField, ScalarField, VectorField};
use crate::filters::masked_gaussian_blur;
use crate::geometry::{Index, Region, NEIGHBOR_OFFSETS_8};
use crate::isophote::{self, ISOPHOTE_GAUSSIAN_VARIANCE};
use crate::mask::Mask;
use crate::priority::{PriorityEngine, PriorityOverride, PriorityStrategy};
use crate::search::{rank_sources, continuation_score, Candidate, DifferenceFn, SquaredL2Difference};
use crate::source_index::SourcePatchIndex;
use crate::verification::{AutoAcceptVerification, Decision, VerificationUi};

/// Why an `InvalidInput` was rejected.
#[derive(Debug, Error)]
pub enum InvalidInputReason {
    #[error("image is {image_width}x{image_height} but mask is {mask_width}x{mask_height}")]
    DimensionMismatch {
        image_width: u32,
        image_height: u32,
        mask_width: u32,
        mask_height: u32,
    },
    #[error("patch radius {patch_radius} is too large for a {width}x{height} image")]
    PatchRadiusTooLarge { patch_radius: u32, width: u32, height: u32 },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(InvalidInputReason),

    #[error("source-patch index is empty after initialisation (patch_radius={patch_radius})")]
    NoSourcePatches { patch_radius: u32 },

    #[error("priority maximum at {pixel:?} has no HOLE 8-neighbour")]
    PriorityDesync { pixel: Index },

    #[error("acceptance visitor rejected every ranked source for target {target:?} and no verification UI is configured")]
    AllCandidatesRejected { target: Index },

    #[error("verification UI returned Quit at iteration {iteration}")]
    UserQuit { iteration: u32 },

    #[error("internal invariant violated: {detail}")]
    InternalInvariant { detail: String },
}

/// A completed source/target copy, with the score and continuation
/// difference of the source that was ultimately chosen.
#[derive(Debug, Clone, Copy)]
pub struct PatchPair {
    pub source: Region,
    pub target: Region,
    pub score: f32,
    pub continuation: f32,
}

/// The top-K source candidates considered for one target, in one step.
#[derive(Debug, Clone)]
pub struct CandidatePatches {
    pub target: Index,
    pub candidates: Vec<Candidate>,
}

/// One step's worth of history: every target considered and the pair
/// finally chosen.
#[derive(Debug, Clone)]
pub struct IterationRecord {
    pub iteration: u32,
    pub candidate_patches: Vec<CandidatePatches>,
    pub chosen: PatchPair,
}

#[derive(Debug, Clone)]
pub enum StepOutcome {
    Filled(PatchPair),
    Finished,
}

/// `Uninitialised` is represented by `Engine::new` not yet having
/// returned, and `Stepping` by being inside the body of `step()`; both
/// are transient enough that they need no stored representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EngineState {
    Idle(u32),
    Finished,
}

pub struct Engine {
    image: MultiChannelField,
    blurred_image: MultiChannelField,
    mask: Mask,
    confidence: ScalarField,
    isophotes: VectorField,
    source_index: SourcePatchIndex,
    patch_radius: u32,
    iteration: u32,
    state: EngineState,

    priority_engine: PriorityEngine,
    priority_override: Option<Box<dyn PriorityOverride>>,
    acceptance: Box<dyn AcceptanceVisitor>,
    difference: Box<dyn DifferenceFn>,
    verification: Option<Box<dyn VerificationUi>>,
    max_forward_look: usize,
    top_patches: usize,
    recompute_isophotes_every_n_steps: u32,

    history: Vec<IterationRecord>,
}

fn initial_confidence(mask: &Mask) -> ScalarField {
    let mut out = ScalarField::filled(mask.width(), mask.height(), 0.0);
    for row in 0..mask.height() as i32 {
        for col in 0..mask.width() as i32 {
            let idx = Index::new(row, col);
            if mask.is_valid(idx) {
                out.set(idx, 1.0);
            }
        }
    }
    out
}

/// Paints HOLE pixels pure green, purely as a visual-debug aid. The
/// sentinel must never be read by any measurement; every scoring and
/// priority path here reads `BlurredImage` or consults `Mask` first.
fn paint_sentinel(image: &mut MultiChannelField, mask: &Mask) {
    let channels = image.channels;
    let mut sentinel = vec![0.0f32; channels];
    if channels >= 3 {
        sentinel[1] = 255.0;
    }
    for row in 0..image.height() as i32 {
        for col in 0..image.width() as i32 {
            let idx = Index::new(row, col);
            if mask.is_hole(idx) {
                image.set(idx, &sentinel);
            }
        }
    }
}

impl Engine {
    /// Build and initialise an engine over `image`/`mask` with a fixed
    /// patch half-width `patch_radius`. Defaults: `ConfidenceTimesData`
    /// priority, squared-L2 difference, an accept-everything acceptance
    /// visitor, `AutoAcceptVerification`, `max_forward_look = 10`,
    /// `top_patches = 10`.
    pub fn new(image: MultiChannelField, mask: Mask, patch_radius: u32) -> Result<Self, CoreError> {
        if image.width() != mask.width() || image.height() != mask.height() {
            return Err(CoreError::InvalidInput(InvalidInputReason::DimensionMismatch {
                image_width: image.width(),
                image_height: image.height(),
                mask_width: mask.width(),
                mask_height: mask.height(),
            }));
        }
        let min_dim = image.width().min(image.height());
        if patch_radius >= min_dim / 2 {
            return Err(CoreError::InvalidInput(InvalidInputReason::PatchRadiusTooLarge {
                patch_radius,
                width: image.width(),
                height: image.height(),
            }));
        }

        let isophotes = isophote::compute_isophotes(&image, &mask);
        let sigma = ISOPHOTE_GAUSSIAN_VARIANCE.sqrt();
        let blurred_image = masked_gaussian_blur(&image, &mask, sigma);

        let mut working_image = image;
        paint_sentinel(&mut working_image, &mask);

        let confidence = initial_confidence(&mask);

        let mut source_index = SourcePatchIndex::new(patch_radius);
        source_index.seed(&mask);
        if source_index.is_empty() {
            return Err(CoreError::NoSourcePatches { patch_radius });
        }

        log::info!(
            "engine initialised: {}x{} image, {} hole pixels, patch_radius={}",
            working_image.width(),
            working_image.height(),
            mask.hole_count(),
            patch_radius
        );

        Ok(Self {
            image: working_image,
            blurred_image,
            mask,
            confidence,
            isophotes,
            source_index,
            patch_radius,
            iteration: 0,
            state: EngineState::Idle(0),
            priority_engine: PriorityEngine::new(PriorityStrategy::default()),
            priority_override: None,
            acceptance: Box::new(Composite { children: Vec::new() }),
            difference: Box::new(SquaredL2Difference),
            verification: Some(Box::new(AutoAcceptVerification)),
            max_forward_look: 10,
            top_patches: 10,
            recompute_isophotes_every_n_steps: 0,
            history: Vec::new(),
        })
    }

    pub fn set_priority(&mut self, strategy: PriorityStrategy) {
        self.priority_engine = PriorityEngine::new(strategy);
    }

    /// `Some` bypasses boundary extraction and the confidence/data/priority
    /// computation for every subsequent `step()`, using the override's
    /// `(boundary_pixels, priority)` pair instead. `None` (the default)
    /// restores the normal pipeline.
    pub fn set_priority_override(&mut self, priority_override: Option<Box<dyn PriorityOverride>>) {
        self.priority_override = priority_override;
    }

    pub fn set_acceptance(&mut self, visitor: Box<dyn AcceptanceVisitor>) {
        self.acceptance = visitor;
    }

    pub fn set_difference(&mut self, diff_fn: Box<dyn DifferenceFn>) {
        self.difference = diff_fn;
    }

    /// `None` makes a post-acceptance-rejection fallback terminate with
    /// `CoreError::AllCandidatesRejected` instead of calling a UI.
    pub fn set_verification(&mut self, verification: Option<Box<dyn VerificationUi>>) {
        self.verification = verification;
    }

    pub fn set_max_forward_look(&mut self, k: usize) {
        self.max_forward_look = k;
    }

    pub fn set_top_patches(&mut self, n: usize) {
        self.top_patches = n;
    }

    pub fn set_recompute_isophotes_every_n_steps(&mut self, n: u32) {
        self.recompute_isophotes_every_n_steps = n;
    }

    pub fn image(&self) -> &MultiChannelField {
        &self.image
    }

    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    pub fn history(&self) -> &[IterationRecord] {
        &self.history
    }

    /// One step of the loop. Returns `Finished` without mutating state
    /// once the mask has no HOLE pixels left.
    pub fn step(&mut self) -> Result<StepOutcome, CoreError> {
        if self.state == EngineState::Finished || self.mask.hole_count() == 0 {
            self.state = EngineState::Finished;
            log::info!("inpainting finished at iteration {}", self.iteration);
            return Ok(StepOutcome::Finished);
        }

        let (boundary_pix, priority) = match &self.priority_override {
            Some(ov) => ov.evaluate(&self.mask),
            None => {
                let boundary = extract_boundary(&self.mask);
                let boundary_pix = crate::boundary::boundary_pixels(&boundary);
                let normals = compute_normals(&self.mask, &boundary);

                let confidence_term = self.priority_engine.confidence_term(
                    &self.confidence,
                    &self.mask,
                    &boundary_pix,
                    self.patch_radius,
                );
                let data_term = self.priority_engine.data_term(&self.isophotes, &normals, &boundary_pix);
                let priority = self.priority_engine.priority(&confidence_term, &data_term, &boundary_pix);
                (boundary_pix, priority)
            }
        };

        let targets =
            self.priority_engine.top_k_targets(&priority, &boundary_pix, self.max_forward_look, self.patch_radius);

        let mut candidate_patches = Vec::with_capacity(targets.len());
        for &t in &targets {
            if !NEIGHBOR_OFFSETS_8.iter().any(|&o| self.mask.is_hole(t + o)) {
                log::error!("priority desync: {:?} has no HOLE 8-neighbour", t);
                return Err(CoreError::PriorityDesync { pixel: t });
            }
            let target_region = Region::in_radius(t, self.patch_radius);
            let ranked = rank_sources(
                &self.blurred_image,
                &self.mask,
                target_region,
                &self.source_index,
                self.difference.as_ref(),
                self.top_patches,
            );
            candidate_patches.push(CandidatePatches { target: t, candidates: ranked });
        }

        let Some(primary) = candidate_patches.first() else {
            return Err(CoreError::InternalInvariant {
                detail: "non-empty boundary produced no top-K targets".to_string(),
            });
        };
        let primary_target = primary.target;
        let target_region = Region::in_radius(primary_target, self.patch_radius);

        let accepted = primary
            .candidates
            .iter()
            .find(|c| self.acceptance.accept(&self.blurred_image, &self.mask, target_region, c.source))
            .map(|c| (c.source, c.score));

        let (source_region, score) = match accepted {
            Some(pair) => pair,
            None => {
                log::warn!("acceptance visitor rejected every candidate for target {:?}", primary_target);
                match self.verification.as_mut() {
                    None => {
                        log::error!(
                            "all candidates rejected for target {:?} and no verification UI is configured",
                            primary_target
                        );
                        return Err(CoreError::AllCandidatesRejected { target: primary_target });
                    }
                    Some(ui) => {
                        let proposed = primary
                            .candidates
                            .first()
                            .map(|c| c.source)
                            .unwrap_or(target_region);
                        match ui.verify(target_region, proposed, &self.image, &self.mask) {
                            Decision::Accept => {
                                let score = primary.candidates.first().map(|c| c.score).unwrap_or(0.0);
                                (proposed, score)
                            }
                            Decision::ReplaceWith(replacement) => (replacement, 0.0),
                            Decision::Quit => {
                                log::error!("verification UI returned Quit at iteration {}", self.iteration);
                                return Err(CoreError::UserQuit { iteration: self.iteration });
                            }
                        }
                    }
                }
            }
        };

        let continuation = continuation_score(&self.blurred_image, &self.isophotes, &self.mask, target_region, source_region);

        let centre_conf = *self.confidence.at(primary_target);

        let hole_offsets = self.mask.hole_offsets_in(target_region);
        self.image.copy_offsets(source_region.origin, target_region.origin, &hole_offsets);
        self.blurred_image.copy_offsets(source_region.origin, target_region.origin, &hole_offsets);
        self.isophotes.copy_offsets(source_region.origin, target_region.origin, &hole_offsets);

        for &off in &hole_offsets {
            let idx = target_region.origin + off;
            self.mask.set_valid(idx);
            self.confidence.set(idx, centre_conf);
        }

        self.source_index.scan(&self.mask, target_region.grow_by(self.patch_radius));

        self.iteration += 1;
        if self.recompute_isophotes_every_n_steps > 0 && self.iteration % self.recompute_isophotes_every_n_steps == 0 {
            self.isophotes = isophote::compute_isophotes(&self.blurred_image, &self.mask);
        }
        self.state = EngineState::Idle(self.iteration);

        let pair = PatchPair { source: source_region, target: target_region, score, continuation };
        log::debug!(
            "step {}: {} targets, chose source {:?} -> target {:?} (score={:.4})",
            self.iteration,
            targets.len(),
            source_region.origin,
            target_region.origin,
            score
        );
        self.history.push(IterationRecord { iteration: self.iteration, candidate_patches, chosen: pair });

        Ok(StepOutcome::Filled(pair))
    }

    /// Repeatedly `step()` until `Finished` or an error.
    pub fn run_to_completion(&mut self) -> Result<(), CoreError> {
        loop {
            match self.step()? {
                StepOutcome::Finished => return Ok(()),
                StepOutcome::Filled(_) => continue,
            }
        }
    }
}
