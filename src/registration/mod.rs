use instant::Instant;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::RegistrationError;
use crate::interpolation::InterpolationMode;
use crate::metric::Metric;
use crate::raster::Raster;
use crate::transform::TransformPipeline;

/// How candidate evaluations are scheduled on the worker pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SearchStrategy {
    /// Join after each grid point's two orderings. Matches the reference
    /// evaluation order exactly but bounds the parallel speed-up to two
    /// workers at a time.
    PerPoint,
    /// Evaluate an entire run's candidate set across the pool before
    /// comparing results.
    BatchedRun,
}

/// The two op orders evaluated for every parameter triple; translation and
/// rotation do not commute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OpOrdering {
    TranslateThenRotate,
    RotateThenTranslate,
}

impl OpOrdering {
    pub fn pipeline(self, tx: f64, ty: f64, rotation: f64) -> TransformPipeline {
        match self {
            OpOrdering::TranslateThenRotate => {
                TransformPipeline::new().translate(tx, ty).rotate(rotation)
            }
            OpOrdering::RotateThenTranslate => {
                TransformPipeline::new().rotate(rotation).translate(tx, ty)
            }
        }
    }
}

/// Search parameters for the coarse-to-fine grid search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationParams {
    /// Initial translation step in pixels.
    pub step_translation: f64,
    /// Initial rotation step in degrees.
    pub step_rotation: f64,
    /// Grid half-width in steps, shared by all three axes.
    pub search_radius: i64,
    /// Number of shrink-and-recenter runs.
    pub runs: u32,
    /// Step shrink factor applied after each run, in (0, 1).
    pub scale_per_run: f64,
    pub strategy: SearchStrategy,
}

impl Default for RegistrationParams {
    fn default() -> Self {
        Self {
            step_translation: 2.0,
            step_rotation: 2.0,
            search_radius: 10,
            runs: 5,
            scale_per_run: 0.9,
            strategy: SearchStrategy::PerPoint,
        }
    }
}

impl RegistrationParams {
    pub fn validate(&self) -> Result<(), RegistrationError> {
        if self.step_translation <= 0.0 {
            return Err(RegistrationError::invalid(
                "step_translation must be positive",
            ));
        }
        if self.step_rotation <= 0.0 {
            return Err(RegistrationError::invalid("step_rotation must be positive"));
        }
        if self.search_radius <= 0 {
            return Err(RegistrationError::invalid("search_radius must be positive"));
        }
        if self.runs == 0 {
            return Err(RegistrationError::invalid("runs must be positive"));
        }
        if self.scale_per_run <= 0.0 || self.scale_per_run >= 1.0 {
            return Err(RegistrationError::invalid(
                "scale_per_run must lie strictly between 0 and 1",
            ));
        }
        Ok(())
    }
}

/// The best transform found by a search.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationResult {
    pub translation: (f64, f64),
    pub rotation_degrees: f64,
    pub score: f64,
    pub initial_score: f64,
    pub ordering: OpOrdering,
    pub metric: String,
    pub processing_time_ms: f64,
    /// Replayable pipeline producing the aligned raster from the moving one.
    pub pipeline: TransformPipeline,
}

/// Terminal outcome of a search. `NoImprovement` is a valid result, not an
/// error: the initial alignment was already locally optimal under the given
/// metric and search parameters.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum RegistrationOutcome {
    Improved(RegistrationResult),
    NoImprovement { initial_score: f64 },
}

impl RegistrationOutcome {
    pub fn improved(&self) -> Option<&RegistrationResult> {
        match self {
            RegistrationOutcome::Improved(result) => Some(result),
            RegistrationOutcome::NoImprovement { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
struct Evaluation {
    tx: f64,
    ty: f64,
    rotation: f64,
    ordering: OpOrdering,
    score: f64,
}

#[derive(Debug, Clone, Copy)]
struct CandidateParams {
    tx: f64,
    ty: f64,
    rotation: f64,
    ordering: OpOrdering,
}

/// Coarse-to-fine rigid registration driver.
///
/// Owns its worker pool; search state is written only by the controlling
/// thread after each join, so workers share nothing mutable.
pub struct Registrator {
    params: RegistrationParams,
    pool: rayon::ThreadPool,
}

impl Registrator {
    /// Fails fast on a malformed configuration, before any search runs.
    pub fn new(params: RegistrationParams) -> Result<Self, RegistrationError> {
        params.validate()?;
        let threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| RegistrationError::invalid(format!("worker pool: {e}")))?;
        Ok(Self { params, pool })
    }

    pub fn params(&self) -> &RegistrationParams {
        &self.params
    }

    /// Search for the transform aligning `moving` back onto `reference`.
    ///
    /// Candidates are resampled with nearest-neighbour interpolation; a
    /// caller wanting a high-quality aligned raster should replay the
    /// returned pipeline with bilinear interpolation.
    pub fn register(
        &self,
        reference: &Raster,
        moving: &Raster,
        metric: &dyn Metric,
    ) -> Result<RegistrationOutcome, RegistrationError> {
        reference.ensure_same_size(moving)?;

        let start = Instant::now();
        let initial_score = metric.score(reference, moving)?;
        log::info!(
            "starting registration: metric={} initial_score={:.4}",
            metric.name(),
            initial_score
        );

        let mut best: Option<Evaluation> = None;
        let mut best_score = initial_score;
        let (mut mid_tx, mut mid_ty, mut mid_rot) = (0.0, 0.0, 0.0);
        let mut step_translation = self.params.step_translation;
        let mut step_rotation = self.params.step_rotation;

        for run in 0..self.params.runs {
            let evaluations = self.evaluate_run(
                reference,
                moving,
                metric,
                (mid_tx, mid_ty, mid_rot),
                step_translation,
                step_rotation,
            )?;

            for evaluation in evaluations {
                if metric.better_than(evaluation.score, best_score) {
                    best_score = evaluation.score;
                    best = Some(evaluation);
                }
            }

            let Some(current_best) = best.as_ref() else {
                // If the first full grid finds nothing better, the shrunken
                // grids of later runs cannot either.
                log::info!("run {}: no candidate beat the initial score", run);
                return Ok(RegistrationOutcome::NoImprovement { initial_score });
            };

            log::info!(
                "run {}: best score={:.4} tx={:.3} ty={:.3} rot={:.3} ({:?})",
                run,
                best_score,
                current_best.tx,
                current_best.ty,
                current_best.rotation,
                current_best.ordering
            );

            mid_tx = current_best.tx;
            mid_ty = current_best.ty;
            mid_rot = current_best.rotation;
            step_translation *= self.params.scale_per_run;
            step_rotation *= self.params.scale_per_run;
        }

        let best = best.expect("loop returns early when no improvement was found");
        let pipeline = best.ordering.pipeline(best.tx, best.ty, best.rotation);
        Ok(RegistrationOutcome::Improved(RegistrationResult {
            translation: (best.tx, best.ty),
            rotation_degrees: best.rotation,
            score: best.score,
            initial_score,
            ordering: best.ordering,
            metric: metric.name().to_string(),
            processing_time_ms: start.elapsed().as_secs_f64() * 1000.0,
            pipeline,
        }))
    }

    /// Evaluate one run's full `(2r)^3` grid, two orderings per point.
    /// Returns evaluations in grid order regardless of strategy, so the
    /// sequential comparison is deterministic.
    fn evaluate_run(
        &self,
        reference: &Raster,
        moving: &Raster,
        metric: &dyn Metric,
        (mid_tx, mid_ty, mid_rot): (f64, f64, f64),
        step_translation: f64,
        step_rotation: f64,
    ) -> Result<Vec<Evaluation>, RegistrationError> {
        let radius = self.params.search_radius;
        let mut grid = Vec::with_capacity((2 * radius as usize).pow(3));
        for x_idx in -radius..radius {
            for y_idx in -radius..radius {
                for rot_idx in -radius..radius {
                    grid.push((
                        mid_tx + x_idx as f64 * step_translation,
                        mid_ty + y_idx as f64 * step_translation,
                        mid_rot + rot_idx as f64 * step_rotation,
                    ));
                }
            }
        }

        match self.params.strategy {
            SearchStrategy::PerPoint => {
                let mut evaluations = Vec::with_capacity(grid.len() * 2);
                for (tx, ty, rotation) in grid {
                    // Hard barrier: both orderings finish before the next
                    // grid point is considered.
                    let (first, second) = self.pool.join(
                        || {
                            evaluate(
                                reference,
                                moving,
                                metric,
                                CandidateParams {
                                    tx,
                                    ty,
                                    rotation,
                                    ordering: OpOrdering::TranslateThenRotate,
                                },
                            )
                        },
                        || {
                            evaluate(
                                reference,
                                moving,
                                metric,
                                CandidateParams {
                                    tx,
                                    ty,
                                    rotation,
                                    ordering: OpOrdering::RotateThenTranslate,
                                },
                            )
                        },
                    );
                    evaluations.push(first?);
                    evaluations.push(second?);
                }
                Ok(evaluations)
            }
            SearchStrategy::BatchedRun => {
                let candidates: Vec<CandidateParams> = grid
                    .into_iter()
                    .flat_map(|(tx, ty, rotation)| {
                        [
                            CandidateParams {
                                tx,
                                ty,
                                rotation,
                                ordering: OpOrdering::TranslateThenRotate,
                            },
                            CandidateParams {
                                tx,
                                ty,
                                rotation,
                                ordering: OpOrdering::RotateThenTranslate,
                            },
                        ]
                    })
                    .collect();

                self.pool.install(|| {
                    candidates
                        .par_iter()
                        .map(|&params| evaluate(reference, moving, metric, params))
                        .collect::<Result<Vec<_>, _>>()
                })
            }
        }
    }
}

fn evaluate(
    reference: &Raster,
    moving: &Raster,
    metric: &dyn Metric,
    params: CandidateParams,
) -> Result<Evaluation, RegistrationError> {
    let pipeline = params.ordering.pipeline(params.tx, params.ty, params.rotation);
    let candidate = pipeline.apply(moving, InterpolationMode::NearestNeighbour)?;
    let score = metric.score(reference, &candidate)?;
    Ok(Evaluation {
        tx: params.tx,
        ty: params.ty,
        rotation: params.rotation,
        ordering: params.ordering,
        score,
    })
}
