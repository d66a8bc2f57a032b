use serde::{Deserialize, Serialize};

use crate::error::RegistrationError;
use crate::raster::Raster;

pub mod chamfer;
pub mod mutual_information;
pub mod sse;

pub use chamfer::ChamferMatchingMetric;
pub use mutual_information::MutualInformationMetric;
pub use sse::SquaredErrorMetric;

/// A similarity scorer comparing two same-size rasters.
///
/// Implementations must be side-effect-free after `init`: `score` is called
/// from multiple worker threads against shared metric state.
pub trait Metric: Send + Sync {
    /// Optional precomputation before any scoring.
    fn init(&mut self, _reference: &Raster, _moving: &Raster) -> Result<(), RegistrationError> {
        Ok(())
    }

    /// Score `candidate` against `reference`.
    fn score(&self, reference: &Raster, candidate: &Raster) -> Result<f64, RegistrationError>;

    /// Whether `score` beats `best` under this metric's ordering convention.
    /// Defaults to lower-is-better.
    fn better_than(&self, score: f64, best: f64) -> bool {
        score < best
    }

    fn name(&self) -> &'static str;
}

/// Selectable metric implementations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum MetricKind {
    /// Sum of squared per-pixel differences.
    #[default]
    Sse,
    /// Mutual information from intensity histograms.
    MutualInformation,
    /// Chamfer matching over a distance field.
    ChamferMatching,
}

impl MetricKind {
    /// Construct and initialize the chosen metric for an image pair.
    pub fn create(
        self,
        reference: &Raster,
        moving: &Raster,
    ) -> Result<Box<dyn Metric>, RegistrationError> {
        let mut metric: Box<dyn Metric> = match self {
            MetricKind::Sse => Box::new(SquaredErrorMetric),
            MetricKind::MutualInformation => Box::<MutualInformationMetric>::default(),
            MetricKind::ChamferMatching => Box::<ChamferMatchingMetric>::default(),
        };
        metric.init(reference, moving)?;
        Ok(metric)
    }
}
