use crate::error::RegistrationError;
use crate::metric::Metric;
use crate::raster::{Histogram, JointHistogram, Raster};

/// Mutual information: `H(candidate) + H(reference) - H(reference, candidate)`.
///
/// The reference entropy is precomputed at `init`; only the candidate's
/// histogram and the joint histogram are rebuilt per score. Higher is better.
#[derive(Default)]
pub struct MutualInformationMetric {
    reference_entropy: f64,
}

impl Metric for MutualInformationMetric {
    fn init(&mut self, reference: &Raster, _moving: &Raster) -> Result<(), RegistrationError> {
        self.reference_entropy = Histogram::of(reference).entropy();
        Ok(())
    }

    fn score(&self, reference: &Raster, candidate: &Raster) -> Result<f64, RegistrationError> {
        let candidate_entropy = Histogram::of(candidate).entropy();
        let joint_entropy = JointHistogram::of(reference, candidate)?.entropy();
        Ok(candidate_entropy + self.reference_entropy - joint_entropy)
    }

    fn better_than(&self, score: f64, best: f64) -> bool {
        score > best
    }

    fn name(&self) -> &'static str {
        "MutualInformation"
    }
}
