use crate::error::RegistrationError;
use crate::metric::Metric;
use crate::raster::Raster;

/// Sum of squared per-pixel differences. Lower is better; 0 means identical.
pub struct SquaredErrorMetric;

impl Metric for SquaredErrorMetric {
    fn score(&self, reference: &Raster, candidate: &Raster) -> Result<f64, RegistrationError> {
        reference.ensure_same_size(candidate)?;

        let mut sum = 0.0;
        for (a, b) in reference.pixels().zip(candidate.pixels()) {
            let diff = f64::from(a) - f64::from(b);
            sum += diff * diff;
        }
        Ok(sum)
    }

    fn name(&self) -> &'static str {
        "SSE"
    }
}
