use crate::distance::{DistanceField, DistanceKernel};
use crate::error::RegistrationError;
use crate::filter;
use crate::metric::Metric;
use crate::raster::Raster;

/// Chamfer matching: sums the candidate's distance field at the reference's
/// edge coordinates. Lower is better.
///
/// The asymmetry is deliberate: `init` runs Sobel edge extraction over the
/// reference and binarizes the response once, so only gradient pixels are
/// recorded; the candidate's distance field is recomputed for every score
/// call, which dominates this metric's cost.
#[derive(Default)]
pub struct ChamferMatchingMetric {
    edge_coords: Vec<(usize, usize)>,
    reference_size: (usize, usize),
}

impl Metric for ChamferMatchingMetric {
    fn init(&mut self, reference: &Raster, _moving: &Raster) -> Result<(), RegistrationError> {
        let edges = filter::sobel_edges(reference).binarize(1);
        self.reference_size = (reference.width(), reference.height());
        self.edge_coords.clear();
        for y in 0..edges.height() {
            for x in 0..edges.width() {
                if edges.get(x, y) == edges.max_intensity() {
                    self.edge_coords.push((x, y));
                }
            }
        }
        Ok(())
    }

    fn score(&self, reference: &Raster, candidate: &Raster) -> Result<f64, RegistrationError> {
        reference.ensure_same_size(candidate)?;
        // The recorded coordinates index into the candidate's field, so the
        // pair must also match the raster this metric was initialized with.
        if (candidate.width(), candidate.height()) != self.reference_size {
            return Err(RegistrationError::DimensionMismatch {
                left_width: self.reference_size.0,
                left_height: self.reference_size.1,
                right_width: candidate.width(),
                right_height: candidate.height(),
            });
        }

        let field = DistanceField::compute(candidate, &DistanceKernel::euclidean());
        Ok(self
            .edge_coords
            .iter()
            .map(|&(x, y)| field.get(x, y))
            .sum())
    }

    fn name(&self) -> &'static str {
        "ChamferMatching"
    }
}
