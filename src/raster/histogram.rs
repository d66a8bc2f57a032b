use ndarray::Array2;

use crate::error::RegistrationError;
use crate::raster::Raster;

/// Intensity histogram of a single raster.
pub struct Histogram {
    counts: Vec<u64>,
    total: u64,
}

impl Histogram {
    pub fn of(raster: &Raster) -> Self {
        let mut counts = vec![0u64; usize::from(raster.max_intensity()) + 1];
        for value in raster.pixels() {
            counts[usize::from(value)] += 1;
        }
        Self {
            counts,
            total: raster.len() as u64,
        }
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn probabilities(&self) -> Vec<f64> {
        let total = self.total.max(1) as f64;
        self.counts.iter().map(|&c| c as f64 / total).collect()
    }

    /// Shannon entropy in bits, with `0 * log 0` taken as 0.
    pub fn entropy(&self) -> f64 {
        -self
            .probabilities()
            .iter()
            .filter(|&&p| p > 0.0)
            .map(|&p| p * p.log2())
            .sum::<f64>()
    }
}

/// Joint intensity histogram of two same-size rasters.
pub struct JointHistogram {
    counts: Array2<u64>,
    total: u64,
}

impl JointHistogram {
    pub fn of(first: &Raster, second: &Raster) -> Result<Self, RegistrationError> {
        first.ensure_same_size(second)?;
        if first.max_intensity() != second.max_intensity() {
            return Err(RegistrationError::invalid(
                "rasters for a joint histogram must share the same max intensity",
            ));
        }

        let bins = usize::from(first.max_intensity()) + 1;
        let mut counts = Array2::zeros((bins, bins));
        for (a, b) in first.pixels().zip(second.pixels()) {
            counts[[usize::from(a), usize::from(b)]] += 1;
        }
        Ok(Self {
            counts,
            total: first.len() as u64,
        })
    }

    /// Joint Shannon entropy in bits.
    pub fn entropy(&self) -> f64 {
        let total = self.total.max(1) as f64;
        -self
            .counts
            .iter()
            .filter(|&&c| c > 0)
            .map(|&c| {
                let p = c as f64 / total;
                p * p.log2()
            })
            .sum::<f64>()
    }
}
