pub mod config;
pub mod distance;
pub mod error;
pub mod filter;
pub mod interpolation;
pub mod metric;
pub mod raster;
pub mod registration;
pub mod transform;

pub use distance::{DistanceField, DistanceKernel};
pub use error::RegistrationError;
pub use interpolation::InterpolationMode;
pub use metric::{Metric, MetricKind};
pub use raster::Raster;
pub use registration::{
    RegistrationOutcome, RegistrationParams, RegistrationResult, Registrator, SearchStrategy,
};
pub use transform::{TransformOp, TransformPipeline};

pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    // No unit tests in lib.rs - all tests are in tests/ directory
}
