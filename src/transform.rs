use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RegistrationError;
use crate::interpolation::{self, InterpolationMode};
use crate::raster::Raster;

const SCALE_MIN: f64 = 0.01;
const SCALE_MAX: f64 = 10.0;
const FULL_ROTATION_DEGREES: f64 = 360.0;

/// One step of a rigid transform, applied via backward mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TransformOp {
    Translate { dx: f64, dy: f64 },
    Rotate { radians: f64 },
    Scale { factor: f64 },
}

impl fmt::Display for TransformOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformOp::Translate { dx, dy } => write!(f, "Translate [{:.1}, {:.1}]", dx, dy),
            TransformOp::Rotate { radians } => {
                write!(f, "Rotate {:.3}deg", radians.to_degrees())
            }
            TransformOp::Scale { factor } => write!(f, "Scale {:.3}", factor),
        }
    }
}

/// An ordered, replayable sequence of transform ops.
///
/// The op list is immutable once built; `apply` derives a fresh iterator per
/// call, so the same pipeline can be replayed against any number of source
/// rasters. Zero-valued translate/rotate requests append no op, which makes
/// the identity candidate an empty pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformPipeline {
    ops: Vec<TransformOp>,
}

impl TransformPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn translate(mut self, dx: f64, dy: f64) -> Self {
        if dx != 0.0 || dy != 0.0 {
            self.ops.push(TransformOp::Translate { dx, dy });
        }
        self
    }

    pub fn rotate(mut self, degrees: f64) -> Self {
        if degrees != 0.0 {
            let mut degrees = degrees;
            while degrees > FULL_ROTATION_DEGREES {
                degrees -= FULL_ROTATION_DEGREES;
            }
            while degrees < -FULL_ROTATION_DEGREES {
                degrees += FULL_ROTATION_DEGREES;
            }
            self.ops.push(TransformOp::Rotate {
                radians: degrees.to_radians(),
            });
        }
        self
    }

    pub fn scale(mut self, factor: f64) -> Self {
        if factor != 0.0 {
            self.ops.push(TransformOp::Scale { factor });
        }
        self
    }

    pub fn ops(&self) -> &[TransformOp] {
        &self.ops
    }

    pub fn is_identity(&self) -> bool {
        self.ops.is_empty()
    }

    /// Apply all ops in order, each producing a fresh raster.
    pub fn apply(
        &self,
        source: &Raster,
        mode: InterpolationMode,
    ) -> Result<Raster, RegistrationError> {
        let mut current = source.clone();
        for op in &self.ops {
            current = match *op {
                TransformOp::Translate { dx, dy } => translate(&current, dx, dy, mode),
                TransformOp::Rotate { radians } => rotate(&current, radians, mode),
                TransformOp::Scale { factor } => scale(&current, factor, mode)?,
            };
        }
        Ok(current)
    }
}

impl fmt::Display for TransformPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ops.is_empty() {
            return write!(f, "No transformations");
        }
        for (i, op) in self.ops.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", op)?;
        }
        Ok(())
    }
}

fn translate(source: &Raster, dx: f64, dy: f64, mode: InterpolationMode) -> Raster {
    let mut result =
        Raster::with_max_intensity(source.width(), source.height(), source.max_intensity());
    for y in 0..source.height() {
        for x in 0..source.width() {
            // Backward mapping: sample the source at the inverse offset.
            let value = interpolation::sample(source, x as f64 - dx, y as f64 - dy, mode);
            result.set(x, y, value);
        }
    }
    result
}

fn rotate(source: &Raster, radians: f64, mode: InterpolationMode) -> Raster {
    let cos_theta = radians.cos();
    let sin_theta = radians.sin();
    let width_half = source.width() as f64 / 2.0;
    let height_half = source.height() as f64 / 2.0;

    let mut result =
        Raster::with_max_intensity(source.width(), source.height(), source.max_intensity());
    for y in 0..source.height() {
        for x in 0..source.width() {
            let cx = x as f64 - width_half;
            let cy = y as f64 - height_half;

            // Inverse rotation around the image center.
            let pos_x = cx * cos_theta + cy * sin_theta + width_half;
            let pos_y = -cx * sin_theta + cy * cos_theta + height_half;

            result.set(x, y, interpolation::sample(source, pos_x, pos_y, mode));
        }
    }
    result
}

fn scale(
    source: &Raster,
    factor: f64,
    mode: InterpolationMode,
) -> Result<Raster, RegistrationError> {
    if !(SCALE_MIN..=SCALE_MAX).contains(&factor) {
        return Err(RegistrationError::invalid(format!(
            "{} is not a valid scale factor, must be in [{}, {}]",
            factor, SCALE_MIN, SCALE_MAX
        )));
    }
    if source.width() < 2 || source.height() < 2 {
        return Err(RegistrationError::invalid(
            "scaling requires a raster of at least 2x2 pixels",
        ));
    }

    let new_width = (source.width() as f64 * factor + 0.5).floor() as usize;
    let new_height = (source.height() as f64 * factor + 0.5).floor() as usize;

    // Corner-anchored ratios: the top-left and bottom-right pixel centers of
    // the output map exactly onto the source corners.
    let scale_x = (new_width as f64 - 1.0) / (source.width() as f64 - 1.0);
    let scale_y = (new_height as f64 - 1.0) / (source.height() as f64 - 1.0);

    log::debug!(
        "scale factor={} -> {}x{} (sx={:.4}, sy={:.4})",
        factor,
        new_width,
        new_height,
        scale_x,
        scale_y
    );

    let mut result = Raster::with_max_intensity(new_width, new_height, source.max_intensity());
    for y in 0..new_height {
        for x in 0..new_width {
            let value =
                interpolation::sample(source, x as f64 / scale_x, y as f64 / scale_y, mode);
            result.set(x, y, value);
        }
    }
    Ok(result)
}
