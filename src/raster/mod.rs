use ndarray::Array2;

use crate::error::RegistrationError;

pub mod convert;
pub mod histogram;

pub use histogram::{Histogram, JointHistogram};

/// A 2-D grayscale raster with value semantics.
///
/// Pixel values are integers in `[0, max_intensity]`. Every operation that
/// changes pixel data produces a new `Raster`; inputs are never mutated in
/// place, so snapshots handed to worker threads stay stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    data: Array2<u16>,
    max_intensity: u16,
}

impl Raster {
    pub const DEFAULT_MAX_INTENSITY: u16 = 255;

    /// Create a raster of the given size filled with the background value 0.
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_max_intensity(width, height, Self::DEFAULT_MAX_INTENSITY)
    }

    pub fn with_max_intensity(width: usize, height: usize, max_intensity: u16) -> Self {
        Self {
            data: Array2::zeros((height, width)),
            max_intensity,
        }
    }

    /// Build a raster by evaluating `f(x, y)` for every pixel. Values above
    /// `max_intensity` are clamped to keep the intensity invariant.
    pub fn from_fn<F>(width: usize, height: usize, f: F) -> Self
    where
        F: Fn(usize, usize) -> u16,
    {
        let max_intensity = Self::DEFAULT_MAX_INTENSITY;
        Self {
            data: Array2::from_shape_fn((height, width), |(y, x)| f(x, y).min(max_intensity)),
            max_intensity,
        }
    }

    /// Build a raster from row-major rows of equal length.
    pub fn from_rows(rows: &[Vec<u16>]) -> Result<Self, RegistrationError> {
        let height = rows.len();
        let width = rows.first().map(Vec::len).unwrap_or(0);
        if rows.iter().any(|row| row.len() != width) {
            return Err(RegistrationError::invalid(
                "raster rows must all have the same length",
            ));
        }

        let mut raster = Self::new(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, &value) in row.iter().enumerate() {
                raster.set(x, y, value);
            }
        }
        Ok(raster)
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn len(&self) -> usize {
        self.width() * self.height()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn max_intensity(&self) -> u16 {
        self.max_intensity
    }

    pub fn get(&self, x: usize, y: usize) -> u16 {
        self.data[[y, x]]
    }

    pub fn set(&mut self, x: usize, y: usize, value: u16) {
        self.data[[y, x]] = value.min(self.max_intensity);
    }

    pub fn pixels(&self) -> impl Iterator<Item = u16> + '_ {
        self.data.iter().copied()
    }

    /// Fail unless `other` has identical dimensions.
    pub fn ensure_same_size(&self, other: &Raster) -> Result<(), RegistrationError> {
        if self.width() != other.width() || self.height() != other.height() {
            return Err(RegistrationError::DimensionMismatch {
                left_width: self.width(),
                left_height: self.height(),
                right_width: other.width(),
                right_height: other.height(),
            });
        }
        Ok(())
    }

    /// Extract a bounds-checked sub-raster.
    pub fn crop(
        &self,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> Result<Raster, RegistrationError> {
        if width == 0 || height == 0 {
            return Err(RegistrationError::invalid("crop size must be non-zero"));
        }
        if x + width > self.width() || y + height > self.height() {
            return Err(RegistrationError::invalid(format!(
                "crop {}x{}+{}+{} exceeds raster {}x{}",
                width,
                height,
                x,
                y,
                self.width(),
                self.height()
            )));
        }

        let mut result = Self::with_max_intensity(width, height, self.max_intensity);
        for oy in 0..height {
            for ox in 0..width {
                result.set(ox, oy, self.get(x + ox, y + oy));
            }
        }
        Ok(result)
    }

    /// Map every pixel at or above `threshold` to `max_intensity` and the
    /// rest to 0.
    pub fn binarize(&self, threshold: u16) -> Raster {
        let mut result = Self::with_max_intensity(self.width(), self.height(), self.max_intensity);
        for y in 0..self.height() {
            for x in 0..self.width() {
                let value = if self.get(x, y) >= threshold {
                    self.max_intensity
                } else {
                    0
                };
                result.set(x, y, value);
            }
        }
        result
    }

    /// Interleave two same-size rasters in an n-by-n block pattern, for
    /// visually judging how well a registered image lines up.
    pub fn checkerboard(&self, other: &Raster, blocks: usize) -> Result<Raster, RegistrationError> {
        self.ensure_same_size(other)?;
        if blocks == 0 {
            return Err(RegistrationError::invalid(
                "checkerboard block count must be positive",
            ));
        }

        let block_width = (self.width() / blocks).max(1);
        let block_height = (self.height() / blocks).max(1);
        let mut result = Self::with_max_intensity(self.width(), self.height(), self.max_intensity);
        for y in 0..self.height() {
            for x in 0..self.width() {
                let source = if ((x / block_width) + (y / block_height)) % 2 == 0 {
                    self
                } else {
                    other
                };
                result.set(x, y, source.get(x, y));
            }
        }
        Ok(result)
    }
}
