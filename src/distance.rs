use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::raster::Raster;

/// A 3x3 table of chamfer step costs, indexed by neighbor offset. The center
/// weight is 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceKernel {
    weights: [[f64; 3]; 3],
}

impl DistanceKernel {
    /// City-block approximation: direct steps cost 1, diagonal steps cost 2.
    pub const fn manhattan() -> Self {
        Self {
            weights: [[2.0, 1.0, 2.0], [1.0, 0.0, 1.0], [2.0, 1.0, 2.0]],
        }
    }

    /// Euclidean approximation. The diagonal weight is the literal 1.41, not
    /// a computed sqrt(2); rendered distance maps depend on the truncated
    /// constant.
    pub const fn euclidean() -> Self {
        Self {
            weights: [[1.41, 1.0, 1.41], [1.0, 0.0, 1.0], [1.41, 1.0, 1.41]],
        }
    }

    /// Cost of stepping to the neighbor at offset `(dx, dy)`, each in -1..=1.
    pub fn weight(&self, dx: i64, dy: i64) -> f64 {
        self.weights[(dy + 1) as usize][(dx + 1) as usize]
    }
}

/// Per-pixel geodesic distance to the nearest edge pixel, computed by the
/// two-pass chamfer algorithm. A raster with no edge pixels yields an
/// all-infinite field.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceField {
    data: Array2<f64>,
}

const FORWARD_NEIGHBOURS: [(i64, i64); 4] = [(0, -1), (-1, 0), (-1, -1), (1, -1)];
const BACKWARD_NEIGHBOURS: [(i64, i64); 4] = [(0, 1), (1, 0), (1, 1), (-1, 1)];

impl DistanceField {
    /// Run the two-pass chamfer transform over `edges`. Pixels at the
    /// raster's max intensity are edge pixels and seed distance 0; everything
    /// else starts at infinity.
    pub fn compute(edges: &Raster, kernel: &DistanceKernel) -> Self {
        let width = edges.width();
        let height = edges.height();
        let mut data = Array2::from_shape_fn((height, width), |(y, x)| {
            if edges.get(x, y) == edges.max_intensity() {
                0.0
            } else {
                f64::INFINITY
            }
        });

        // Forward pass: top-left to bottom-right, pulling from the
        // already-visited neighbors above and to the left.
        for y in 0..height {
            for x in 0..width {
                relax(&mut data, x, y, width, height, kernel, &FORWARD_NEIGHBOURS);
            }
        }

        // Backward pass: mirrored neighbor set, keeping the minimum of the
        // two scan directions.
        for y in (0..height).rev() {
            for x in (0..width).rev() {
                relax(&mut data, x, y, width, height, kernel, &BACKWARD_NEIGHBOURS);
            }
        }

        Self { data }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.data[[y, x]]
    }

    /// Render the field as a raster, rounding half-up and clamping to the
    /// target max intensity. Unreached (infinite) pixels clamp to max.
    pub fn to_raster(&self, max_intensity: u16) -> Raster {
        let mut result =
            Raster::with_max_intensity(self.width(), self.height(), max_intensity);
        for y in 0..self.height() {
            for x in 0..self.width() {
                let distance = self.get(x, y);
                let value = if distance >= f64::from(max_intensity) {
                    max_intensity
                } else {
                    (distance + 0.5) as u16
                };
                result.set(x, y, value);
            }
        }
        result
    }
}

fn relax(
    data: &mut Array2<f64>,
    x: usize,
    y: usize,
    width: usize,
    height: usize,
    kernel: &DistanceKernel,
    neighbours: &[(i64, i64); 4],
) {
    let mut min_distance = data[[y, x]];
    if min_distance == 0.0 {
        return;
    }

    for &(dx, dy) in neighbours {
        let nx = x as i64 + dx;
        let ny = y as i64 + dy;
        if nx < 0 || nx >= width as i64 || ny < 0 || ny >= height as i64 {
            continue;
        }
        let candidate = data[[ny as usize, nx as usize]] + kernel.weight(dx, dy);
        if candidate < min_distance {
            min_distance = candidate;
        }
    }

    data[[y, x]] = min_distance;
}
