use serde::{Deserialize, Serialize};

use crate::raster::Raster;

const BACKGROUND: u16 = 0;

/// Resampling mode used when reading a raster at fractional coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum InterpolationMode {
    /// Round to the nearest pixel, ties rounding up.
    NearestNeighbour,
    /// Blend the four surrounding pixels by their fractional distances.
    Bilinear,
}

/// Sample `raster` at `(x, y)`. Coordinates outside the raster never fail;
/// they contribute the background value 0.
pub fn sample(raster: &Raster, x: f64, y: f64, mode: InterpolationMode) -> u16 {
    match mode {
        InterpolationMode::NearestNeighbour => nearest_neighbour(raster, x, y),
        InterpolationMode::Bilinear => bilinear(raster, x, y),
    }
}

fn nearest_neighbour(raster: &Raster, x: f64, y: f64) -> u16 {
    pixel_or_background(raster, (x + 0.5).floor() as i64, (y + 0.5).floor() as i64)
}

fn bilinear(raster: &Raster, x: f64, y: f64) -> u16 {
    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = f64::from(pixel_or_background(raster, x0, y0));
    let p10 = f64::from(pixel_or_background(raster, x0 + 1, y0));
    let p01 = f64::from(pixel_or_background(raster, x0, y0 + 1));
    let p11 = f64::from(pixel_or_background(raster, x0 + 1, y0 + 1));

    let top = p00 + fx * (p10 - p00);
    let bottom = p01 + fx * (p11 - p01);
    let blended = top + fy * (bottom - top);

    // Clamp into the intensity range, then truncate.
    blended.clamp(0.0, f64::from(raster.max_intensity())) as u16
}

fn pixel_or_background(raster: &Raster, x: i64, y: i64) -> u16 {
    if x >= 0 && (x as usize) < raster.width() && y >= 0 && (y as usize) < raster.height() {
        raster.get(x as usize, y as usize)
    } else {
        BACKGROUND
    }
}
