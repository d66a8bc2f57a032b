use ndarray::Array2;

use crate::raster::Raster;

const SOBEL_VERTICAL: [[f64; 3]; 3] = [[1.0, 0.0, -1.0], [2.0, 0.0, -2.0], [1.0, 0.0, -1.0]];
const SOBEL_HORIZONTAL: [[f64; 3]; 3] = [[1.0, 2.0, 1.0], [0.0, 0.0, 0.0], [-1.0, -2.0, -1.0]];

/// Sobel edge detection: sum of absolute horizontal and vertical gradient
/// responses, normalized into the raster's intensity range.
pub fn sobel_edges(source: &Raster) -> Raster {
    let width = source.width();
    let height = source.height();
    let vertical = convolve(source, &SOBEL_VERTICAL);
    let horizontal = convolve(source, &SOBEL_HORIZONTAL);

    let mut gradient = Array2::zeros((height, width));
    let mut max_gradient = 1.0f64;
    for y in 0..height {
        for x in 0..width {
            let magnitude = vertical[[y, x]].abs() + horizontal[[y, x]].abs();
            gradient[[y, x]] = magnitude;
            if magnitude > max_gradient {
                max_gradient = magnitude;
            }
        }
    }

    let correction = max_gradient / f64::from(source.max_intensity());
    let mut result = Raster::with_max_intensity(width, height, source.max_intensity());
    for y in 0..height {
        for x in 0..width {
            result.set(x, y, (gradient[[y, x]] / correction + 0.5) as u16);
        }
    }
    result
}

/// Unnormalized 3x3 convolution; neighbors outside the raster are skipped.
fn convolve(source: &Raster, kernel: &[[f64; 3]; 3]) -> Array2<f64> {
    let width = source.width() as i64;
    let height = source.height() as i64;
    let mut result = Array2::zeros((source.height(), source.width()));

    for y in 0..height {
        for x in 0..width {
            let mut sum = 0.0;
            for dy in -1i64..=1 {
                for dx in -1i64..=1 {
                    let nx = x + dx;
                    let ny = y + dy;
                    if nx >= 0 && nx < width && ny >= 0 && ny < height {
                        let value = f64::from(source.get(nx as usize, ny as usize));
                        sum += value * kernel[(dy + 1) as usize][(dx + 1) as usize];
                    }
                }
            }
            result[[y as usize, x as usize]] = sum;
        }
    }
    result
}
