use image::{GrayImage, Luma};

use crate::raster::Raster;

/// Ingest an 8-bit grayscale image as a raster with max intensity 255.
pub fn from_gray_image(image: &GrayImage) -> Raster {
    Raster::from_fn(image.width() as usize, image.height() as usize, |x, y| {
        u16::from(image.get_pixel(x as u32, y as u32)[0])
    })
}

/// Emit a raster as an 8-bit grayscale image. Intensities are rescaled only
/// when the raster's range exceeds 8 bits.
pub fn to_gray_image(raster: &Raster) -> GrayImage {
    let max = raster.max_intensity().max(1);
    GrayImage::from_fn(raster.width() as u32, raster.height() as u32, |x, y| {
        let value = raster.get(x as usize, y as usize);
        let scaled = if max > 255 {
            (u32::from(value) * 255 / u32::from(max)) as u8
        } else {
            value as u8
        };
        Luma([scaled])
    })
}
