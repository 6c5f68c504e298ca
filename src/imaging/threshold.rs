use image::{GrayImage, Luma};
use imageproc::contrast::otsu_level;
use imageproc::filter::gaussian_blur_f32;
use imageproc::map::{map_colors, map_colors2};

/// Gaussian-weighted adaptive threshold.
///
/// A pixel becomes white (255) when it is brighter than the gaussian mean of
/// its `block_size` neighbourhood minus `bias`, black otherwise. The kernel
/// sigma is derived from the block size so that the weighting matches the
/// conventional `ADAPTIVE_THRESH_GAUSSIAN_C` behaviour.
pub fn adaptive_gaussian_threshold(image: &GrayImage, block_size: u32, bias: f32) -> GrayImage {
    let mean = gaussian_blur_f32(image, block_sigma(block_size));
    map_colors2(image, &mean, |pixel: Luma<u8>, local: Luma<u8>| {
        if f32::from(pixel[0]) > f32::from(local[0]) - bias {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}

fn block_sigma(block_size: u32) -> f32 {
    let block = block_size.max(3) as f32;
    0.3 * ((block - 1.0) * 0.5 - 1.0) + 0.8
}

/// Global Otsu binarisation with inverted output: dark ink becomes 255.
pub fn otsu_binarize_inv(image: &GrayImage) -> GrayImage {
    let level = otsu_level(image);
    map_colors(image, |pixel: Luma<u8>| {
        if pixel[0] > level {
            Luma([0u8])
        } else {
            Luma([255u8])
        }
    })
}
