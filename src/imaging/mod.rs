//! Bitmap primitives shared by preprocessing and layout analysis.
//!
//! Decoding, grayscale conversion, contours and filtering come from `image`
//! and `imageproc`. Rectangular dilation, the minimum-area rectangle angle and
//! border-replicating rotation are built here on top of them.

pub mod morphology;
pub mod rotation;
pub mod threshold;

use std::path::Path;

use image::{DynamicImage, GrayImage, ImageReader};

use crate::core::ImageLoadError;

pub use morphology::{dilate_rect, external_bounding_rects};
pub use rotation::{min_area_rect_angle, rotate_about_center};
pub use threshold::{adaptive_gaussian_threshold, otsu_binarize_inv};

/// Decodes an image from disk.
pub fn load_image(path: &Path) -> Result<DynamicImage, ImageLoadError> {
    if !path.is_file() {
        return Err(ImageLoadError::NotFound(path.to_path_buf()));
    }
    let decode = |source| ImageLoadError::Decode {
        path: path.to_path_buf(),
        source,
    };
    ImageReader::open(path)
        .map_err(|err| decode(image::ImageError::IoError(err)))?
        .with_guessed_format()
        .map_err(|err| decode(image::ImageError::IoError(err)))?
        .decode()
        .map_err(decode)
}

/// Decodes an image from disk as 8-bit grayscale.
pub fn load_grayscale(path: &Path) -> Result<GrayImage, ImageLoadError> {
    load_image(path).map(|img| img.to_luma8())
}

pub fn save_grayscale(image: &GrayImage, path: &Path) -> Result<(), ImageLoadError> {
    image.save(path).map_err(|source| ImageLoadError::Encode {
        path: path.to_path_buf(),
        source,
    })
}

/// Number of pixels with a non-zero value.
pub fn foreground_count(image: &GrayImage) -> usize {
    image.pixels().filter(|p| p[0] > 0).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn missing_file_is_not_found() {
        let err = load_grayscale(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, ImageLoadError::NotFound(_)));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not an image at all").unwrap();
        let err = load_grayscale(&path).unwrap_err();
        assert!(matches!(err, ImageLoadError::Decode { .. }));
    }

    #[test]
    fn grayscale_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.png");
        let mut img = GrayImage::from_pixel(8, 4, Luma([255]));
        img.put_pixel(3, 2, Luma([0]));
        save_grayscale(&img, &path).unwrap();

        let loaded = load_grayscale(&path).unwrap();
        assert_eq!(loaded.dimensions(), (8, 4));
        assert_eq!(loaded.get_pixel(3, 2)[0], 0);
    }
}
