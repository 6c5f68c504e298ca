use std::path::PathBuf;

use thiserror::Error;

/// A page bitmap could not be read or written.
#[derive(Debug, Error)]
pub enum ImageLoadError {
    #[error("image not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to decode image {}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to write image {}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Failures of the character-recognition engine.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR engine not found at {} (install tesseract-ocr or set TESSERACT_PATH)", .0.display())]
    EngineNotFound(PathBuf),

    #[error("OCR engine exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("failed to stage region image for OCR")]
    Encode(#[source] image::ImageError),

    #[error("OCR I/O error")]
    Io(#[from] std::io::Error),
}
