pub mod dispatcher;
pub mod tesseract;

use image::GrayImage;

use crate::core::geometry::PixelRect;
use crate::core::OcrError;

pub use dispatcher::RegionOcrDispatcher;
pub use tesseract::{TesseractConfig, TesseractEngine};

/// Page segmentation strategy requested from the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSegMode {
    /// A single uniform block of text.
    SingleBlock,
    /// As much scattered text as possible, in no particular order.
    SparseText,
}

impl PageSegMode {
    pub fn tesseract_psm(self) -> u8 {
        match self {
            PageSegMode::SingleBlock => 6,
            PageSegMode::SparseText => 11,
        }
    }
}

/// A word as reported by the engine, positioned relative to the input crop.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedWord {
    pub text: String,
    pub bbox: PixelRect,
    /// 0-100, or -1 when the engine reports no confidence.
    pub conf: f32,
}

pub trait OcrEngine {
    fn recognize_words(
        &self,
        image: &GrayImage,
        mode: PageSegMode,
    ) -> Result<Vec<RecognizedWord>, OcrError>;

    fn recognize_text(&self, image: &GrayImage, mode: PageSegMode) -> Result<String, OcrError>;
}
