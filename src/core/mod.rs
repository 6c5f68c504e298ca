pub mod error;
pub mod geometry;
pub mod model;
pub mod region_classifier;

pub use error::{ImageLoadError, OcrError};
pub use geometry::PixelRect;
