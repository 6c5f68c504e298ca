pub mod core;
pub mod export;
pub mod extract;
pub mod imaging;
pub mod layout;
pub mod ocr;
pub mod pipeline;
pub mod preprocess;
pub mod validate;

pub use core::model::{DocumentRecord, OrdinanceSummary, Region};
pub use pipeline::{BatchConfig, BatchRunner, DocumentPipeline};
