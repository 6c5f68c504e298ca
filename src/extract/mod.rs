pub mod metadata;
pub mod semantics;

pub use metadata::extract_metadata;
pub use semantics::extract_semantics;
