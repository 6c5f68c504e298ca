pub mod json_export;
pub mod report_export;

use anyhow::Result;

use crate::core::model::DocumentRecord;

pub use json_export::JsonExporter;
pub use report_export::{render_report, ReportExporter};

pub trait RecordExporter {
    fn export(&self, record: &DocumentRecord) -> Result<()>;
}

/// Creates the parent directory of an output file if it is missing.
pub(crate) fn ensure_parent(path: &std::path::Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}
