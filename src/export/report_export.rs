use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::model::DocumentRecord;
use crate::export::{ensure_parent, RecordExporter};

/// Number of transcript characters included in the report.
pub const PREVIEW_CHARS: usize = 2000;

/// Writes a short Markdown summary of a record for human review.
#[derive(Debug, Clone)]
pub struct ReportExporter {
    path: PathBuf,
}

impl ReportExporter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordExporter for ReportExporter {
    fn export(&self, record: &DocumentRecord) -> Result<()> {
        ensure_parent(&self.path)?;
        fs::write(&self.path, render_report(record))
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }
}

pub fn render_report(record: &DocumentRecord) -> String {
    let summary = &record.ordinance_summary;
    let mut out = String::new();

    out.push_str(&format!(
        "# Report for {}\n\n",
        record.metadata.filename.source_file
    ));
    out.push_str(&format!("**Ordinances:** {:?}\n\n", summary.ordinance_ids));
    out.push_str(&format!("**Sections:** {:?}\n\n", summary.sections));
    out.push_str(&format!("**Zoning Codes:** {:?}\n\n", summary.zoning_labels));
    out.push_str(&format!(
        "**Penalties Mentioned:** {}\n\n",
        summary.penalties_mentioned
    ));
    out.push_str(&format!("## Transcript Preview (first {PREVIEW_CHARS} chars)\n\n"));
    out.push_str(preview(&record.full_transcription, PREVIEW_CHARS));
    out.push('\n');
    out
}

/// The first `max_chars` characters of `text`, never splitting a code point.
fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
