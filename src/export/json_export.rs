use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::model::DocumentRecord;
use crate::export::{ensure_parent, RecordExporter};

/// Writes the full record as pretty-printed JSON.
#[derive(Debug, Clone)]
pub struct JsonExporter {
    path: PathBuf,
}

impl JsonExporter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordExporter for JsonExporter {
    fn export(&self, record: &DocumentRecord) -> Result<()> {
        ensure_parent(&self.path)?;
        let data = serde_json::to_string_pretty(record)?;
        fs::write(&self.path, data)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }
}
