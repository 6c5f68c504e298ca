use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{SubsecRound, Utc};
use image::GrayImage;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::core::model::{
    DocumentMetadata, DocumentRecord, FilenameMetadata, OrdinanceSummary, Region,
};
use crate::export::{JsonExporter, RecordExporter, ReportExporter};
use crate::extract::{extract_metadata, extract_semantics};
use crate::imaging::load_grayscale;
use crate::layout::LayoutAnalyzer;
use crate::ocr::{OcrEngine, RegionOcrDispatcher};
use crate::preprocess::Preprocessor;

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub scan_dir: PathBuf,
    /// Cleaned bitmaps land here as `<stem>_clean.png`.
    pub work_dir: PathBuf,
    pub structured_dir: PathBuf,
    pub report_dir: PathBuf,
    /// Accepted scan extensions, compared case-insensitively, without the dot.
    pub extensions: Vec<String>,
}

impl BatchConfig {
    /// Uses `<output_root>/structured` and `<output_root>/reports`.
    pub fn new(scan_dir: PathBuf, work_dir: PathBuf, output_root: &Path) -> Self {
        Self {
            scan_dir,
            work_dir,
            structured_dir: output_root.join("structured"),
            report_dir: output_root.join("reports"),
            extensions: vec!["png".to_string()],
        }
    }

    pub fn outputs_for(&self, scan: &Path) -> ScanOutputs {
        let stem = scan
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        ScanOutputs {
            clean: self.work_dir.join(format!("{stem}_clean.png")),
            json: self.structured_dir.join(format!("{stem}.json")),
            report: self.report_dir.join(format!("{stem}.md")),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("scans"), PathBuf::from("work"), Path::new("outputs"))
    }
}

/// Files produced for one scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutputs {
    pub clean: PathBuf,
    pub json: PathBuf,
    pub report: PathBuf,
}

/// Layout analysis, region OCR and extraction over a clean bitmap.
pub struct DocumentPipeline {
    layout: LayoutAnalyzer,
    dispatcher: RegionOcrDispatcher,
}

impl DocumentPipeline {
    pub fn new(layout: LayoutAnalyzer, engine: Box<dyn OcrEngine>) -> Self {
        Self {
            layout,
            dispatcher: RegionOcrDispatcher::new(engine),
        }
    }

    /// Builds the record for the clean bitmap at `clean_path`.
    ///
    /// Filename metadata and `source_path` are taken from `metadata_source`,
    /// which is the original scan in batch runs.
    pub fn build_record(&self, clean_path: &Path, metadata_source: &Path) -> Result<DocumentRecord> {
        let page = load_grayscale(clean_path)?;
        self.build_record_from_page(&page, metadata_source)
    }

    pub fn build_record_from_page(
        &self,
        page: &GrayImage,
        metadata_source: &Path,
    ) -> Result<DocumentRecord> {
        let metadata = extract_metadata(metadata_source);

        let regions = self.layout.analyze(page);
        info!(regions = regions.len(), "layout analyzed");

        let (regions, transcript) = self.dispatcher.extract_text(page, regions)?;
        let summary = extract_semantics(&transcript);
        debug!(
            chars = transcript.chars().count(),
            ordinances = summary.ordinance_ids.len(),
            "transcript extracted"
        );

        Ok(assemble_record(
            metadata,
            metadata_source,
            transcript,
            regions,
            summary,
        ))
    }
}

/// Combines stage outputs into a record stamped with the current UTC time.
pub fn assemble_record(
    metadata: FilenameMetadata,
    source_path: &Path,
    transcript: String,
    regions: Vec<Region>,
    summary: OrdinanceSummary,
) -> DocumentRecord {
    let source_path =
        std::path::absolute(source_path).unwrap_or_else(|_| source_path.to_path_buf());
    DocumentRecord {
        metadata: DocumentMetadata {
            filename: metadata,
            processed_date: Utc::now().trunc_subsecs(6),
            source_path,
        },
        full_transcription: transcript,
        layout_structure: regions,
        ordinance_summary: summary,
    }
}

/// Writes the JSON record, then the report. A failed report leaves the JSON
/// in place.
pub fn export_record(record: &DocumentRecord, json_path: &Path, report_path: &Path) -> Result<()> {
    JsonExporter::new(json_path.to_path_buf()).export(record)?;
    ReportExporter::new(report_path.to_path_buf()).export(record)?;
    info!(json = %json_path.display(), report = %report_path.display(), "record exported");
    Ok(())
}

/// Scans directly inside `dir` with one of `extensions`, sorted by path.
pub fn discover_scans(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let mut scans = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.with_context(|| format!("failed to list {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .path()
            .extension()
            .map(|ext| ext.to_string_lossy())
            .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(&ext)));
        if matches {
            scans.push(entry.into_path());
        }
    }
    scans.sort();
    Ok(scans)
}

/// Sequential preprocess-then-extract over a scan directory.
pub struct BatchRunner {
    config: BatchConfig,
    preprocessor: Preprocessor,
    pipeline: DocumentPipeline,
}

impl BatchRunner {
    pub fn new(config: BatchConfig, preprocessor: Preprocessor, pipeline: DocumentPipeline) -> Self {
        Self {
            config,
            preprocessor,
            pipeline,
        }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Creates the work and output directories and lists the scans to process.
    pub fn prepare(&self) -> Result<Vec<PathBuf>> {
        for dir in [
            &self.config.work_dir,
            &self.config.structured_dir,
            &self.config.report_dir,
        ] {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }
        fs::create_dir_all(&self.config.scan_dir)
            .with_context(|| format!("failed to create {}", self.config.scan_dir.display()))?;
        discover_scans(&self.config.scan_dir, &self.config.extensions)
    }

    pub fn process_scan(&self, scan: &Path) -> Result<ScanOutputs> {
        let outputs = self.config.outputs_for(scan);
        debug!(scan = %scan.display(), "processing scan");

        self.preprocessor
            .process_path(scan, &outputs.clean)
            .with_context(|| format!("failed to preprocess {}", scan.display()))?;
        let record = self
            .pipeline
            .build_record(&outputs.clean, scan)
            .with_context(|| format!("failed to analyze {}", outputs.clean.display()))?;
        export_record(&record, &outputs.json, &outputs.report)?;
        Ok(outputs)
    }

    /// Processes every discovered scan, stopping at the first failure.
    pub fn run(&self) -> Result<Vec<ScanOutputs>> {
        let scans = self.prepare()?;
        scans.iter().map(|scan| self.process_scan(scan)).collect()
    }
}
