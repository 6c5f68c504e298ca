use std::fs;
use std::path::Path;

use anyhow::Result;
use image::{GrayImage, Luma};
use serde_json::Value;

use ordscan::core::model::{Region, RegionKind};
use ordscan::core::{OcrError, PixelRect};
use ordscan::layout::LayoutAnalyzer;
use ordscan::ocr::{OcrEngine, PageSegMode, RecognizedWord};
use ordscan::pipeline::{export_record, BatchConfig, BatchRunner, DocumentPipeline};
use ordscan::preprocess::Preprocessor;
use ordscan::validate::{validate_file, SchemaReport};

/// Stands in for tesseract: every text block reads as the same sentence.
struct FixedEngine;

impl OcrEngine for FixedEngine {
    fn recognize_words(
        &self,
        _image: &GrayImage,
        _mode: PageSegMode,
    ) -> Result<Vec<RecognizedWord>, OcrError> {
        Ok("ORDINANCE NO. 7 Section 2 district R-1 fine"
            .split(' ')
            .enumerate()
            .map(|(i, text)| RecognizedWord {
                text: text.to_string(),
                bbox: PixelRect::new(i as u32 * 12, 4, 10, 10),
                conf: 88.0,
            })
            .collect())
    }

    fn recognize_text(&self, _image: &GrayImage, _mode: PageSegMode) -> Result<String, OcrError> {
        Ok("ZONING MAP 5".to_string())
    }
}

/// Gray paper with one paragraph of dark word marks.
fn synthetic_scan(path: &Path) -> Result<()> {
    synthetic_scan_with_margin(path, 100)
}

fn synthetic_scan_with_margin(path: &Path, margin: u32) -> Result<()> {
    let mut scan = GrayImage::from_pixel(1000, 800, Luma([225]));
    for line in 0..5 {
        let top = 120 + line * 25;
        for left in (margin..margin + 400).step_by(40) {
            for y in top..top + 12 {
                for x in left..left + 30 {
                    scan.put_pixel(x, y, Luma([30]));
                }
            }
        }
    }
    scan.save(path)?;
    Ok(())
}

fn fixed_pipeline() -> DocumentPipeline {
    DocumentPipeline::new(LayoutAnalyzer::default(), Box::new(FixedEngine))
}

#[test]
fn batch_run_produces_valid_records_and_reports() -> Result<()> {
    let root = tempfile::tempdir()?;
    let config = BatchConfig::new(
        root.path().join("scans"),
        root.path().join("work"),
        &root.path().join("outputs"),
    );
    fs::create_dir_all(&config.scan_dir)?;
    synthetic_scan(&config.scan_dir.join("cityledger-jan-05-1959-p-03.png"))?;

    let runner = BatchRunner::new(config, Preprocessor::default(), fixed_pipeline());
    let outputs = runner.run()?;
    assert_eq!(outputs.len(), 1);
    let out = &outputs[0];

    assert!(out.clean.ends_with("cityledger-jan-05-1959-p-03_clean.png"));
    assert!(out.clean.is_file());
    assert_eq!(validate_file(&out.json)?, SchemaReport::Valid);

    let record: Value = serde_json::from_str(&fs::read_to_string(&out.json)?)?;
    let meta = &record["metadata"];
    assert_eq!(meta["source_file"], "cityledger-jan-05-1959-p-03.png");
    assert_eq!(meta["publication_name"], "cityledger");
    assert_eq!(meta["issue_date"], "1959-01-05");
    assert_eq!(meta["page_number"], "03");
    assert!(meta["processed_date"].as_str().unwrap().ends_with('Z'));

    let summary = &record["ordinance_summary"];
    assert_eq!(summary["ordinance_ids"][0], "7");
    assert_eq!(summary["penalties_mentioned"], true);
    assert!(summary["zoning_labels"]
        .as_array()
        .unwrap()
        .iter()
        .any(|label| label == "R-1"));

    let layout: Vec<Region> = serde_json::from_value(record["layout_structure"].clone())?;
    assert!(!layout.is_empty());
    assert!(layout.iter().all(|r| r.kind() == RegionKind::TextBlock));

    let report = fs::read_to_string(&out.report)?;
    assert!(report.starts_with("# Report for cityledger-jan-05-1959-p-03.png"));
    assert!(report.contains("**Penalties Mentioned:** true"));
    assert!(report.contains("ORDINANCE NO. 7"));
    Ok(())
}

#[test]
fn staged_preprocess_then_process_matches_batch_layout() -> Result<()> {
    let root = tempfile::tempdir()?;
    let scan = root.path().join("herald-mar-9-1948.png");
    let clean = root.path().join("work").join("herald-mar-9-1948_clean.png");
    synthetic_scan(&scan)?;

    Preprocessor::default().process_path(&scan, &clean)?;
    let record = fixed_pipeline().build_record(&clean, &scan)?;
    assert_eq!(record.metadata.filename.publication_name.as_deref(), Some("herald"));
    assert!(record.full_transcription.contains("Section 2"));

    let json = root.path().join("out").join("herald.json");
    let report = root.path().join("out").join("herald.md");
    export_record(&record, &json, &report)?;
    assert!(json.is_file());
    assert!(report.is_file());
    Ok(())
}

#[test]
fn paragraph_at_the_left_margin_reaches_the_transcript() -> Result<()> {
    let root = tempfile::tempdir()?;
    let scan = root.path().join("gazette-apr-2-1952-p-1.png");
    let clean = root.path().join("gazette-apr-2-1952-p-1_clean.png");
    synthetic_scan_with_margin(&scan, 8)?;

    Preprocessor::default().process_path(&scan, &clean)?;
    let record = fixed_pipeline().build_record(&clean, &scan)?;
    assert_eq!(record.layout_structure.len(), 1);
    assert_eq!(record.layout_structure[0].bbox().x, 0);
    assert!(record.full_transcription.starts_with("ORDINANCE NO. 7"));
    Ok(())
}

#[test]
fn record_without_summary_fails_validation() -> Result<()> {
    let root = tempfile::tempdir()?;
    let scan = root.path().join("randomfile.png");
    synthetic_scan(&scan)?;
    let record = fixed_pipeline().build_record(&scan, &scan)?;

    let mut value = serde_json::to_value(&record)?;
    value
        .as_object_mut()
        .expect("record serializes to an object")
        .remove("ordinance_summary");
    let path = root.path().join("partial.json");
    fs::write(&path, serde_json::to_string_pretty(&value)?)?;

    let report = validate_file(&path)?;
    assert_eq!(
        report.to_string(),
        "INVALID - 'ordinance_summary' is a required property"
    );
    assert_eq!(value["metadata"]["publication_name"], Value::Null);
    Ok(())
}
