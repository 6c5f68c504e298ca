//! OCR through the `tesseract` command-line tool.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use image::{GrayImage, ImageFormat};
use tracing::{debug, warn};

use crate::core::geometry::PixelRect;
use crate::core::model::NO_CONFIDENCE;
use crate::core::OcrError;
use crate::ocr::{OcrEngine, PageSegMode, RecognizedWord};

const DEFAULT_BINARY: &str = "tesseract";

#[derive(Debug, Clone)]
pub struct TesseractConfig {
    /// Explicit path to the tesseract executable. When unset, or when the
    /// path does not exist, `tesseract` is looked up on `PATH`.
    pub binary: Option<PathBuf>,
    pub language: String,
}

impl Default for TesseractConfig {
    fn default() -> Self {
        Self {
            binary: None,
            language: "eng".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TesseractEngine {
    binary: PathBuf,
    language: String,
}

impl TesseractEngine {
    pub fn new(config: TesseractConfig) -> Self {
        Self {
            binary: resolve_binary(config.binary.as_deref()),
            language: config.language,
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn run(&self, image: &GrayImage, mode: PageSegMode, tsv: bool) -> Result<String, OcrError> {
        let mut staged = tempfile::Builder::new()
            .prefix("ordscan-region-")
            .suffix(".png")
            .tempfile()?;
        image
            .write_to(&mut staged, ImageFormat::Png)
            .map_err(OcrError::Encode)?;
        staged.flush()?;

        let mut command = Command::new(&self.binary);
        command
            .arg(staged.path())
            .arg("stdout")
            .args(["-l", &self.language])
            .args(["--psm", &mode.tesseract_psm().to_string()]);
        if tsv {
            command.arg("tsv");
        }

        let output = match command.output() {
            Ok(output) => output,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(OcrError::EngineNotFound(self.binary.clone()));
            }
            Err(err) => return Err(OcrError::Io(err)),
        };

        if !output.status.success() {
            return Err(OcrError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new(TesseractConfig::default())
    }
}

impl OcrEngine for TesseractEngine {
    fn recognize_words(
        &self,
        image: &GrayImage,
        mode: PageSegMode,
    ) -> Result<Vec<RecognizedWord>, OcrError> {
        let tsv = self.run(image, mode, true)?;
        let words = parse_tsv(&tsv);
        debug!(words = words.len(), psm = mode.tesseract_psm(), "tesseract word pass");
        Ok(words)
    }

    fn recognize_text(&self, image: &GrayImage, mode: PageSegMode) -> Result<String, OcrError> {
        self.run(image, mode, false)
    }
}

/// Picks the executable to invoke for a configured path.
pub fn resolve_binary(configured: Option<&Path>) -> PathBuf {
    match configured {
        Some(path) if path.exists() => path.to_path_buf(),
        Some(path) => {
            warn!(
                configured = %path.display(),
                "tesseract not found at configured path, falling back to PATH lookup"
            );
            PathBuf::from(DEFAULT_BINARY)
        }
        None => PathBuf::from(DEFAULT_BINARY),
    }
}

/// Word rows of tesseract's TSV output.
///
/// Structural rows (page, block, paragraph, line) carry no text and are
/// skipped, as are rows whose text is blank. A confidence of `-1`, or one that
/// does not parse, maps to [`NO_CONFIDENCE`].
pub fn parse_tsv(tsv: &str) -> Vec<RecognizedWord> {
    tsv.lines()
        .skip(1)
        .filter_map(|row| {
            let cols: Vec<&str> = row.splitn(12, '\t').collect();
            if cols.len() < 12 {
                return None;
            }
            let text = cols[11].trim();
            if text.is_empty() {
                return None;
            }
            let num = |idx: usize| cols[idx].trim().parse::<u32>().unwrap_or(0);
            let conf = cols[10]
                .trim()
                .parse::<f32>()
                .ok()
                .filter(|c| *c >= 0.0)
                .unwrap_or(NO_CONFIDENCE);
            Some(RecognizedWord {
                text: text.to_string(),
                bbox: PixelRect::new(num(6), num(7), num(8), num(9)),
                conf,
            })
        })
        .collect()
}
