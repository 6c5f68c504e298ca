use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ordscan::layout::LayoutAnalyzer;
use ordscan::ocr::{TesseractConfig, TesseractEngine};
use ordscan::pipeline::{export_record, BatchConfig, BatchRunner, DocumentPipeline};
use ordscan::preprocess::Preprocessor;
use ordscan::validate::validate_file;

#[derive(Parser, Debug)]
#[command(name = "ordscan")]
#[command(version, about = "Structured records from scanned municipal ordinance pages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Preprocess and analyze every scan in a directory
    Batch {
        /// Directory holding the raw scans
        #[arg(long, default_value = "scans")]
        scans: PathBuf,

        /// Directory for cleaned bitmaps
        #[arg(long, default_value = "work")]
        work: PathBuf,

        /// Output root; records go to <out>/structured, reports to <out>/reports
        #[arg(short, long, default_value = "outputs")]
        output: PathBuf,

        /// Scan file extension to pick up (repeatable)
        #[arg(short, long = "ext", default_values_t = vec!["png".to_string()])]
        extensions: Vec<String>,

        #[command(flatten)]
        ocr: OcrArgs,
    },

    /// Clean a single raw scan for OCR
    Preprocess {
        /// Raw scan image
        input: PathBuf,

        /// Where to write the clean bitmap
        output: PathBuf,
    },

    /// Build the record and report for a clean bitmap
    Process {
        /// Clean bitmap produced by `preprocess`
        input: PathBuf,

        /// Output JSON record path
        json: PathBuf,

        /// Output Markdown report path
        report: PathBuf,

        /// Original scan to take filename metadata from (default: the input)
        #[arg(long)]
        source: Option<PathBuf>,

        #[command(flatten)]
        ocr: OcrArgs,
    },

    /// Check that record files carry the required top-level fields
    Validate {
        /// JSON record files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct OcrArgs {
    /// Path to the tesseract executable
    #[arg(long = "tesseract", env = "TESSERACT_PATH")]
    binary: Option<PathBuf>,

    /// Tesseract language code
    #[arg(long, env = "TESSERACT_LANG", default_value = "eng")]
    lang: String,
}

impl OcrArgs {
    fn pipeline(self) -> DocumentPipeline {
        let engine = TesseractEngine::new(TesseractConfig {
            binary: self.binary,
            language: self.lang,
        });
        tracing::debug!(binary = %engine.binary().display(), "OCR engine configured");
        DocumentPipeline::new(LayoutAnalyzer::default(), Box::new(engine))
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ordscan=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Batch {
            scans,
            work,
            output,
            extensions,
            ocr,
        } => {
            let mut config = BatchConfig::new(scans, work, &output);
            config.extensions = extensions;
            run_batch(config, ocr)
        }
        Commands::Preprocess { input, output } => {
            if !input.is_file() {
                anyhow::bail!("Input file does not exist: {}", input.display());
            }
            Preprocessor::default()
                .process_path(&input, &output)
                .with_context(|| format!("Failed to preprocess: {}", input.display()))?;
            println!("[✓] Wrote {}", output.display());
            Ok(())
        }
        Commands::Process {
            input,
            json,
            report,
            source,
            ocr,
        } => {
            if !input.is_file() {
                anyhow::bail!("Input file does not exist: {}", input.display());
            }
            println!("[*] Processing: {}", input.display());
            let source = source.unwrap_or_else(|| input.clone());
            let record = ocr
                .pipeline()
                .build_record(&input, &source)
                .with_context(|| format!("Failed to process: {}", input.display()))?;
            export_record(&record, &json, &report)?;
            println!("[✓] Wrote {} and {}", json.display(), report.display());
            Ok(())
        }
        Commands::Validate { files } => validate_files(&files),
    }
}

fn run_batch(config: BatchConfig, ocr: OcrArgs) -> Result<()> {
    let output_hint = config
        .structured_dir
        .parent()
        .map(|p| p.display().to_string())
        .unwrap_or_default();
    let runner = BatchRunner::new(config, Preprocessor::default(), ocr.pipeline());

    let scans = runner.prepare()?;
    if scans.is_empty() {
        println!(
            "[!] No scans found in {} (extensions: {})",
            runner.config().scan_dir.display(),
            runner.config().extensions.join(", ")
        );
        return Ok(());
    }

    println!("[*] Found {} scan(s)", scans.len());
    for (i, scan) in scans.iter().enumerate() {
        println!("[{}/{}] Processing: {}", i + 1, scans.len(), scan.display());
        runner.process_scan(scan)?;
    }

    println!("\n[✓] Done! Results saved to: {output_hint}");
    Ok(())
}

fn validate_files(files: &[PathBuf]) -> Result<()> {
    let mut failed = 0;
    for path in files {
        match validate_file(path) {
            Ok(report) => {
                if !report.is_valid() {
                    failed += 1;
                }
                println!("{}: {}", path.display(), report);
            }
            Err(e) => {
                failed += 1;
                println!("{}: ERROR - {:#}", path.display(), e);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} file(s) failed validation", failed, files.len());
    }
    Ok(())
}
