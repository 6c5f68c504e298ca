//! Scan normalisation: grayscale, denoise, adaptive binarisation and deskew.

pub mod deskew;

use std::path::Path;

use anyhow::{Context, Result};
use image::{imageops, DynamicImage, GrayImage};
use imageproc::filter::median_filter;
use tracing::{debug, info};

use crate::imaging::{adaptive_gaussian_threshold, load_image, save_grayscale};

pub use deskew::{deskew, skew_angle};

#[derive(Debug, Clone)]
pub struct PreprocessConfig {
    /// Median filter radius used for denoising; 0 disables it.
    pub denoise_radius: u32,
    /// Side of the adaptive threshold neighbourhood, in pixels.
    pub threshold_block_size: u32,
    /// Subtracted from the local mean before comparison.
    pub threshold_bias: f32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            denoise_radius: 1,
            threshold_block_size: 35,
            threshold_bias: 15.0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    config: PreprocessConfig,
}

impl Preprocessor {
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    /// Turns a raw scan into a binarised, deskewed page with dark ink on white.
    pub fn process(&self, raw: &DynamicImage) -> GrayImage {
        let gray = raw.to_luma8();
        let denoised = if self.config.denoise_radius > 0 {
            median_filter(&gray, self.config.denoise_radius, self.config.denoise_radius)
        } else {
            gray
        };

        let mut binary = adaptive_gaussian_threshold(
            &denoised,
            self.config.threshold_block_size,
            self.config.threshold_bias,
        );

        imageops::invert(&mut binary);
        let mut straightened = deskew(&binary);
        imageops::invert(&mut straightened);
        straightened
    }

    /// Reads `input`, preprocesses it and writes the clean bitmap to `output`.
    pub fn process_path(&self, input: &Path, output: &Path) -> Result<()> {
        info!(input = %input.display(), output = %output.display(), "preprocessing scan");
        let raw = load_image(input)?;
        let clean = self.process(&raw);
        debug!(width = clean.width(), height = clean.height(), "preprocessed bitmap ready");

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        save_grayscale(&clean, output)?;
        Ok(())
    }
}
