//! Segmentation of a clean page into ordered text and graphical regions.
//!
//! No layout model is involved: characters are smeared into lines, lines into
//! blocks, and the outer contours of the result become regions. Reading order
//! is top edge then left edge, which is right for single-column pages and
//! loosely multi-column ones but can interleave true columns.

use std::path::Path;

use image::GrayImage;
use tracing::debug;

use crate::core::geometry::PixelRect;
use crate::core::model::Region;
use crate::core::region_classifier::{classify_region_with_ratio, GRAPHICAL_AREA_RATIO};
use crate::core::ImageLoadError;
use crate::imaging::{dilate_rect, external_bounding_rects, load_grayscale, otsu_binarize_inv};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DilationStage {
    pub kernel_width: u32,
    pub kernel_height: u32,
    pub iterations: u32,
}

#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Merges characters into text lines.
    pub line_stage: DilationStage,
    /// Merges neighbouring lines into paragraph blocks.
    pub block_stage: DilationStage,
    /// Regions smaller than this many pixels are discarded as noise.
    pub min_region_area: u64,
    pub graphical_area_ratio: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            line_stage: DilationStage {
                kernel_width: 35,
                kernel_height: 5,
                iterations: 2,
            },
            block_stage: DilationStage {
                kernel_width: 80,
                kernel_height: 20,
                iterations: 1,
            },
            min_region_area: 8000,
            graphical_area_ratio: GRAPHICAL_AREA_RATIO,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LayoutAnalyzer {
    config: LayoutConfig,
}

impl LayoutAnalyzer {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn analyze_path(&self, path: &Path) -> Result<Vec<Region>, ImageLoadError> {
        let page = load_grayscale(path)?;
        Ok(self.analyze(&page))
    }

    /// Regions of `page` in reading order, without OCR content.
    pub fn analyze(&self, page: &GrayImage) -> Vec<Region> {
        let (width, height) = page.dimensions();
        let page_area = u64::from(width) * u64::from(height);

        let binary = otsu_binarize_inv(page);
        let lines = apply_stage(&binary, self.config.line_stage);
        let blocks = apply_stage(&lines, self.config.block_stage);

        let candidates = external_bounding_rects(&blocks);
        let found = candidates.len();

        let mut regions: Vec<Region> = candidates
            .into_iter()
            .filter(|rect| rect.area() >= self.config.min_region_area)
            .map(|rect| {
                let kind = classify_region_with_ratio(
                    rect.area(),
                    page_area,
                    self.config.graphical_area_ratio,
                );
                Region::empty(kind, rect)
            })
            .collect();
        sort_reading_order(&mut regions);

        debug!(
            candidates = found,
            kept = regions.len(),
            "layout segmentation finished"
        );
        regions
    }
}

fn apply_stage(mask: &GrayImage, stage: DilationStage) -> GrayImage {
    dilate_rect(mask, stage.kernel_width, stage.kernel_height, stage.iterations)
}

/// Sorts top-to-bottom, then left-to-right.
pub fn sort_reading_order(regions: &mut [Region]) {
    regions.sort_by_key(|region| reading_key(&region.bbox()));
}

fn reading_key(rect: &PixelRect) -> (u32, u32, u32, u32) {
    rect.reading_key()
}
