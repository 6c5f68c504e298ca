use anyhow::{Context, Result};
use image::{imageops, GrayImage};
use tracing::debug;

use crate::core::model::{Region, Token, GRAPHICAL_ASSET_PLACEHOLDER};
use crate::ocr::{OcrEngine, PageSegMode};

/// Separator between region contributions in the full transcript.
pub const TRANSCRIPT_SEPARATOR: &str = "\n\n";

/// Runs OCR per region, choosing the recognition strategy by region kind.
pub struct RegionOcrDispatcher {
    engine: Box<dyn OcrEngine>,
}

impl RegionOcrDispatcher {
    pub fn new(engine: Box<dyn OcrEngine>) -> Self {
        Self { engine }
    }

    /// Fills in OCR content for every region and assembles the transcript.
    ///
    /// Regions keep their order. Those that produce no text stay in the
    /// returned list but add nothing to the transcript.
    pub fn extract_text(
        &self,
        page: &GrayImage,
        regions: Vec<Region>,
    ) -> Result<(Vec<Region>, String)> {
        let mut enriched = Vec::with_capacity(regions.len());
        let mut parts: Vec<String> = Vec::new();

        for (idx, region) in regions.into_iter().enumerate() {
            let region = self
                .enrich(page, region)
                .with_context(|| format!("OCR failed for region {idx}"))?;
            if let Some(contribution) = region.transcript_contribution() {
                parts.push(contribution.to_string());
            }
            enriched.push(region);
        }

        Ok((enriched, parts.join(TRANSCRIPT_SEPARATOR)))
    }

    fn enrich(&self, page: &GrayImage, region: Region) -> Result<Region> {
        let (page_width, page_height) = page.dimensions();
        let Some(bounds) = region.bbox().clamp_to(page_width, page_height) else {
            debug!(bbox = ?region.bbox(), "region lies outside the page, skipping OCR");
            return Ok(region);
        };
        let crop = imageops::crop_imm(page, bounds.x, bounds.y, bounds.width, bounds.height)
            .to_image();

        let enriched = match region {
            Region::TextBlock { bbox, area, .. } => {
                let ocr_words: Vec<Token> = self
                    .engine
                    .recognize_words(&crop, PageSegMode::SingleBlock)?
                    .into_iter()
                    .filter_map(|word| {
                        let text = word.text.trim();
                        if text.is_empty() {
                            return None;
                        }
                        Some(Token {
                            text: text.to_string(),
                            bbox: word.bbox.offset(bounds.x, bounds.y),
                            conf: word.conf,
                        })
                    })
                    .collect();
                let text = ocr_words
                    .iter()
                    .map(|token| token.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                debug!(?bbox, words = ocr_words.len(), "text block recognized");
                Region::TextBlock {
                    bbox,
                    area,
                    ocr_words,
                    text,
                }
            }
            Region::GraphicalAsset { bbox, area, .. } => {
                let caption = self
                    .engine
                    .recognize_text(&crop, PageSegMode::SparseText)?
                    .trim()
                    .to_string();
                debug!(?bbox, caption_len = caption.len(), "graphical asset captioned");
                Region::GraphicalAsset {
                    bbox,
                    area,
                    description_ocr: Some(caption),
                    text: GRAPHICAL_ASSET_PLACEHOLDER.to_string(),
                }
            }
        };
        Ok(enriched)
    }
}
