use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::geometry::PixelRect;

/// Flattened text contribution of a graphical region.
pub const GRAPHICAL_ASSET_PLACEHOLDER: &str = "[GRAPHICAL_ASSET]";

/// Confidence value used when the engine reports none.
pub const NO_CONFIDENCE: f32 = -1.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    TextBlock,
    GraphicalAsset,
}

/// One recognized word, positioned on the page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    pub text: String,
    pub bbox: PixelRect,
    pub conf: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Region {
    TextBlock {
        bbox: PixelRect,
        area: u64,
        #[serde(default)]
        ocr_words: Vec<Token>,
        #[serde(default)]
        text: String,
    },
    GraphicalAsset {
        bbox: PixelRect,
        area: u64,
        #[serde(default)]
        description_ocr: Option<String>,
        #[serde(default)]
        text: String,
    },
}

impl Region {
    /// Region without OCR content, as produced by layout analysis.
    pub fn empty(kind: RegionKind, bbox: PixelRect) -> Self {
        let area = bbox.area();
        match kind {
            RegionKind::TextBlock => Region::TextBlock {
                bbox,
                area,
                ocr_words: Vec::new(),
                text: String::new(),
            },
            RegionKind::GraphicalAsset => Region::GraphicalAsset {
                bbox,
                area,
                description_ocr: None,
                text: String::new(),
            },
        }
    }

    pub fn kind(&self) -> RegionKind {
        match self {
            Region::TextBlock { .. } => RegionKind::TextBlock,
            Region::GraphicalAsset { .. } => RegionKind::GraphicalAsset,
        }
    }

    pub fn bbox(&self) -> PixelRect {
        match self {
            Region::TextBlock { bbox, .. } | Region::GraphicalAsset { bbox, .. } => *bbox,
        }
    }

    pub fn area(&self) -> u64 {
        match self {
            Region::TextBlock { area, .. } | Region::GraphicalAsset { area, .. } => *area,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Region::TextBlock { text, .. } | Region::GraphicalAsset { text, .. } => text,
        }
    }

    /// What this region adds to the full transcript, if anything.
    ///
    /// Graphical regions contribute their caption, never the placeholder.
    pub fn transcript_contribution(&self) -> Option<&str> {
        let contribution = match self {
            Region::TextBlock { text, .. } => text.as_str(),
            Region::GraphicalAsset {
                description_ocr, ..
            } => description_ocr.as_deref().unwrap_or_default(),
        };
        if contribution.is_empty() {
            None
        } else {
            Some(contribution)
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Topic {
    Ordinance,
    Zoning,
}

/// Fields recoverable from a scan's filename alone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilenameMetadata {
    pub source_file: String,
    pub publication_name: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub page_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentMetadata {
    #[serde(flatten)]
    pub filename: FilenameMetadata,
    #[serde(with = "micros_timestamp")]
    pub processed_date: DateTime<Utc>,
    pub source_path: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrdinanceSummary {
    pub ordinance_ids: Vec<String>,
    pub sections: Vec<String>,
    pub zoning_map_refs: Vec<String>,
    pub zoning_labels: Vec<String>,
    pub penalties_mentioned: bool,
    pub topics: BTreeSet<Topic>,
}

/// RFC 3339 in UTC with exactly six fractional digits and a `Z` suffix.
mod micros_timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }
}

/// The persisted unit of work, one per source scan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentRecord {
    pub metadata: DocumentMetadata,
    pub full_transcription: String,
    pub layout_structure: Vec<Region>,
    pub ordinance_summary: OrdinanceSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn region_serializes_with_type_tag() {
        let region = Region::empty(RegionKind::GraphicalAsset, PixelRect::new(0, 0, 200, 100));
        let value = serde_json::to_value(&region).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "graphical_asset",
                "bbox": [0, 0, 200, 100],
                "area": 20000,
                "description_ocr": null,
                "text": ""
            })
        );
    }

    #[test]
    fn graphical_placeholder_never_reaches_transcript() {
        let region = Region::GraphicalAsset {
            bbox: PixelRect::new(0, 0, 10, 10),
            area: 100,
            description_ocr: Some(String::new()),
            text: GRAPHICAL_ASSET_PLACEHOLDER.to_string(),
        };
        assert_eq!(region.transcript_contribution(), None);

        let captioned = Region::GraphicalAsset {
            bbox: PixelRect::new(0, 0, 10, 10),
            area: 100,
            description_ocr: Some("ZONING MAP 2".to_string()),
            text: GRAPHICAL_ASSET_PLACEHOLDER.to_string(),
        };
        assert_eq!(captioned.transcript_contribution(), Some("ZONING MAP 2"));
    }

    #[test]
    fn metadata_flattens_filename_fields() {
        let metadata = DocumentMetadata {
            filename: FilenameMetadata {
                source_file: "gazette-mar-3-1961.png".to_string(),
                publication_name: Some("gazette".to_string()),
                issue_date: NaiveDate::from_ymd_opt(1961, 3, 3),
                page_number: None,
            },
            processed_date: DateTime::<Utc>::from_timestamp(0, 0).unwrap(),
            source_path: PathBuf::from("/scans/gazette-mar-3-1961.png"),
        };
        let value = serde_json::to_value(&metadata).unwrap();
        assert_eq!(value["source_file"], "gazette-mar-3-1961.png");
        assert_eq!(value["issue_date"], "1961-03-03");
        assert_eq!(value["page_number"], serde_json::Value::Null);
        assert!(value.get("filename").is_none());
        assert_eq!(value["processed_date"], "1970-01-01T00:00:00.000000Z");

        let back: DocumentMetadata = serde_json::from_value(value).unwrap();
        assert_eq!(back, metadata);
    }

    #[test]
    fn topics_serialize_in_stable_order() {
        let summary = OrdinanceSummary {
            topics: [Topic::Zoning, Topic::Ordinance].into_iter().collect(),
            ..Default::default()
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["topics"], json!(["Ordinance", "Zoning"]));
    }
}
