use crate::core::model::RegionKind;

/// Share of the page above which a region cannot be running text.
pub const GRAPHICAL_AREA_RATIO: f64 = 0.20;

/// Classifies a segmented region from its geometry alone.
///
/// Maps, photos and large illustrations occupy more of the page than any
/// dense text block does at scan resolution.
pub fn classify_region(area: u64, page_area: u64) -> RegionKind {
    classify_region_with_ratio(area, page_area, GRAPHICAL_AREA_RATIO)
}

pub fn classify_region_with_ratio(area: u64, page_area: u64, ratio: f64) -> RegionKind {
    if area as f64 > ratio * page_area as f64 {
        RegionKind::GraphicalAsset
    } else {
        RegionKind::TextBlock
    }
}
