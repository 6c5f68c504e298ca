//! Publication metadata recovered from scan filenames such as
//! `cityledger-jan-05-1959-p-03.png`.

use std::path::Path;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::core::model::FilenameMetadata;

static DATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-Za-z]+)[-_](\d{1,2})[-_](\d{4})").expect("date pattern is valid")
});

static PAGE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)p-(\d+)").expect("page pattern is valid"));

/// Month formats tried in order: abbreviated, then full.
const DATE_FORMATS: [&str; 2] = ["%b %d %Y", "%B %d %Y"];

/// Derives metadata from the filename alone. Never fails: anything that
/// cannot be recognised is left as `None`.
pub fn extract_metadata(path: &Path) -> FilenameMetadata {
    let source_file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut metadata = FilenameMetadata {
        source_file,
        publication_name: None,
        issue_date: None,
        page_number: None,
    };

    if let Some(caps) = DATE_PATTERN.captures(&stem) {
        metadata.issue_date = parse_issue_date(&caps[1], &caps[2], &caps[3]);
        if metadata.issue_date.is_none() {
            debug!(file = %metadata.source_file, candidate = &caps[0], "date-like token did not parse");
        }

        let start = caps.get(0).map_or(0, |m| m.start());
        let prefix = stem[..start].trim_end_matches(['-', '_']);
        if !prefix.is_empty() {
            metadata.publication_name = Some(prefix.to_string());
        }
    }

    if let Some(caps) = PAGE_PATTERN.captures(&stem) {
        metadata.page_number = Some(caps[1].to_string());
    }

    metadata
}

fn parse_issue_date(month: &str, day: &str, year: &str) -> Option<NaiveDate> {
    let candidate = format!("{month} {day} {year}");
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(&candidate, format).ok())
}
