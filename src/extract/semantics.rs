//! Rule-based extraction of ordinance entities from a transcript.
//!
//! Each list field is driven by a row in [`LIST_RULES`]; adding a pattern for
//! a new field means adding a row and a [`ListField`] variant, not new control
//! flow. All matching runs over an uppercased copy of the transcript.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::model::{OrdinanceSummary, Topic};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListField {
    OrdinanceIds,
    Sections,
    ZoningMapRefs,
    ZoningLabels,
}

/// Which part of a match is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// The numbered group; an unmatched optional group records `""`.
    Group(usize),
    WholeMatch,
}

/// Every match is kept, in order of appearance, duplicates included.
#[derive(Debug, Clone, Copy)]
pub struct ListRule {
    pub field: ListField,
    pub pattern: &'static str,
    pub capture: Capture,
}

pub const LIST_RULES: &[ListRule] = &[
    ListRule {
        field: ListField::OrdinanceIds,
        pattern: r"ORDINANCE\s+(?:NO\.?\s*)?(\d+)",
        capture: Capture::Group(1),
    },
    ListRule {
        field: ListField::Sections,
        pattern: r"SECTION\s+(\d+)[.:]?",
        capture: Capture::Group(1),
    },
    ListRule {
        field: ListField::ZoningMapRefs,
        pattern: r"ZONING\s+MAP\s*(\d+)?",
        capture: Capture::Group(1),
    },
    ListRule {
        field: ListField::ZoningLabels,
        pattern: r"\b[A-Z]-?\d\b",
        capture: Capture::WholeMatch,
    },
];

/// Any occurrence of one of these, even inside a longer word, flags a penalty.
pub const PENALTY_KEYWORDS: &[&str] = &["PENALTY", "FINE", "MISDEMEANOR", "IMPRISON"];

pub const TOPIC_KEYWORDS: &[(&str, Topic)] =
    &[("ORDINANCE", Topic::Ordinance), ("ZONING", Topic::Zoning)];

static COMPILED_RULES: Lazy<Vec<(ListRule, Regex)>> = Lazy::new(|| {
    LIST_RULES
        .iter()
        .map(|rule| {
            let regex = Regex::new(rule.pattern).expect("built-in extraction pattern is valid");
            (*rule, regex)
        })
        .collect()
});

/// Builds the ordinance summary for a transcript.
pub fn extract_semantics(transcript: &str) -> OrdinanceSummary {
    let upper = transcript.to_uppercase();
    let mut summary = OrdinanceSummary::default();

    for (rule, regex) in COMPILED_RULES.iter() {
        let found = collect_matches(regex, rule.capture, &upper);
        list_mut(&mut summary, rule.field).extend(found);
    }

    summary.penalties_mentioned = PENALTY_KEYWORDS.iter().any(|kw| upper.contains(kw));
    summary.topics = TOPIC_KEYWORDS
        .iter()
        .filter(|(kw, _)| upper.contains(kw))
        .map(|(_, topic)| *topic)
        .collect();

    summary
}

fn collect_matches(regex: &Regex, capture: Capture, text: &str) -> Vec<String> {
    regex
        .captures_iter(text)
        .map(|caps| match capture {
            Capture::Group(idx) => caps
                .get(idx)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
            Capture::WholeMatch => caps[0].to_string(),
        })
        .collect()
}

fn list_mut(summary: &mut OrdinanceSummary, field: ListField) -> &mut Vec<String> {
    match field {
        ListField::OrdinanceIds => &mut summary.ordinance_ids,
        ListField::Sections => &mut summary.sections,
        ListField::ZoningMapRefs => &mut summary.zoning_map_refs,
        ListField::ZoningLabels => &mut summary.zoning_labels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn extracts_ordinance_and_section() {
        let summary = extract_semantics("Ordinance No. 42, Section 3.");
        assert_eq!(summary.ordinance_ids, strings(&["42"]));
        assert_eq!(summary.sections, strings(&["3"]));
        assert!(summary.topics.contains(&Topic::Ordinance));
        assert!(!summary.topics.contains(&Topic::Zoning));
    }

    #[test]
    fn plain_text_has_no_entities() {
        let summary = extract_semantics("No violations here.");
        assert!(!summary.penalties_mentioned);
        assert!(summary.topics.is_empty());
        assert!(summary.ordinance_ids.is_empty());
        assert!(summary.zoning_labels.is_empty());
    }

    #[test]
    fn ordinance_number_marker_is_optional() {
        let summary = extract_semantics("ordinance 7 amends ORDINANCE NO 12 and Ordinance no.3");
        assert_eq!(summary.ordinance_ids, strings(&["7", "12", "3"]));
    }

    #[test]
    fn duplicates_are_kept_in_order() {
        let summary = extract_semantics("Section 2: foo. SECTION 5. bar. section 2 again");
        assert_eq!(summary.sections, strings(&["2", "5", "2"]));
    }

    #[test]
    fn zoning_map_reference_number_is_optional() {
        let summary = extract_semantics("See Zoning Map 3 and the zoning map attached.");
        assert_eq!(summary.zoning_map_refs, strings(&["3", ""]));
        assert_eq!(
            summary.topics,
            BTreeSet::from([Topic::Zoning])
        );
    }

    #[test]
    fn zoning_labels_match_short_codes() {
        let summary = extract_semantics("Rezoned from R-1 to C2; district B-12 and M-3x unchanged.");
        assert_eq!(summary.zoning_labels, strings(&["R-1", "C2"]));
    }

    #[test]
    fn penalty_keywords_match_anywhere() {
        assert!(extract_semantics("shall be guilty of a misdemeanor").penalties_mentioned);
        assert!(extract_semantics("punishable by imprisonment").penalties_mentioned);
        assert!(extract_semantics("a fine of $50").penalties_mentioned);
        assert!(extract_semantics("Penalty.").penalties_mentioned);
    }

    #[test]
    fn every_rule_pattern_compiles() {
        assert_eq!(COMPILED_RULES.len(), LIST_RULES.len());
    }
}
