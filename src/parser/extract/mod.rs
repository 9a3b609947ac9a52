pub mod risks;
pub mod summary;
pub mod time_frames;

use super::classify::ClauseClassifier;
use super::normalize::fix_title_spacing;
use super::segments::Fragment;
use super::title::separate_clause_number_and_title;
use crate::db::ClauseRow;
use risks::RiskScanner;
use time_frames::TimeFrameExtractor;

/// Everything needed to turn a fragment into a clause row. Built once and
/// shared read-only across documents.
#[derive(Default)]
pub struct ClauseAnalyzer {
    pub classifier: ClauseClassifier,
    pub time_frames: TimeFrameExtractor,
    pub risks: RiskScanner,
}

impl ClauseAnalyzer {
    pub fn new(classifier: ClauseClassifier, time_frames: TimeFrameExtractor, risks: RiskScanner) -> Self {
        Self {
            classifier,
            time_frames,
            risks,
        }
    }

    /// Analyze one fragment. Total: a keyword or pattern that finds nothing
    /// just leaves its field empty.
    ///
    /// `ocr_cleaned` marks text that went through OCR cleanup before
    /// segmentation; that text is then both the original and the cleaned
    /// variant, since the raw OCR output can't be mapped back per clause.
    pub fn analyze(&self, fragment: &Fragment, ocr_cleaned: bool, max_title_chars: usize) -> ClauseRow {
        let text = fragment.text();
        let (number, title) = resolve_heading(fragment, max_title_chars);

        let clause_type = self
            .classifier
            .classify(&text, fragment.section.as_deref(), title.as_deref());
        let frames = self.time_frames.extract(&text);

        ClauseRow {
            clause_number: number,
            clause_title: title,
            section_name: fragment.section.clone(),
            text_cleaned: ocr_cleaned.then(|| text.clone()),
            clause_type,
            summary: Some(summary::summarize(&text)),
            risk_summary: self.risks.analyze(&text),
            time_frames_raw: time_frames::join_raw(&frames),
            time_frames_explained: time_frames::format_time_frames_explanation(&frames),
            text_original: text,
        }
    }
}

/// Number and title for the row. A missing title is re-derived from the
/// fragment's first line when that line is short enough to be a heading.
fn resolve_heading(fragment: &Fragment, max_title_chars: usize) -> (Option<String>, Option<String>) {
    if let Some(title) = &fragment.title {
        let title = fix_title_spacing(title);
        return (fragment.number.clone(), (!title.is_empty()).then_some(title));
    }

    let Some(first) = fragment.first_line() else {
        return (fragment.number.clone(), None);
    };
    if first.chars().count() >= max_title_chars {
        return (fragment.number.clone(), None);
    }
    let (number, title) = separate_clause_number_and_title(first);
    (fragment.number.clone().or(number), title)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::classify::ClauseType;
    use crate::parser::segments::{segment_clauses, MAX_TITLE_CHARS};

    fn fragment(number: Option<&str>, title: Option<&str>, section: Option<&str>, lines: &[&str]) -> Fragment {
        Fragment {
            number: number.map(String::from),
            title: title.map(String::from),
            section: section.map(String::from),
            lines: lines.iter().map(|l| l.to_string()).collect(),
        }
    }

    #[test]
    fn extension_of_time_scenario() {
        let text = "14. Extension of Time\nThe Contractor shall be entitled to an extension of time of 28 days if delayed.";
        let fragments = segment_clauses(text, MAX_TITLE_CHARS);
        assert_eq!(fragments.len(), 1);

        let row = ClauseAnalyzer::default().analyze(&fragments[0], false, MAX_TITLE_CHARS);
        assert_eq!(row.clause_number.as_deref(), Some("14"));
        assert_eq!(row.clause_title.as_deref(), Some("Extension of Time"));
        assert_eq!(row.clause_type, ClauseType::Unknown);
        assert_eq!(row.time_frames_raw.as_deref(), Some("28 days"));
        let risks = row.risk_summary.unwrap();
        assert!(risks.contains("Claim entitlement"));
        assert!(risks.contains("Time extension risk"));
        assert_eq!(row.text_original, text);
        assert_eq!(row.text_cleaned, None);
        assert!(row.summary.unwrap().starts_with("This clause addresses time-related obligations"));
    }

    #[test]
    fn section_drives_type() {
        let f = fragment(
            Some("4.1"),
            Some("Contractor's General Obligations"),
            Some("PARTICULAR CONDITIONS"),
            &["4.1 Contractor's General Obligations", "Subject to the Contract, the Contractor shall design the Works."],
        );
        let row = ClauseAnalyzer::default().analyze(&f, false, MAX_TITLE_CHARS);
        assert_eq!(row.clause_type, ClauseType::Particular);
        assert_eq!(row.section_name.as_deref(), Some("PARTICULAR CONDITIONS"));
    }

    #[test]
    fn missing_title_rederived_from_first_line() {
        let f = fragment(Some("7"), None, None, &["Clause 7 PlantAndMaterials", "All Plant shall be new."]);
        let row = ClauseAnalyzer::default().analyze(&f, false, MAX_TITLE_CHARS);
        assert_eq!(row.clause_number.as_deref(), Some("7"));
        assert_eq!(row.clause_title.as_deref(), Some("Plant And Materials"));
    }

    #[test]
    fn long_first_line_gives_no_title() {
        let long = "The Contractor shall ".repeat(20);
        let f = fragment(Some("1"), None, None, &[long.as_str()]);
        let row = ClauseAnalyzer::default().analyze(&f, false, MAX_TITLE_CHARS);
        assert_eq!(row.clause_title, None);
    }

    #[test]
    fn ocr_text_fills_cleaned_variant() {
        let f = fragment(None, None, None, &["The Employer shall pay within 56 days of receipt."]);
        let row = ClauseAnalyzer::default().analyze(&f, true, MAX_TITLE_CHARS);
        assert_eq!(row.text_cleaned.as_deref(), Some(row.text_original.as_str()));
        assert!(row.risk_summary.unwrap().starts_with("Risk (Payment obligation): "));
        let explained = row.time_frames_explained.unwrap();
        assert!(explained.contains("  - within 56 days of: A deadline: within 56 days of"));
    }
}
