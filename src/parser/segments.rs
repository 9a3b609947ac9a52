use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::title::separate_clause_number_and_title;

static CLAUSE_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:Sub-?Clause|Clause|Article|Section)?\s*(\d+(?:\.\d+)*(?:\.\d+)?)\.?\s+(.+?)$").unwrap()
});
static SECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:PART|SECTION|CHAPTER)\s+[IVX]+[\.:]?\s+(.+)|^([A-Z][A-Z\s&]+CONDITIONS?)\s*$").unwrap()
});

/// Clause titles are only split out of lines shorter than this; longer
/// remainders are body text that happens to start with a number.
pub const MAX_TITLE_CHARS: usize = 200;
const MIN_PARAGRAPH_CHARS: usize = 50;
const MAX_PARAGRAPHS: usize = 50;

/// A clause-sized slice of the document, before any analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub number: Option<String>,
    pub title: Option<String>,
    pub section: Option<String>,
    pub lines: Vec<String>,
}

impl Fragment {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn first_line(&self) -> Option<&str> {
        self.lines.iter().map(|l| l.trim()).find(|l| !l.is_empty())
    }
}

/// Running state of the line scan.
struct Scan {
    fragments: Vec<Fragment>,
    section: Option<String>,
    number: Option<String>,
    title: Option<String>,
    lines: Vec<String>,
}

impl Scan {
    fn flush(&mut self) {
        while self.lines.last().is_some_and(|l| l.is_empty()) {
            self.lines.pop();
        }
        if self.lines.is_empty() {
            return;
        }
        self.fragments.push(Fragment {
            number: self.number.take(),
            title: self.title.take(),
            section: self.section.clone(),
            lines: std::mem::take(&mut self.lines),
        });
    }

    fn reset(&mut self) {
        self.number = None;
        self.title = None;
        self.lines.clear();
    }
}

/// Split contract text into clause fragments in document order.
///
/// Section headings (`PART II ...`, `PARTICULAR CONDITIONS`) close the open
/// fragment and tag everything after them. Clause-number lines (`14.`,
/// `Sub-Clause 20.1 ...`) close the open fragment and start a new one with
/// that line as its first body line. When nothing in the document looks like
/// a clause boundary, blank-line paragraphs are used instead.
pub fn segment_clauses(text: &str, max_title_chars: usize) -> Vec<Fragment> {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");

    let mut scan = Scan {
        fragments: Vec::new(),
        section: None,
        number: None,
        title: None,
        lines: Vec::new(),
    };

    let mut saw_boundary = false;
    for raw in text.split('\n') {
        let line = raw.trim();

        let mut boundary = false;
        if let Some(caps) = SECTION_RE.captures(line) {
            if let Some(heading) = caps.get(1).or_else(|| caps.get(2)) {
                scan.flush();
                scan.reset();
                scan.section = Some(heading.as_str().trim().to_string());
                boundary = true;
                saw_boundary = true;
            }
        }

        if let Some(caps) = CLAUSE_LINE_RE.captures(line) {
            saw_boundary = true;
            scan.flush();
            let captured = caps[1].to_string();
            let rest = caps[2].trim();
            let (number, title) = if rest.chars().count() < max_title_chars {
                let (number, title) = separate_clause_number_and_title(line);
                (number.unwrap_or(captured), title)
            } else {
                (captured, None)
            };
            scan.number = Some(number);
            scan.title = title;
            scan.lines = vec![line.to_string()];
            continue;
        }

        if boundary {
            continue;
        }
        if !scan.lines.is_empty() || !line.is_empty() {
            scan.lines.push(line.to_string());
        }
    }
    scan.flush();

    if !saw_boundary || scan.fragments.is_empty() {
        debug!("No clause boundaries found, splitting by paragraphs");
        let paragraphs = split_paragraphs(&text, scan.section.clone());
        if !paragraphs.is_empty() {
            return paragraphs;
        }
    }
    scan.fragments
}

fn split_paragraphs(text: &str, section: Option<String>) -> Vec<Fragment> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| p.chars().count() > MIN_PARAGRAPH_CHARS)
        .take(MAX_PARAGRAPHS)
        .enumerate()
        .map(|(i, p)| Fragment {
            number: Some((i + 1).to_string()),
            title: None,
            section: section.clone(),
            lines: p.lines().map(str::to_string).collect(),
        })
        .collect()
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(text: &str) -> Vec<Fragment> {
        segment_clauses(text, MAX_TITLE_CHARS)
    }

    #[test]
    fn single_clause() {
        let text = "14. Extension of Time\nThe Contractor shall be entitled to an extension of time of 28 days if delayed.";
        let f = segment(text);
        assert_eq!(f.len(), 1);
        assert_eq!(f[0].number.as_deref(), Some("14"));
        assert_eq!(f[0].title.as_deref(), Some("Extension of Time"));
        assert_eq!(f[0].section, None);
        assert_eq!(f[0].text(), text);
    }

    #[test]
    fn sections_tag_following_clauses() {
        let text = "GENERAL CONDITIONS\n\
                    1.1 Definitions\n\
                    Words have the meanings given.\n\
                    PARTICULAR CONDITIONS\n\
                    1.1 Definitions\n\
                    As amended for this project.";
        let f = segment(text);
        assert_eq!(f.len(), 2);
        assert_eq!(f[0].section.as_deref(), Some("GENERAL CONDITIONS"));
        assert_eq!(f[1].section.as_deref(), Some("PARTICULAR CONDITIONS"));
        assert_eq!(f[0].lines, vec!["1.1 Definitions", "Words have the meanings given."]);
        // heading lines are not body text
        assert!(!f[0].text().contains("PARTICULAR"));
    }

    #[test]
    fn part_heading_captures_name() {
        let text = "PART II: Particular Conditions of Contract\nClause 8 Commencement\nThe Works shall start promptly.";
        let f = segment(text);
        assert_eq!(f.len(), 1);
        assert_eq!(f[0].section.as_deref(), Some("Particular Conditions of Contract"));
        assert_eq!(f[0].number.as_deref(), Some("8"));
        assert_eq!(f[0].title.as_deref(), Some("Commencement"));
    }

    #[test]
    fn leading_blank_lines_dropped() {
        let f = segment("\n\n   \nPreamble text before any clause\n2. Scope\nBody");
        assert_eq!(f.len(), 2);
        assert_eq!(f[0].lines, vec!["Preamble text before any clause"]);
        assert_eq!(f[0].number, None);
        assert_eq!(f[1].number.as_deref(), Some("2"));
    }

    #[test]
    fn long_remainder_is_not_a_title() {
        let long = "word ".repeat(60);
        let text = format!("3.2 {long}\nnext line");
        let f = segment(&text);
        assert_eq!(f.len(), 1);
        assert_eq!(f[0].number.as_deref(), Some("3.2"));
        assert_eq!(f[0].title, None);
    }

    #[test]
    fn crlf_line_endings() {
        let f = segment("1. Scope\r\nThe scope is defined.\r\n2. Price\r\nThe price is fixed.");
        assert_eq!(f.len(), 2);
        assert_eq!(f[1].lines, vec!["2. Price", "The price is fixed."]);
    }

    #[test]
    fn paragraph_fallback() {
        let para = "The parties agree that the works will be executed with due diligence and care.";
        let text = format!("{para}\n\nshort\n\n{para} Again.");
        let f = segment(&text);
        assert_eq!(f.len(), 2);
        assert_eq!(f[0].number.as_deref(), Some("1"));
        assert_eq!(f[1].number.as_deref(), Some("2"));
        assert!(f.iter().all(|x| x.title.is_none()));
    }

    #[test]
    fn paragraph_fallback_capped() {
        let para = "x".repeat(60);
        let text = vec![para; 80].join("\n\n");
        assert_eq!(segment(&text).len(), MAX_PARAGRAPHS);
    }

    #[test]
    fn paragraph_fragments_keep_their_lines() {
        let first = "This Contract as amended applies to the Works on Site.";
        let text = format!(
            "{first}\nSubject to approval the parties shall proceed.\n\n\
             The Engineer shall issue instructions in writing to the Contractor."
        );
        let f = segment(&text);
        assert_eq!(f.len(), 2);
        assert_eq!(f[0].lines.len(), 2);
        assert_eq!(f[0].first_line(), Some(first));
        assert!(f[0].text().ends_with("shall proceed."));
    }

    #[test]
    fn short_paragraphs_stay_one_fragment() {
        let text = vec!["The Employer shall pay the sum due."; 6].join("\n\n");
        let f = segment(&text);
        assert_eq!(f.len(), 1);
        assert_eq!(f[0].number, None);
        assert_eq!(f[0].first_line(), Some("The Employer shall pay the sum due."));
        assert_eq!(f[0].lines.len(), 11);
    }

    #[test]
    fn nothing_usable() {
        assert!(segment("").is_empty());
        assert!(segment("\n  \n").is_empty());
        assert_eq!(segment("tiny").len(), 1);
        assert!(segment("GENERAL CONDITIONS\n\nPARTICULAR CONDITIONS").is_empty());
    }

    #[test]
    fn fixture_fidic_extract() {
        let text = std::fs::read_to_string("tests/fixtures/fidic_extract.txt").unwrap();
        let f = segment(&text);
        let numbers: Vec<_> = f.iter().filter_map(|x| x.number.as_deref()).collect();
        assert!(numbers.contains(&"8.4"));
        assert!(numbers.contains(&"14.7"));
        assert!(numbers.contains(&"20.1"));
        let sections: Vec<_> = f.iter().filter_map(|x| x.section.as_deref()).collect();
        assert!(sections.contains(&"GENERAL CONDITIONS"));
        assert!(sections.contains(&"PARTICULAR CONDITIONS"));
    }
}
