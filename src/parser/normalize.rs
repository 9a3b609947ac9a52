//! Spacing repair for extracted contract text.
//!
//! Everything here may move whitespace around or shorten runs of a repeated
//! character, but never adds, drops or rewrites a word.

use std::sync::LazyLock;

use regex::Regex;

static LETTER_DIGIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([a-zA-Z])(\d)").unwrap());
static DIGIT_LETTER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d)([A-Za-z])").unwrap());
static CAMEL_WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([a-z])([A-Z][a-z])").unwrap());
static LOWER_UPPER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"([a-z])([A-Z])").unwrap());
static APOSTROPHE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(['’])([A-Za-z])").unwrap());
static BLANK_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static NEWLINE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Clean OCR output line by line, keeping the line structure intact.
///
/// Repeated-character runs are cut to two, letters and digits that were
/// glued together get a space, `wordWord` joins are split (but not acronym
/// runs like `USA`), blanks are collapsed and lines trimmed. Three or more
/// newlines in a row become a single blank line.
pub fn clean_ocr_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let cleaned = text
        .split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                return String::new();
            }
            let line = collapse_repeats(line);
            let line = LETTER_DIGIT_RE.replace_all(&line, "${1} ${2}");
            let line = DIGIT_LETTER_RE.replace_all(&line, "${1} ${2}");
            let line = CAMEL_WORD_RE.replace_all(&line, "${1} ${2}");
            let line = BLANK_RUN_RE.replace_all(&line, " ");
            line.trim().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n");

    NEWLINE_RUN_RE.replace_all(&cleaned, "\n\n").into_owned()
}

/// Stricter spacing fix for short, already segmented clause titles.
///
/// `GeneralIndemnity34` becomes `General Indemnity 34`. Unlike
/// [`clean_ocr_text`] every lowercase→uppercase join is split, since titles
/// rarely carry acronyms. Applying it twice gives the same result as once.
pub fn fix_title_spacing(title: &str) -> String {
    let fixed = title.trim();
    if fixed.is_empty() {
        return String::new();
    }
    let fixed = LOWER_UPPER_RE.replace_all(fixed, "${1} ${2}");
    let fixed = LETTER_DIGIT_RE.replace_all(&fixed, "${1} ${2}");
    let fixed = DIGIT_LETTER_RE.replace_all(&fixed, "${1} ${2}");
    let fixed = APOSTROPHE_RE.replace_all(&fixed, "${1} ${2}");
    let fixed = WHITESPACE_RE.replace_all(&fixed, " ");
    fixed.trim().to_string()
}

/// Cut every run of 3+ identical characters down to 2 (`Hellllo` → `Hello`).
fn collapse_repeats(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut prev: Option<char> = None;
    let mut run = 0usize;
    for c in line.chars() {
        if prev == Some(c) {
            run += 1;
        } else {
            prev = Some(c);
            run = 1;
        }
        if run <= 2 {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(s: &str) -> Vec<String> {
        s.split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(|w| w.to_string())
            .collect()
    }

    #[test]
    fn title_spacing_example() {
        assert_eq!(fix_title_spacing("GeneralIndemnity34"), "General Indemnity 34");
    }

    #[test]
    fn title_spacing_decimal_number_kept_whole() {
        assert_eq!(fix_title_spacing("PaymentTerms12.6"), "Payment Terms 12.6");
    }

    #[test]
    fn title_spacing_is_idempotent() {
        let samples = [
            "GeneralIndemnity34",
            "Contractor'sIndemnity40",
            "  Extension   ofTime ",
            "12.6General",
            "USA Works aBcD1e2",
            "Employer’sRisks",
            "",
        ];
        for s in samples {
            let once = fix_title_spacing(s);
            assert_eq!(fix_title_spacing(&once), once, "not idempotent for {:?}", s);
        }
    }

    #[test]
    fn title_spacing_empty() {
        assert_eq!(fix_title_spacing("   "), "");
    }

    #[test]
    fn ocr_collapses_repeated_characters() {
        assert_eq!(clean_ocr_text("Hellllo wooorld"), "Hello woorld");
    }

    #[test]
    fn ocr_splits_letters_and_digits() {
        assert_eq!(clean_ocr_text("within28days of Clause14"), "within 28 days of Clause 14");
        assert_eq!(clean_ocr_text("12.6General"), "12.6 General");
    }

    #[test]
    fn ocr_splits_camel_joins_but_not_acronyms() {
        assert_eq!(clean_ocr_text("theContractor shall notify USA"), "the Contractor shall notify USA");
        assert_eq!(clean_ocr_text("pH level"), "pH level");
    }

    #[test]
    fn ocr_keeps_lines_and_collapses_blank_runs() {
        let raw = "  first   line\t here \n\n\n\n second line ";
        assert_eq!(clean_ocr_text(raw), "first line here\n\nsecond line");
    }

    #[test]
    fn ocr_empty_input() {
        assert_eq!(clean_ocr_text(""), "");
    }

    #[test]
    fn ocr_never_invents_words() {
        let raw = "Sub-Clause 8.4Extension ofTime\nThe Contractorshall be entitled to 28days.\n\n\n\nAAAA BBBB";
        let cleaned = clean_ocr_text(raw);
        let source: String = raw.chars().filter(|c| c.is_alphanumeric()).collect();
        for w in words(&cleaned) {
            // every cleaned word is still a run of characters present in the
            // source once repeats are allowed to be shorter
            let collapsed_source = collapse_repeats(&source);
            assert!(
                source.contains(&w) || collapsed_source.contains(&w),
                "{:?} not found in source",
                w
            );
        }
    }
}
