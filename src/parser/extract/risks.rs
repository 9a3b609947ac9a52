use std::collections::HashSet;

use regex::Regex;
use serde::Serialize;

pub const MAX_FINDINGS: usize = 5;
const CONTEXT_CHARS: usize = 100;
const SNIPPET_CHARS: usize = 200;

/// Phrases that put cost, time or liability on the Employer, in report order.
pub const RISK_KEYWORDS: &[(&str, &str)] = &[
    ("employer shall pay", "Payment obligation"),
    ("employer must pay", "Payment obligation"),
    ("additional payment", "Additional cost"),
    ("extra payment", "Additional cost"),
    ("extension of time", "Time extension risk"),
    ("extension to time", "Time extension risk"),
    ("time extension", "Time extension risk"),
    ("delay by employer", "Delay liability"),
    ("contractor may claim", "Claim entitlement"),
    ("contractor is entitled", "Claim entitlement"),
    ("contractor shall be entitled", "Claim entitlement"),
    ("indemnify", "Indemnity obligation"),
    ("indemnity", "Indemnity obligation"),
    ("warranty", "Warranty obligation"),
    ("guarantee", "Guarantee obligation"),
    ("employer shall provide", "Provision obligation"),
    ("employer is responsible", "Responsibility"),
    ("employer's risk", "Risk allocation"),
    ("employer liability", "Liability"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskFinding {
    pub keyword: String,
    pub category: String,
    pub context: String,
}

impl RiskFinding {
    pub fn render(&self) -> String {
        format!("Risk ({}): {}...", self.category, self.context)
    }
}

struct RiskRule {
    keyword: String,
    category: String,
    context_re: Regex,
}

/// Keyword scan for Employer exposure, with a short context window per hit.
pub struct RiskScanner {
    rules: Vec<RiskRule>,
}

impl Default for RiskScanner {
    fn default() -> Self {
        Self::new(RISK_KEYWORDS).expect("built-in risk keywords compile")
    }
}

impl RiskScanner {
    pub fn new(table: &[(&str, &str)]) -> Result<Self, regex::Error> {
        let rules = table
            .iter()
            .map(|(keyword, category)| {
                let keyword = keyword.to_lowercase();
                let pattern = format!(
                    "(?is).{{0,{n}}}{kw}.{{0,{n}}}",
                    n = CONTEXT_CHARS,
                    kw = regex::escape(&keyword)
                );
                Ok(RiskRule {
                    context_re: Regex::new(&pattern)?,
                    keyword,
                    category: category.to_string(),
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { rules })
    }

    /// One finding per matching keyword, in table order.
    pub fn findings(&self, text: &str) -> Vec<RiskFinding> {
        let lower = text.to_lowercase();
        self.rules
            .iter()
            .filter(|r| lower.contains(&r.keyword))
            .filter_map(|r| {
                let m = r.context_re.find(text)?;
                let context: String = m.as_str().trim().chars().take(SNIPPET_CHARS).collect();
                Some(RiskFinding {
                    keyword: r.keyword.clone(),
                    category: r.category.clone(),
                    context,
                })
            })
            .collect()
    }

    /// Rendered findings, deduplicated and capped, separated by blank lines.
    pub fn analyze(&self, text: &str) -> Option<String> {
        let mut seen = HashSet::new();
        let rendered: Vec<String> = self
            .findings(text)
            .iter()
            .map(RiskFinding::render)
            .filter(|r| seen.insert(r.clone()))
            .take(MAX_FINDINGS)
            .collect();
        if rendered.is_empty() {
            None
        } else {
            Some(rendered.join("\n\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_claim_and_time_extension() {
        let text = "The Contractor shall be entitled to an extension of time of 28 days if delayed.";
        let out = RiskScanner::default().analyze(text).unwrap();
        assert!(out.contains("Risk (Time extension risk): "));
        assert!(out.contains("Risk (Claim entitlement): "));
        // table order: time extension comes before claims
        assert!(out.find("Time extension").unwrap() < out.find("Claim entitlement").unwrap());
        assert!(out.contains("\n\n"));
    }

    #[test]
    fn no_keywords() {
        assert_eq!(RiskScanner::default().analyze("The Engineer shall inspect the Works."), None);
    }

    #[test]
    fn context_is_limited() {
        let pad = "x".repeat(300);
        let text = format!("{pad} the Employer shall pay the sum {pad}");
        let findings = RiskScanner::default().findings(&text);
        assert_eq!(findings.len(), 1);
        let f = &findings[0];
        assert_eq!(f.category, "Payment obligation");
        assert!(f.context.chars().count() <= SNIPPET_CHARS);
        assert!(f.context.contains("Employer shall pay"));
        assert!(f.render().ends_with("..."));
    }

    #[test]
    fn matches_across_line_breaks_in_context() {
        let text = "Sub-Clause 17.1\nThe Contractor shall\nindemnify the Employer.";
        let findings = RiskScanner::default().findings(text);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].context.starts_with("Sub-Clause 17.1\n"));
    }

    #[test]
    fn capped_at_five() {
        let text = RISK_KEYWORDS
            .iter()
            .map(|(k, _)| format!("Clause text: {k}."))
            .collect::<Vec<_>>()
            .join(" ");
        let out = RiskScanner::default().analyze(&text).unwrap();
        assert_eq!(out.split("\n\n").count(), MAX_FINDINGS);
    }

    #[test]
    fn identical_renderings_collapse() {
        let text = "indemnity";
        let scanner = RiskScanner::new(&[("indemnity", "Indemnity"), ("indemnity", "Indemnity")]).unwrap();
        let out = scanner.analyze(text).unwrap();
        assert_eq!(out, "Risk (Indemnity): indemnity...");
    }
}
