use std::collections::HashSet;
use std::fmt;

use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeKind {
    Duration,
    Deadline,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Days,
    Weeks,
    Months,
    Years,
}

impl TimeUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Days => "days",
            Self::Weeks => "weeks",
            Self::Months => "months",
            Self::Years => "years",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One time expression found in a clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeFrame {
    pub raw: String,
    pub kind: TimeKind,
    pub value: Option<i64>,
    pub unit: Option<TimeUnit>,
    pub description: String,
}

const MONTHS: &str = "January|February|March|April|May|June|July|August|September|October|November|December";

/// Built-in pattern table. Order matters: it is the output order, and an
/// earlier pattern's match shadows an identical later one.
pub fn default_patterns() -> Vec<(String, TimeKind, Option<TimeUnit>)> {
    use TimeKind::*;
    use TimeUnit::*;
    vec![
        (r"\b(\d+)\s+(?:calendar\s+)?(?:business\s+)?(?:working\s+)?days?\b".into(), Duration, Some(Days)),
        (r"\b(\d+)\s+weeks?\b".into(), Duration, Some(Weeks)),
        (r"\b(\d+)\s+months?\b".into(), Duration, Some(Months)),
        (r"\b(\d+)\s+years?\b".into(), Duration, Some(Years)),
        (
            r"within\s+(\d+)\s+(?:calendar\s+)?(?:business\s+)?days?\s+(?:of|from|after)".into(),
            Deadline,
            Some(Days),
        ),
        (
            r"no\s+later\s+than\s+(\d+)\s+(?:calendar\s+)?(?:business\s+)?days?\s+(?:of|from|after|before)".into(),
            Deadline,
            Some(Days),
        ),
        (
            r"at\s+least\s+(\d+)\s+(?:calendar\s+)?(?:business\s+)?days?\s+before".into(),
            Deadline,
            Some(Days),
        ),
        (r"\b(\d{1,2}[\s/-]\d{1,2}[\s/-]\d{2,4})\b".into(), Date, None),
        (format!(r"\b({MONTHS})\s+\d{{1,2}},?\s+\d{{4}}\b"), Date, None),
    ]
}

struct TimePattern {
    re: Regex,
    kind: TimeKind,
    unit: Option<TimeUnit>,
}

/// Finds durations, deadlines and dates in clause text.
pub struct TimeFrameExtractor {
    patterns: Vec<TimePattern>,
}

impl Default for TimeFrameExtractor {
    fn default() -> Self {
        Self::new(default_patterns()).expect("built-in time patterns compile")
    }
}

impl TimeFrameExtractor {
    /// Patterns are matched case-insensitively.
    pub fn new(table: Vec<(String, TimeKind, Option<TimeUnit>)>) -> Result<Self, regex::Error> {
        let patterns = table
            .into_iter()
            .map(|(pattern, kind, unit)| {
                Ok(TimePattern {
                    re: Regex::new(&format!("(?i){pattern}"))?,
                    kind,
                    unit,
                })
            })
            .collect::<Result<Vec<_>, regex::Error>>()?;
        Ok(Self { patterns })
    }

    pub fn extract(&self, text: &str) -> Vec<TimeFrame> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut frames = Vec::new();

        for p in &self.patterns {
            for caps in p.re.captures_iter(text) {
                let Some(whole) = caps.get(0) else { continue };
                let raw = whole.as_str();
                if !seen.insert(raw) {
                    continue;
                }
                // dates and month names land here too; they just don't parse
                let value = caps.get(1).and_then(|m| m.as_str().parse::<i64>().ok());
                frames.push(TimeFrame {
                    raw: raw.to_string(),
                    kind: p.kind,
                    value,
                    unit: p.unit,
                    description: describe(raw, p.kind, value, p.unit),
                });
            }
        }

        frames
    }
}

fn describe(raw: &str, kind: TimeKind, value: Option<i64>, unit: Option<TimeUnit>) -> String {
    match (kind, value, unit) {
        (TimeKind::Duration, Some(v), Some(u)) if v != 0 => {
            format!("A period of {} {} (likely for notice, reply, or action)", v, u)
        }
        (TimeKind::Duration, _, _) => format!("A duration: {}", raw),
        (TimeKind::Deadline, _, _) => format!("A deadline: {}", raw),
        (TimeKind::Date, _, _) => format!("A specific date: {}", raw),
    }
}

/// Comma-joined raw matches, or `None` when nothing was found.
pub fn join_raw(frames: &[TimeFrame]) -> Option<String> {
    if frames.is_empty() {
        return None;
    }
    Some(frames.iter().map(|f| f.raw.as_str()).collect::<Vec<_>>().join(", "))
}

pub fn format_time_frames_explanation(frames: &[TimeFrame]) -> Option<String> {
    if frames.is_empty() {
        return None;
    }
    let mut out = String::from("This clause includes the following time frames:\n");
    for f in frames {
        out.push_str(&format!("  - {}: {}\n", f.raw, f.description));
    }
    Some(out.trim().to_string())
}
