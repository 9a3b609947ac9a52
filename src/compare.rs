//! Side-by-side view of General and Particular Conditions, matched by topic.

use std::collections::HashSet;

use serde::Serialize;

use crate::db::Clause;
use crate::parser::classify::ClauseType;

const TOPICS: &[(&str, &[&str])] = &[
    ("Time", &["time", "completion", "delay", "extension", "deadline"]),
    ("Payment", &["payment", "price", "cost", "expense", "compensation"]),
    ("Variations", &["variation", "change", "modification", "alteration"]),
    ("Defects", &["defect", "liability", "warranty", "guarantee"]),
    ("Claims", &["claim", "dispute", "entitlement"]),
    ("Termination", &["termination", "terminate", "cancel"]),
    ("Indemnity", &["indemnity", "indemnify"]),
];

const SEARCH_PREFIX_CHARS: usize = 500;
const SUMMARY_PREVIEW_CHARS: usize = 150;
const MAX_UNMATCHED: usize = 10;

const ONLY_GENERAL: &str = "Only General Condition exists. Review if Particular Condition needed.";
const ONLY_PARTICULAR: &str = "Only Particular Condition exists. This may add extra obligations.";
const TIME_FRAMES_DIFFER: &str = "Time frames differ from General Condition.";
const EXTRA_RISKS: &str = "Particular Condition may add extra risks for Employer.";
const SIMILAR: &str = "Similar to General Condition. Review for subtle differences.";
const UNMATCHED: &str =
    "This is a Particular Condition with no matching General Condition. Review for additional risks.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClausePreview {
    pub clause_number: Option<String>,
    pub clause_title: Option<String>,
    pub summary: Option<String>,
}

impl ClausePreview {
    fn of(clause: &Clause) -> Self {
        Self {
            clause_number: clause.row.clause_number.clone(),
            clause_title: clause.row.clause_title.clone(),
            summary: clause
                .row
                .summary
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(|s| format!("{}...", s.chars().take(SUMMARY_PREVIEW_CHARS).collect::<String>())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonEntry {
    pub topic: String,
    pub general: Option<ClausePreview>,
    pub particular: Option<ClausePreview>,
    pub comment: String,
}

/// One entry per topic that either side touches, then Particular clauses no
/// topic picked up.
pub fn compare(clauses: &[Clause]) -> Vec<ComparisonEntry> {
    let general: Vec<&Clause> = of_type(clauses, ClauseType::General);
    let particular: Vec<&Clause> = of_type(clauses, ClauseType::Particular);

    let mut entries = Vec::new();
    let mut matched: HashSet<i64> = HashSet::new();

    for (topic, keywords) in TOPICS {
        let g = find_by_keywords(&general, keywords);
        let p = find_by_keywords(&particular, keywords);
        if g.is_none() && p.is_none() {
            continue;
        }
        if let Some(p) = p {
            matched.insert(p.id);
        }
        entries.push(ComparisonEntry {
            topic: topic.to_string(),
            general: g.map(ClausePreview::of),
            particular: p.map(ClausePreview::of),
            comment: comment(g, p),
        });
    }

    for clause in particular
        .iter()
        .filter(|c| !matched.contains(&c.id))
        .take(MAX_UNMATCHED)
    {
        let topic = match (&clause.row.clause_title, &clause.row.clause_number) {
            (Some(title), _) if !title.is_empty() => title.clone(),
            (_, Some(number)) => format!("Clause {number}"),
            _ => "Unnumbered clause".to_string(),
        };
        entries.push(ComparisonEntry {
            topic,
            general: None,
            particular: Some(ClausePreview::of(clause)),
            comment: UNMATCHED.to_string(),
        });
    }

    entries
}

fn of_type(clauses: &[Clause], clause_type: ClauseType) -> Vec<&Clause> {
    clauses.iter().filter(|c| c.row.clause_type == clause_type).collect()
}

/// First clause whose title, summary or opening text mentions a keyword.
fn find_by_keywords<'a>(clauses: &[&'a Clause], keywords: &[&str]) -> Option<&'a Clause> {
    clauses.iter().copied().find(|c| {
        let haystack = format!(
            "{} {} {}",
            c.row.clause_title.as_deref().unwrap_or_default(),
            c.row.summary.as_deref().unwrap_or_default(),
            c.row.text_original.chars().take(SEARCH_PREFIX_CHARS).collect::<String>(),
        )
        .to_lowercase();
        keywords.iter().any(|k| haystack.contains(k))
    })
}

fn comment(general: Option<&Clause>, particular: Option<&Clause>) -> String {
    let (g, p) = match (general, particular) {
        (Some(_), None) => return ONLY_GENERAL.to_string(),
        (None, Some(_)) => return ONLY_PARTICULAR.to_string(),
        (None, None) => return String::new(),
        (Some(g), Some(p)) => (&g.row, &p.row),
    };

    let mut notes = Vec::new();
    let g_times = g.time_frames_raw.as_deref().unwrap_or_default();
    let p_times = p.time_frames_raw.as_deref().unwrap_or_default();
    if !p_times.is_empty() && p_times != g_times {
        notes.push(TIME_FRAMES_DIFFER);
    }
    let g_risks = g.risk_summary.as_deref().unwrap_or_default();
    let p_risks = p.risk_summary.as_deref().unwrap_or_default();
    if p_risks.chars().count() > g_risks.chars().count() {
        notes.push(EXTRA_RISKS);
    }

    if notes.is_empty() {
        SIMILAR.to_string()
    } else {
        notes.join(" ")
    }
}

// ── Tests ──
