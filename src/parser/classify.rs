use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const GENERAL_KEYWORDS: &[&str] = &[
    "general condition",
    "standard form",
    "standard contract",
    "default provision",
    "unless otherwise",
    "subject to",
];

pub const PARTICULAR_KEYWORDS: &[&str] = &[
    "particular condition",
    "special condition",
    "specific to",
    "this contract",
    "project specific",
    "as amended",
];

/// Which part of the contract a clause belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClauseType {
    #[serde(rename = "General Condition")]
    General,
    #[serde(rename = "Particular Condition")]
    Particular,
    Unknown,
}

impl ClauseType {
    /// Storage / display form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "General Condition",
            Self::Particular => "Particular Condition",
            Self::Unknown => "Unknown",
        }
    }

    pub const ALL: [ClauseType; 3] = [Self::General, Self::Particular, Self::Unknown];
}

impl fmt::Display for ClauseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownClauseType(pub String);

impl fmt::Display for UnknownClauseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown clause type: {}", self.0)
    }
}

impl std::error::Error for UnknownClauseType {}

impl FromStr for ClauseType {
    type Err = UnknownClauseType;

    /// Accepts the storage form plus the short aliases used on the command line.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "general condition" | "general" => Ok(Self::General),
            "particular condition" | "particular" => Ok(Self::Particular),
            "unknown" => Ok(Self::Unknown),
            _ => Err(UnknownClauseType(s.to_string())),
        }
    }
}

/// Keyword cascade deciding General vs Particular.
///
/// Section name wins over title, title wins over body keyword counts.
#[derive(Debug, Clone)]
pub struct ClauseClassifier {
    general: Vec<String>,
    particular: Vec<String>,
}

impl Default for ClauseClassifier {
    fn default() -> Self {
        Self::new(GENERAL_KEYWORDS, PARTICULAR_KEYWORDS)
    }
}

impl ClauseClassifier {
    pub fn new(general: &[&str], particular: &[&str]) -> Self {
        Self {
            general: general.iter().map(|k| k.to_lowercase()).collect(),
            particular: particular.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    pub fn classify(&self, body: &str, section: Option<&str>, title: Option<&str>) -> ClauseType {
        if let Some(section) = section {
            let section = section.to_lowercase();
            if section.contains("general condition") && !section.contains("particular") {
                return ClauseType::General;
            }
            if section.contains("particular condition") || section.contains("special condition") {
                return ClauseType::Particular;
            }
        }

        if let Some(title) = title {
            let title = title.to_lowercase();
            if self.general.iter().any(|k| title.contains(k.as_str())) {
                return ClauseType::General;
            }
            if self.particular.iter().any(|k| title.contains(k.as_str())) {
                return ClauseType::Particular;
            }
        }

        let body = body.to_lowercase();
        let general = count_hits(&self.general, &body);
        let particular = count_hits(&self.particular, &body);

        if particular > general && particular > 0 {
            ClauseType::Particular
        } else if general > 0 {
            ClauseType::General
        } else {
            ClauseType::Unknown
        }
    }
}

/// Number of distinct keywords present, not number of occurrences.
fn count_hits(keywords: &[String], text: &str) -> usize {
    keywords.iter().filter(|k| text.contains(k.as_str())).count()
}
