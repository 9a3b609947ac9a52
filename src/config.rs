use serde::Deserialize;

/// Runtime knobs. Every field has a default; `CLAUSES_*` environment
/// variables override them (`CLAUSES_DB_PATH`, `CLAUSES_OCR_DPI`, ...).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub db_path: String,
    /// Documents shorter than this after stripping are rejected.
    pub min_document_chars: usize,
    /// Fragments shorter than this are dropped as noise.
    pub min_clause_chars: usize,
    pub max_title_chars: usize,
    /// Digital PDF text at or below this length triggers OCR.
    pub digital_text_min_chars: usize,
    pub ocr_dpi: u32,
    pub ocr_language: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: "data/contracts.sqlite".into(),
            min_document_chars: 100,
            min_clause_chars: 20,
            max_title_chars: 200,
            digital_text_min_chars: 500,
            ocr_dpi: 300,
            ocr_language: "eng".into(),
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("CLAUSES").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}
