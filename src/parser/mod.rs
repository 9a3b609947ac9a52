pub mod classify;
pub mod extract;
pub mod normalize;
pub mod segments;
pub mod title;

use rusqlite::Connection;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::Settings;
use crate::db::{self, Clause, ClauseRow};
use crate::error::ProcessError;
use crate::source::ExtractionResult;
use extract::ClauseAnalyzer;

/// Outcome of processing one document.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessReport {
    pub count: usize,
    pub clauses: Vec<Clause>,
}

/// Extraction result → fragments → analyzed clause rows.
///
/// Holds only read-only tables, so one pipeline can be shared across threads.
pub struct Pipeline {
    pub analyzer: ClauseAnalyzer,
    pub min_document_chars: usize,
    pub min_clause_chars: usize,
    pub max_title_chars: usize,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl Pipeline {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            analyzer: ClauseAnalyzer::default(),
            min_document_chars: settings.min_document_chars,
            min_clause_chars: settings.min_clause_chars,
            max_title_chars: settings.max_title_chars,
        }
    }

    /// Analyze a document without touching storage.
    pub fn analyze_document(&self, extraction: &ExtractionResult) -> Result<Vec<ClauseRow>, ProcessError> {
        let chars = extraction.original_text.trim().chars().count();
        if chars < self.min_document_chars {
            return Err(ProcessError::InsufficientText {
                chars,
                min: self.min_document_chars,
            });
        }

        let text = extraction.text_for_segmentation();
        let fragments = segments::segment_clauses(&text, self.max_title_chars);
        if fragments.is_empty() {
            return Err(ProcessError::NoClauses);
        }
        info!(fragments = fragments.len(), ocr = extraction.ocr_used, "Segmented document");

        let rows: Vec<ClauseRow> = fragments
            .iter()
            .filter(|f| {
                let len = f.text().trim().chars().count();
                if len < self.min_clause_chars {
                    debug!(number = ?f.number, len, "Skipping noise fragment");
                    return false;
                }
                true
            })
            .map(|f| self.analyzer.analyze(f, extraction.ocr_used, self.max_title_chars))
            .collect();

        Ok(rows)
    }

    /// Analyze and persist one document. Nothing is written when analysis
    /// fails.
    pub fn process(&self, conn: &Connection, extraction: &ExtractionResult) -> Result<ProcessReport, ProcessError> {
        let rows = self.analyze_document(extraction)?;
        let clauses = db::save_clauses(conn, &rows)?;
        info!(saved = clauses.len(), "Saved clauses");
        Ok(ProcessReport {
            count: clauses.len(),
            clauses,
        })
    }
}

// ── Tests ──
