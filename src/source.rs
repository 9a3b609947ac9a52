use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::error::ExtractError;
use crate::parser::normalize::clean_ocr_text;

/// Text pulled out of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    pub original_text: String,
    pub ocr_used: bool,
}

impl ExtractionResult {
    pub fn digital(text: impl Into<String>) -> Self {
        Self {
            original_text: text.into(),
            ocr_used: false,
        }
    }

    pub fn ocr(text: impl Into<String>) -> Self {
        Self {
            original_text: text.into(),
            ocr_used: true,
        }
    }

    /// OCR output is cleaned before segmentation; digital text is used as is.
    pub fn text_for_segmentation(&self) -> String {
        if self.ocr_used {
            clean_ocr_text(&self.original_text)
        } else {
            self.original_text.clone()
        }
    }
}

pub trait TextSource: Send + Sync {
    fn extract(&self, path: &Path) -> Result<ExtractionResult, ExtractError>;
}

/// `.txt` / `.md` files, read as UTF-8.
pub struct PlainText;

impl TextSource for PlainText {
    fn extract(&self, path: &Path) -> Result<ExtractionResult, ExtractError> {
        Ok(ExtractionResult::digital(std::fs::read_to_string(path)?))
    }
}

/// Poppler for digital text, `pdftoppm` + Tesseract for scans.
pub struct Pdf {
    pub digital_text_min_chars: usize,
    pub ocr_dpi: u32,
    pub ocr_language: String,
}

impl Pdf {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            digital_text_min_chars: settings.digital_text_min_chars,
            ocr_dpi: settings.ocr_dpi,
            ocr_language: settings.ocr_language.clone(),
        }
    }

    fn digital_text(&self, path: &Path) -> Result<String, ExtractError> {
        let out = run("pdftotext", Command::new("pdftotext").arg("-layout").arg(path).arg("-"))
            .map_err(|e| match e {
                ExtractError::OcrUnavailable(msg) => ExtractError::Tool {
                    tool: "pdftotext",
                    message: msg,
                },
                other => other,
            })?;
        Ok(String::from_utf8_lossy(&out.stdout).into_owned())
    }

    fn ocr_text(&self, path: &Path) -> Result<String, ExtractError> {
        let dir = tempfile::tempdir()?;
        let prefix = dir.path().join("page");
        run(
            "pdftoppm",
            Command::new("pdftoppm")
                .arg("-r")
                .arg(self.ocr_dpi.to_string())
                .arg("-png")
                .arg(path)
                .arg(&prefix),
        )?;

        let pages = rendered_pages(dir.path())?;
        debug!(pages = pages.len(), "Rendered pages for OCR");

        let mut text = String::new();
        for page in &pages {
            let out = run(
                "tesseract",
                Command::new("tesseract")
                    .arg(page)
                    .arg("stdout")
                    .arg("-l")
                    .arg(&self.ocr_language),
            )?;
            text.push_str(&String::from_utf8_lossy(&out.stdout));
            text.push('\n');
        }
        Ok(text)
    }
}

impl TextSource for Pdf {
    fn extract(&self, path: &Path) -> Result<ExtractionResult, ExtractError> {
        let text = self.digital_text(path)?;
        let chars = text.trim().chars().count();
        if chars > self.digital_text_min_chars {
            return Ok(ExtractionResult::digital(text));
        }

        info!(path = %path.display(), chars, "Little digital text, falling back to OCR");
        match self.ocr_text(path) {
            Ok(ocr) => Ok(ExtractionResult::ocr(ocr)),
            Err(ExtractError::OcrUnavailable(msg)) if chars > 0 => {
                warn!(%msg, "OCR unavailable, keeping digital text");
                Ok(ExtractionResult::digital(text))
            }
            Err(e) => Err(e),
        }
    }
}

/// Picks a source by file extension.
pub struct DocumentSource {
    plain: PlainText,
    pdf: Pdf,
}

impl DocumentSource {
    pub fn new(settings: &Settings) -> Self {
        Self {
            plain: PlainText,
            pdf: Pdf::from_settings(settings),
        }
    }
}

impl TextSource for DocumentSource {
    fn extract(&self, path: &Path) -> Result<ExtractionResult, ExtractError> {
        if !path.exists() {
            return Err(ExtractError::FileNotFound(path.to_path_buf()));
        }
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "txt" | "md" => self.plain.extract(path),
            "pdf" => self.pdf.extract(path),
            _ => Err(ExtractError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Runs an external tool; a missing binary maps to `OcrUnavailable`.
fn run(tool: &'static str, cmd: &mut Command) -> Result<Output, ExtractError> {
    let out = cmd.output().map_err(|e| match e.kind() {
        ErrorKind::NotFound => ExtractError::OcrUnavailable(format!("{tool} is not installed")),
        _ => ExtractError::Io(e),
    })?;
    if !out.status.success() {
        return Err(ExtractError::Tool {
            tool,
            message: String::from_utf8_lossy(&out.stderr).trim().to_string(),
        });
    }
    Ok(out)
}

fn rendered_pages(dir: &Path) -> Result<Vec<PathBuf>, ExtractError> {
    let mut pages: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|e| e == "png"))
        .collect();
    // pdftoppm zero-pads page numbers, so name order is page order
    pages.sort();
    Ok(pages)
}
