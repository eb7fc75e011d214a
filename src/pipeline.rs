//! Generation Pipeline - Single Entry Points
//!
//! Each generator runs: validate -> render -> write -> hash.
//! The poster pipeline ALWAYS validates its configuration first.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use thiserror::Error;
use tracing::{info, warn};

use crate::canvas::CanvasError;
use crate::fonts::FontSet;
use crate::hashing::sha256_hex;
use crate::layout::{LayoutEngine, PageGeometry};
use crate::pdf::{write_pdf, DocInfo, PdfError};
use crate::poster::{Poster, PosterConfig};
use crate::report::{ReportBuilder, ReportData};
use crate::styles::Stylesheet;
use crate::validation::{ValidationResult, Validator};
use crate::ENGINE_VERSION;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid report data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Render error: {0}")]
    Render(#[from] CanvasError),

    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),
}

/// Record of a written output file
#[derive(Debug, Clone)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub bytes: usize,
    pub sha256: String,
    /// Page count for documents, absent for images
    pub pages: Option<usize>,
}

pub fn validate_poster(config: &PosterConfig) -> ValidationResult {
    Validator::new().validate(config)
}

/// Render the poster and write it to `config.output_path`
pub fn render_poster(config: &PosterConfig) -> Result<GeneratedFile, PipelineError> {
    // MANDATORY: an invalid canvas never reaches the renderer
    let validation = validate_poster(config);
    for w in validation.warnings() {
        warn!(rule = %w.rule, actual = ?w.actual, "{}", w.message);
    }
    if !validation.valid {
        return Err(PipelineError::ValidationFailed(validation.error_summary()));
    }

    let poster = Poster::new(config.clone());
    let image = poster.render()?;
    let png = image.encode_png(config.print.dpi)?;

    write_output(&config.output_path, &png, None)
}

pub fn load_report_data(path: &Path) -> Result<ReportData, PipelineError> {
    let content = fs::read_to_string(path).map_err(|source| PipelineError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}

/// Lay out the report and serialize it; returns the PDF bytes and page count
pub fn build_report_pdf(
    data: &ReportData,
    fonts: &FontSet,
    now: DateTime<Local>,
) -> Result<(Vec<u8>, usize), PipelineError> {
    let styles = Stylesheet::new();
    let story = ReportBuilder::build(data, &styles, now);

    let engine = LayoutEngine::new(fonts);
    let pages = engine.layout(&story);

    let info = DocInfo {
        title: data.question.clone(),
        creator: format!("inkforge-report {}", ENGINE_VERSION),
        created: now,
    };
    let bytes = write_pdf(&pages, fonts, PageGeometry::A4, &info)?;
    Ok((bytes, pages.len()))
}

/// Render the report to `data.output_path` (default `research_report.pdf`)
pub fn render_report(data: &ReportData, fonts: &FontSet) -> Result<GeneratedFile, PipelineError> {
    let (bytes, pages) = build_report_pdf(data, fonts, Local::now())?;
    write_output(Path::new(data.output_path()), &bytes, Some(pages))
}

fn write_output(path: &Path, bytes: &[u8], pages: Option<usize>) -> Result<GeneratedFile, PipelineError> {
    fs::write(path, bytes).map_err(|source| PipelineError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    let file = GeneratedFile {
        path: path.to_path_buf(),
        bytes: bytes.len(),
        sha256: sha256_hex(bytes),
        pages,
    };
    info!(path = %file.path.display(), bytes = file.bytes, sha256 = %file.sha256, "Output written");
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poster::FontSource;

    #[test]
    fn test_invalid_poster_never_renders() {
        let dir = tempfile::tempdir().unwrap();
        let config = PosterConfig {
            width: 100,
            height: 75,
            output_path: dir.path().join("tiny.png"),
            font: FontSource::Builtin,
            seed: Some(1),
            ..PosterConfig::default()
        };
        let err = render_poster(&config).unwrap_err();
        assert!(err.to_string().contains("Validation failed"));
        assert!(!config.output_path.exists());
    }

    #[test]
    fn test_missing_report_file() {
        let err = load_report_data(Path::new("/nonexistent/data.json")).unwrap_err();
        assert!(matches!(err, PipelineError::Read { .. }));
    }

    #[test]
    fn test_unwritable_output() {
        let err = write_output(Path::new("/nonexistent/dir/out.pdf"), b"x", None).unwrap_err();
        assert!(err.to_string().starts_with("Failed to write"));
    }
}
