//! Document text extraction.
//!
//! Extraction never fails the pipeline: `extract_text` degrades to an empty
//! string and logs a warning, handing the failure back only so the caller can
//! annotate the document's result with it.

use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Could not parse PDF: {0}")]
    Pdf(String),

    #[error("PDF parser aborted on malformed input")]
    ParserPanic,

    #[error("Document is not valid UTF-8 text")]
    InvalidUtf8,
}

/// Turns raw document bytes into plain text.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// Sequential page-order text extraction from PDF bytes, one page per line block.
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        // pdf-extract panics on some malformed streams instead of returning Err.
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(bytes)
        }))
        .map_err(|_| ExtractionError::ParserPanic)?;

        let pages = result.map_err(|e| ExtractionError::Pdf(e.to_string()))?;
        Ok(join_pages(&pages))
    }
}

/// Uploads that are already plain text (`text/plain`, `.txt`).
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let text = std::str::from_utf8(bytes).map_err(|_| ExtractionError::InvalidUtf8)?;
        Ok(text.trim().to_string())
    }
}

/// Picks the extractor for an upload from its declared content type, then its extension.
pub fn extractor_for(file_name: &str, content_type: Option<&str>) -> &'static dyn TextExtractor {
    let is_text = match content_type {
        Some(ct) if ct.starts_with("text/plain") => true,
        Some(ct) if ct == "application/pdf" => false,
        _ => file_name.to_ascii_lowercase().ends_with(".txt"),
    };
    if is_text {
        &PlainTextExtractor
    } else {
        &PdfTextExtractor
    }
}

/// Fail-soft extraction: any failure yields an empty string plus a warning.
pub fn extract_text(
    extractor: &dyn TextExtractor,
    file_name: &str,
    bytes: &[u8],
) -> (String, Option<ExtractionError>) {
    match extractor.extract(bytes) {
        Ok(text) => (text, None),
        Err(e) => {
            warn!(file_name, error = %e, "Text extraction failed; continuing with empty text");
            (String::new(), Some(e))
        }
    }
}

/// Trims each page and joins them with a newline; blank pages are dropped.
fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .map(|page| join_lines(page))
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collapses one page's output to newline-separated, trimmed text.
fn join_lines(raw: &str) -> String {
    raw.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_text_in_page_order() {
        let bytes = fixtures::pdf_with_pages(&["Senior Rust engineer", "Kubernetes and Docker"]);
        let text = PdfTextExtractor.extract(&bytes).unwrap();
        assert_eq!(text, "Senior Rust engineer\nKubernetes and Docker");
    }

    #[test]
    fn test_skills_on_adjacent_pages_stay_separate() {
        use crate::screening::skills::detect_skills;
        use crate::screening::vocabulary::SkillVocabulary;

        let bytes = fixtures::pdf_with_pages(&["Python", "Docker"]);
        let text = PdfTextExtractor.extract(&bytes).unwrap();
        assert_eq!(text, "Python\nDocker");

        let vocabulary = SkillVocabulary::builtin().unwrap();
        let skills = detect_skills(&text, &vocabulary);
        assert!(skills.contains(&"Python".to_string()));
        assert!(skills.contains(&"Docker".to_string()));
    }

    #[test]
    fn test_join_pages_separates_and_trims() {
        let pages = vec![
            "\n\nRust engineer".to_string(),
            "  \n".to_string(),
            "\n\nKubernetes".to_string(),
        ];
        assert_eq!(join_pages(&pages), "Rust engineer\nKubernetes");
    }

    #[test]
    fn test_garbage_bytes_fail_soft() {
        let (text, failure) = extract_text(&PdfTextExtractor, "broken.pdf", b"this is not a pdf at all");
        assert_eq!(text, "");
        assert!(failure.is_some());
    }

    #[test]
    fn test_garbage_bytes_report_error() {
        assert!(PdfTextExtractor.extract(b"%PDF-1.4 truncated").is_err());
    }

    #[test]
    fn test_empty_input_fails_soft() {
        assert_eq!(extract_text(&PdfTextExtractor, "empty.pdf", &[]).0, "");
    }

    #[test]
    fn test_plain_text_trimmed() {
        let text = PlainTextExtractor.extract(b"  Python and SQL\n\n").unwrap();
        assert_eq!(text, "Python and SQL");
    }

    #[test]
    fn test_plain_text_rejects_invalid_utf8() {
        assert!(matches!(
            PlainTextExtractor.extract(&[0xff, 0xfe, 0x00]),
            Err(ExtractionError::InvalidUtf8)
        ));
    }

    #[test]
    fn test_extractor_selection() {
        let sample = b"Rust";
        // Plain text extractor succeeds on UTF-8; the PDF extractor cannot.
        assert!(extractor_for("cv.txt", None).extract(sample).is_ok());
        assert!(extractor_for("cv.bin", Some("text/plain; charset=utf-8")).extract(sample).is_ok());
        assert!(extractor_for("cv.txt", Some("application/pdf")).extract(sample).is_err());
        assert!(extractor_for("cv.pdf", None).extract(sample).is_err());
    }

    #[test]
    fn test_join_lines_trims() {
        assert_eq!(join_lines("\n\n  a  \nb\n\n"), "a\nb");
    }
}
