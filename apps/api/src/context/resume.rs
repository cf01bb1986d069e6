//! PDF resume text extraction.

use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ResumeError {
    #[error("Resume must be a PDF file")]
    NotPdf,

    #[error("Could not read text from the PDF: {0}")]
    Extraction(String),

    #[error("No readable text found in the PDF")]
    NoText,

    #[error("Extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Accepts `application/pdf` uploads, or any upload whose name ends in `.pdf`.
pub fn is_pdf(content_type: Option<&str>, file_name: Option<&str>) -> bool {
    let by_type = content_type
        .map(|ct| ct.trim().eq_ignore_ascii_case("application/pdf"))
        .unwrap_or(false);
    let by_name = file_name
        .map(|name| name.trim().to_ascii_lowercase().ends_with(".pdf"))
        .unwrap_or(false);
    by_type || by_name
}

/// Collapses runs of whitespace within a line and drops blank lines.
pub fn normalize_whitespace(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Extracts normalised text from PDF bytes on a blocking thread.
pub async fn extract_resume_text(bytes: Vec<u8>) -> Result<String, ResumeError> {
    let size = bytes.len();
    let raw = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| {
            // The parser panics on some malformed files; that is still a bad upload.
            if e.is_panic() {
                warn!("PDF parser panicked on {size} bytes");
                ResumeError::Extraction("unreadable PDF".to_string())
            } else {
                ResumeError::Task(e)
            }
        })?
        .map_err(|e| {
            warn!("PDF extraction failed ({size} bytes): {e}");
            ResumeError::Extraction(e.to_string())
        })?;

    let text = normalize_whitespace(&raw);
    if text.is_empty() {
        return Err(ResumeError::NoText);
    }
    info!("Extracted {} chars of resume text from {size} bytes", text.len());
    Ok(text)
}

/// Builds a one-page PDF that shows `text` in Helvetica. Byte offsets in the
/// cross-reference table are computed, so the file parses without repair.
#[cfg(test)]
pub(crate) fn single_page_pdf(text: &str) -> Vec<u8> {
    let content = format!("BT /F1 18 Tf 72 720 Td ({text}) Tj ET");
    let objects = [
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
        "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R \
         /Resources << /Font << /F1 5 0 R >> >> >>"
            .to_string(),
        format!(
            "<< /Length {} >>\nstream\n{content}\nendstream",
            content.len()
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
    ];

    let mut pdf = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.push_str(&format!("{} 0 obj\n{body}\nendobj\n", i + 1));
    }
    let xref_at = pdf.len();
    pdf.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
    for offset in offsets {
        pdf.push_str(&format!("{offset:010} 00000 n \n"));
    }
    pdf.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_at}\n%%EOF\n",
        objects.len() + 1
    ));
    pdf.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_detection() {
        assert!(is_pdf(Some("application/pdf"), None));
        assert!(is_pdf(Some("application/octet-stream"), Some("Resume.PDF")));
        assert!(!is_pdf(Some("text/plain"), Some("resume.txt")));
        assert!(!is_pdf(None, None));
    }

    #[test]
    fn test_normalize_whitespace() {
        let raw = "  Jane   Doe \n\n\n Senior\tEngineer  \n   \n";
        assert_eq!(normalize_whitespace(raw), "Jane Doe\nSenior Engineer");
    }

    #[tokio::test]
    async fn test_extracts_text_from_pdf() {
        let text = extract_resume_text(single_page_pdf("Jane Doe Staff Engineer"))
            .await
            .unwrap();
        let compact: String = text.split_whitespace().collect();
        assert!(compact.contains("JaneDoeStaffEngineer"), "{text}");
    }

    #[tokio::test]
    async fn test_garbage_bytes_fail_extraction() {
        let err = extract_resume_text(b"definitely not a pdf".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, ResumeError::Extraction(_)));
    }
}
