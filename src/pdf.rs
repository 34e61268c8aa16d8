//! PDF text extraction for uploaded résumés.
//!
//! Extraction is best-effort at the page level: a page that fails to yield
//! text is logged and skipped, and the document only fails as a whole when
//! it cannot be parsed at all or no page produced any text.

use crate::errors::AppError;
use lopdf::Document;

/// Extracts the text content from PDF file bytes.
///
/// Pages are concatenated with newline separators and the result is trimmed.
///
/// # Arguments
///
/// * `file_bytes` - Raw bytes of the uploaded PDF file.
///
/// # Returns
///
/// * `Result<String, AppError>` - The extracted text, `InvalidDocument` if the
///   bytes are not a parseable PDF or the PDF has no pages, `EmptyContent` if
///   no page yielded any text.
pub fn extract_text(file_bytes: &[u8]) -> Result<String, AppError> {
    let doc = Document::load_mem(file_bytes)
        .map_err(|e| AppError::InvalidDocument(format!("failed to parse PDF: {}", e)))?;

    let pages = doc.get_pages();
    if pages.is_empty() {
        return Err(AppError::InvalidDocument(
            "PDF file contains no pages".to_string(),
        ));
    }

    let mut extracted_text = String::new();
    for (page_num, _page_id) in pages {
        match doc.extract_text(&[page_num]) {
            Ok(page_text) => {
                if !page_text.trim().is_empty() {
                    extracted_text.push_str(&page_text);
                    extracted_text.push('\n');
                }
            }
            Err(e) => {
                // Best-effort: skip unreadable pages, fail only if the whole
                // document yields nothing.
                tracing::warn!("Could not extract text from page {}: {}", page_num, e);
                continue;
            }
        }
    }

    let extracted_text = extracted_text.trim().to_string();

    if extracted_text.is_empty() {
        return Err(AppError::EmptyContent(
            "no text could be extracted from the PDF".to_string(),
        ));
    }

    Ok(extracted_text)
}

/// Validates whether the provided bytes represent a readable PDF file.
///
/// # Arguments
///
/// * `file_bytes` - Raw bytes to validate.
///
/// # Returns
///
/// * `bool` - True iff the bytes parse as a PDF with at least one page.
pub fn is_valid_pdf(file_bytes: &[u8]) -> bool {
    match Document::load_mem(file_bytes) {
        Ok(doc) => !doc.get_pages().is_empty(),
        Err(_) => false,
    }
}
