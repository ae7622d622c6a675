//! PDF text extraction.

use crate::provider::{ProviderError, TextExtractor};

/// Returns true if the bytes start with the `%PDF-` magic.
#[must_use]
pub fn is_pdf(head: &[u8]) -> bool {
    head.starts_with(b"%PDF-")
}

/// [`TextExtractor`] backed by the `pdf-extract` crate.
///
/// `pdf-extract` panics rather than erroring on some malformed fonts and
/// streams. Such panics come back as [`ProviderError::Pdf`], but the process
/// panic hook still runs first, so the default hook prints a panic message to
/// stderr even though extraction only failed.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract_text(&self, document: &[u8]) -> Result<String, ProviderError> {
        if !is_pdf(document) {
            return Err(ProviderError::NotPdf);
        }
        let text = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(document))
            .map_err(|_| ProviderError::Pdf("parser panicked".to_string()))?
            .map_err(|e| ProviderError::Pdf(e.to_string()))?;
        log::debug!("extracted {} chars from {} byte PDF", text.len(), document.len());
        Ok(text)
    }
}
