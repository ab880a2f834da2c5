//! Raw text extraction from statement PDFs

use std::path::Path;

use anyhow::{Result, anyhow};

/// Pull the full text out of a PDF. Extraction failures abort the whole
/// upload; there is nothing per-record to salvage at this stage.
pub fn extract_pdf_text(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    pdf_extract::extract_text(path)
        .map_err(|e| anyhow!("extracting text from {}: {e}", path.display()))
}
