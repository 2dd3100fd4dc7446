//! Best-effort PDF text extraction.

use std::path::Path;

use tracing::warn;

/// Extracts plain text from a PDF on disk, trimmed of surrounding whitespace.
///
/// Never fails to the caller: a corrupt, encrypted, or image-only file yields
/// an empty string, which the intake pipeline treats as "not analyzable".
pub fn extract_text(path: &Path) -> String {
    match pdf_extract::extract_text(path) {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            warn!(file = %path.display(), "PDF text extraction failed: {e}");
            String::new()
        }
    }
}
