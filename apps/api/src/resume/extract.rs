use bytes::Bytes;
use tracing::{debug, warn};

use crate::errors::AppError;

/// Extracts plain text from an uploaded PDF.
/// Parsing is CPU-bound, so it runs on the blocking pool.
pub async fn extract_text(pdf: Bytes) -> Result<String, AppError> {
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&pdf))
        .await
        .map_err(|e| {
            // pdf-extract panics on some malformed documents instead of returning Err.
            if e.is_panic() {
                warn!("PDF extraction panicked on malformed document");
                AppError::UnprocessableEntity("Could not read PDF".to_string())
            } else {
                AppError::Internal(anyhow::anyhow!("PDF extraction task cancelled: {e}"))
            }
        })?
        .map_err(|e| AppError::UnprocessableEntity(format!("Could not read PDF: {e}")))?;

    let text = normalize_whitespace(&text);
    if text.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "No text could be extracted from the PDF".to_string(),
        ));
    }

    debug!(chars = text.len(), "Extracted resume text");
    Ok(text)
}

/// Collapses runs of spaces and blank lines left behind by PDF layout.
fn normalize_whitespace(text: &str) -> String {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Readers accept leading junk as long as the header is in the first KiB.
const PDF_HEADER_WINDOW: usize = 1024;

/// Cheap magic-number check so obviously wrong files fail before parsing.
pub fn looks_like_pdf(data: &[u8]) -> bool {
    let window = &data[..data.len().min(PDF_HEADER_WINDOW)];
    window.windows(5).any(|w| w == b"%PDF-")
}
