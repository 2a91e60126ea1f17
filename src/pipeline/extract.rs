//! Text extraction from a staged upload.
//!
//! Digital PDFs go through `pdf-extract`; anything with an image MIME
//! type is rejected outright (no OCR, permanent limitation); every other
//! extension is read as UTF-8 text.

use std::path::Path;

use super::ScreeningError;

/// Fixed message for image uploads. Returned before any parsing happens.
pub const UNSUPPORTED_IMAGE_MESSAGE: &str =
    "Image files are not supported. Please resubmit the report as a PDF or plain-text document.";

/// File format as decided from the declared file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Pdf,
    Image,
    Text,
}

/// Decide the format from the declared file name via its MIME guess.
/// Unrecognized extensions fall back to plain text.
pub fn detect_format(file_name: &str) -> FileFormat {
    let mime = mime_guess::from_path(file_name).first_or_octet_stream();
    if mime == mime_guess::mime::APPLICATION_PDF {
        FileFormat::Pdf
    } else if mime.type_() == mime_guess::mime::IMAGE {
        FileFormat::Image
    } else {
        FileFormat::Text
    }
}

/// Extract the text body from a staged file.
///
/// Blocking: PDF parsing can take a while on large documents; callers on
/// the async path run this under `spawn_blocking` with a timeout.
pub fn extract_text(staged_path: &Path, file_name: &str) -> Result<String, ScreeningError> {
    match detect_format(file_name) {
        FileFormat::Image => {
            Err(ScreeningError::UnsupportedFormat(UNSUPPORTED_IMAGE_MESSAGE.into()))
        }
        FileFormat::Pdf => {
            tracing::debug!(file_name, "Extracting PDF text layer");
            pdf_extract::extract_text(staged_path)
                .map_err(|e| ScreeningError::ExtractionFailure(e.to_string()))
        }
        FileFormat::Text => {
            let bytes = std::fs::read(staged_path)?;
            String::from_utf8(bytes)
                .map_err(|e| ScreeningError::ExtractionFailure(format!("Invalid UTF-8: {e}")))
        }
    }
}
