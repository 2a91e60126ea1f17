//! The screening pipeline: text extraction → value extraction →
//! classification → summary synthesis.
//!
//! Single pass, synchronous per upload. The only inputs are the upload
//! bytes and the shared read-only reference catalog; persistence happens
//! after the pipeline and is never required for it to run.

pub mod classify;
pub mod extract;
pub mod processor;
pub mod staging;
pub mod summary;
pub mod values;

#[cfg(test)]
pub(crate) mod test_pdf;

pub use classify::*;
pub use processor::*;
pub use summary::*;
pub use values::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScreeningError {
    /// Missing file or owner id. Terminal, no retry.
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// Image upload. Terminal; the user must resubmit a text-bearing
    /// document. No OCR is performed.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Malformed or corrupt document; surfaced with the original cause.
    #[error("Text extraction failed: {0}")]
    ExtractionFailure(String),

    /// The extraction library exceeded its time budget.
    #[error("Text extraction timed out")]
    ExtractionTimeout,

    /// Extraction produced text but no measurable values. Carries a
    /// preview of the extracted text so the user can correct the upload.
    #[error("No lab values could be extracted from the document")]
    NoValuesFound { preview: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
