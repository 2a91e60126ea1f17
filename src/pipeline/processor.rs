//! Pipeline orchestration: one upload in, one `Screening` out.

use std::sync::Arc;
use std::time::Duration;

use crate::catalog::ReferenceCatalog;
use crate::models::Screening;

use super::classify::classify_value;
use super::staging::StagedUpload;
use super::summary::summarize;
use super::values::{text_preview, ValueExtractor};
use super::{extract, ScreeningError};

/// Hard ceiling on document text extraction; external parsing libraries
/// can hang on malformed input.
pub const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs the four pipeline stages for each upload. Holds only read-only
/// shared state, so one instance serves all requests.
pub struct ScreeningProcessor {
    catalog: Arc<ReferenceCatalog>,
    extractor: ValueExtractor,
}

impl ScreeningProcessor {
    pub fn new(catalog: Arc<ReferenceCatalog>) -> Self {
        let extractor = ValueExtractor::new(catalog.clone());
        Self { catalog, extractor }
    }

    /// Run the full pipeline on an upload. Does not persist anything.
    pub async fn process(
        &self,
        user_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Screening, ScreeningError> {
        if user_id.trim().is_empty() {
            return Err(ScreeningError::MissingInput("user id is required".into()));
        }
        if bytes.is_empty() {
            return Err(ScreeningError::MissingInput("uploaded file is empty".into()));
        }

        tracing::info!(user_id, file_name, size = bytes.len(), "Screening started");

        // Stage 1: text extraction from the staged file, off the async
        // runtime and under a timeout. The staging guard outlives the
        // blocking task's file access and removes the file on all paths.
        let staged = StagedUpload::stage(&bytes, file_name)?;
        let staged_path = staged.path().to_path_buf();
        let declared_name = file_name.to_string();

        let text = tokio::time::timeout(
            EXTRACTION_TIMEOUT,
            tokio::task::spawn_blocking(move || {
                extract::extract_text(&staged_path, &declared_name)
            }),
        )
        .await
        .map_err(|_| ScreeningError::ExtractionTimeout)?
        .map_err(|e| ScreeningError::ExtractionFailure(format!("extraction task: {e}")))??;

        drop(staged);

        // Stage 2: value extraction
        let extracted = self.extractor.extract(&text);
        if extracted.is_empty() {
            tracing::warn!(user_id, file_name, "No lab values found in document");
            return Err(ScreeningError::NoValuesFound {
                preview: text_preview(&text),
            });
        }

        // Stage 3: classification
        let values: Vec<_> = extracted
            .iter()
            .map(|e| classify_value(&self.catalog, e))
            .collect();

        // Stage 4: summary synthesis
        let narrative = summarize(&values);

        let screening = Screening::new(
            user_id.to_string(),
            file_name.to_string(),
            values,
            narrative.summary,
            narrative.recommendations,
        );
        tracing::info!(
            user_id,
            screening_id = %screening.id,
            value_count = screening.values.len(),
            flagged = screening.flagged_count,
            "Screening complete"
        );
        Ok(screening)
    }
}
