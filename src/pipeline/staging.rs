//! Scoped staging of upload buffers.
//!
//! The upload is written to a uniquely named temporary file (millisecond
//! timestamp + sanitized original name) for the duration of extraction.
//! Removal is handled by the `NamedTempFile` drop guard, so the staged
//! file is gone on every exit path, success or failure.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

/// A staged upload on disk. Deleted when dropped.
pub struct StagedUpload {
    file: NamedTempFile,
}

impl StagedUpload {
    /// Write the upload bytes to a fresh staging file.
    pub fn stage(bytes: &[u8], file_name: &str) -> std::io::Result<Self> {
        let (stem, extension) = split_name(file_name);
        let mut file = tempfile::Builder::new()
            .prefix(&format!(
                "{}_{}",
                chrono::Utc::now().timestamp_millis(),
                sanitize(stem)
            ))
            .suffix(&format!(".{}", sanitize(extension)))
            .tempfile()?;
        file.write_all(bytes)?;
        file.flush()?;

        tracing::debug!(
            path = %file.path().display(),
            size = bytes.len(),
            "Upload staged"
        );
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

fn split_name(file_name: &str) -> (&str, &str) {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, ext),
        _ => (file_name, "bin"),
    }
}

/// Keep staged names filesystem-safe regardless of what the client sent.
fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
