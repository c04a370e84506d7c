//! Files offered for submission and their local checks.

use std::path::Path;

use thiserror::Error;

use crate::config::UploadLimits;

/// Reasons a file is refused before any network call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please select a file with a name")]
    MissingName,

    #[error("Please select a {expected} file (got '{file_name}')")]
    WrongExtension { file_name: String, expected: String },

    #[error("File '{0}' is empty")]
    Empty(String),

    #[error("File size must be at most {max_bytes} bytes (got {size} bytes)")]
    TooLarge { size: u64, max_bytes: u64 },
}

/// A file selected for upload, held in memory.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    file_name: String,
    bytes: Vec<u8>,
}

impl std::fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadFile")
            .field("file_name", &self.file_name)
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads a file from disk, keeping only its final path component as name.
    pub async fn read(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(Self { file_name, bytes })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// MIME type guessed from the file name.
    pub fn mime_type(&self) -> String {
        mime_guess::from_path(&self.file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    }

    /// Checks name, extension, emptiness and size against `limits`.
    pub fn validate(&self, limits: &UploadLimits) -> Result<(), ValidationError> {
        if self.file_name.trim().is_empty() {
            return Err(ValidationError::MissingName);
        }

        if !self.file_name.ends_with(&limits.extension) {
            return Err(ValidationError::WrongExtension {
                file_name: self.file_name.clone(),
                expected: limits.extension.clone(),
            });
        }

        if self.bytes.is_empty() {
            return Err(ValidationError::Empty(self.file_name.clone()));
        }

        if self.size() > limits.max_bytes {
            return Err(ValidationError::TooLarge {
                size: self.size(),
                max_bytes: limits.max_bytes,
            });
        }

        Ok(())
    }
}
