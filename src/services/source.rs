use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Where the recipe dataset comes from
///
/// The loader only needs the raw bytes; parsing and derivation happen in
/// [`crate::services::loader`]. Keeping the read behind a trait lets tests
/// simulate missing or unreadable sources.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait DatasetSource: Send + Sync {
    /// Reads the whole dataset, failing with `DataUnavailable` if it cannot be read
    async fn read(&self) -> AppResult<Vec<u8>>;

    /// Human-readable location for logging
    fn describe(&self) -> String;
}

/// Dataset stored in a local CSV file
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl DatasetSource for FileSource {
    async fn read(&self) -> AppResult<Vec<u8>> {
        tokio::fs::read(&self.path).await.map_err(|e| {
            AppError::DataUnavailable(format!(
                "data file not found or unreadable at {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
