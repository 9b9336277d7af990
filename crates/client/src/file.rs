use std::path::{Path, PathBuf};

use receipt_engine::ReceiptRecord;

use crate::{ReceiptSource, Result, Snapshot};

/// Receipt snapshot saved as JSON, either `{"receipts": [...]}` or a bare
/// array.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReceiptSource for FileSource {
    async fn fetch_receipts(&self) -> Result<Vec<ReceiptRecord>> {
        tracing::debug!("reading receipts from {}", self.path.display());
        let content = tokio::fs::read_to_string(&self.path).await?;
        let records = serde_json::from_str::<Snapshot>(&content)?.into_records();
        tracing::info!(
            "loaded {} receipts from {}",
            records.len(),
            self.path.display()
        );
        Ok(records)
    }
}
