// Repository trait for the persisted series snapshot
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Persisted data is unreadable; callers treat this as "no prior data".
    #[error("snapshot parse failure at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("snapshot I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

impl SnapshotError {
    pub fn parse(line: usize, reason: impl Into<String>) -> Self {
        SnapshotError::Parse {
            line,
            reason: reason.into(),
        }
    }
}

/// Durable slot holding the encoded snapshot. The store is its only reader and writer.
pub trait SnapshotRepository: Send + Sync {
    /// Read the stored snapshot; `Ok(None)` when nothing has been persisted yet.
    fn read(&self) -> Result<Option<String>, SnapshotError>;

    /// Replace the stored snapshot. A subsequent `read` never observes a partial write.
    fn write(&self, contents: &str) -> Result<(), SnapshotError>;
}
