use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("database storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("database transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("database table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("database commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("input is empty")]
    EmptyInput,

    #[error("embedding failed: {0}")]
    Embedding(String),

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("corrupt embedding row for document {0}")]
    CorruptEmbedding(u64),

    #[error("index build error: {0}")]
    IndexBuild(String),

    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("data directory does not exist and could not be created: {0}")]
    DataDir(PathBuf),
}

impl Error {
    /// True for validation failures the caller can recover from locally
    /// (as opposed to backend failures, which must stay distinguishable
    /// from an empty result set).
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::EmptyInput | Self::InvalidParam(_))
    }

    /// True when the underlying store failed (connectivity, transaction,
    /// corruption) rather than the input being at fault.
    pub fn is_store(&self) -> bool {
        matches!(
            self,
            Self::Database(_)
                | Self::RedbStorage(_)
                | Self::RedbTransaction(_)
                | Self::RedbTable(_)
                | Self::RedbCommit(_)
                | Self::CorruptEmbedding(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_classified() {
        assert!(Error::EmptyInput.is_validation());
        assert!(Error::InvalidParam("weight".into()).is_validation());
        assert!(!Error::EmptyInput.is_store());
    }

    #[test]
    fn embedding_errors_are_neither_validation_nor_store() {
        let e = Error::Embedding("model unavailable".into());
        assert!(!e.is_validation());
        assert!(!e.is_store());
    }

    #[test]
    fn dimension_mismatch_message() {
        let e = Error::DimensionMismatch {
            expected: 256,
            actual: 128,
        };
        assert!(e.to_string().contains("256"));
        assert!(e.to_string().contains("128"));
    }
}
