use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Block {position} rejected: {reason}")]
    LinkageRejected { position: i64, reason: String },
}

pub type Result<T> = std::result::Result<T, LedgerError>;
