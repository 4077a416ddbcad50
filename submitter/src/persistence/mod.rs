use thiserror::Error;

mod blobs;
pub use blobs::*;

mod images;
pub use images::*;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),

    #[error("{0}")]
    Backend(String),
}
