/// Errors that can occur in the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading a key failed.
    #[error("read of {key:?} failed: {source}")]
    ReadFailed {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing or removing a key failed.
    #[error("write of {key:?} failed: {source}")]
    WriteFailed {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The write would push the store past its size limit.
    #[error("quota exceeded writing {key:?} ({needed} bytes needed, {limit} allowed)")]
    QuotaExceeded {
        key: String,
        needed: usize,
        limit: usize,
    },

    /// The value could not be serialized before writing.
    #[error("value for {key:?} could not be encoded: {message}")]
    Encode { key: String, message: String },
}
