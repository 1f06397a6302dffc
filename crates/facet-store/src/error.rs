use facet_types::Ref;

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested object was not found.
    #[error("object not found: {0}")]
    NotFound(Ref),

    /// Content hash mismatch (data corruption or a mislabelled object).
    #[error("hash mismatch for {id}: expected {expected}, computed {computed}")]
    HashMismatch {
        id: Ref,
        expected: String,
        computed: String,
    },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The object data is malformed or cannot be decoded.
    #[error("corrupt object {id}: {reason}")]
    CorruptObject { id: Ref, reason: String },

    /// Attempted to write an object under the null ref.
    #[error("cannot store object with null ref")]
    NullRef,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
