//! Error types for version-graph operations.

use facet_store::StoreError;
use facet_types::Ref;

/// Errors that can occur while walking a version history.
#[derive(Debug, thiserror::Error)]
pub enum DagError {
    /// A version referenced by the history could not be loaded.
    #[error("version object {0} is missing")]
    VersionNotFound(Ref),

    /// A cycle was detected, which violates the DAG invariant.
    #[error("cycle detected involving version {0}")]
    CycleDetected(Ref),

    /// The underlying store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Convenience alias for DAG results.
pub type DagResult<T> = Result<T, DagError>;
