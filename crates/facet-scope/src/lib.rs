//! Component repository for Facet.
//!
//! [`SourceRepository`] is the entry point: it resolves components (through
//! symlinks), turns working-tree components into versions, removes versions
//! while keeping the history graph intact, and merges incoming components
//! and lanes. Every operation stages into a [`WriteBatch`];
//! [`SourceRepository::persist`] makes a batch durable.

pub mod config;
pub mod consumer;
pub mod error;
pub mod lane_merge;
pub mod merge;
pub mod paths;
pub mod remove;
pub mod repository;
pub mod snapshot;
pub mod telemetry;
pub mod types;

pub use config::{ScopeConfig, SnapshotConfig, StoreConfig, TelemetryConfig};
pub use consumer::{
    ComponentOrigin, ConsumerComponent, EmptyWorkspace, SourceFile, VersionRelease, WorkspaceEntry,
    WorkspaceMap,
};
pub use error::{ScopeError, ScopeResult};
pub use repository::{SourceRepository, UNMERGED_FILE};
pub use snapshot::{SnapshotBuilder, SnapshotParts};
pub use types::{
    ComponentDef, ComponentObjects, ComponentTree, LaneMergeResult, MergeResult, PersistReport,
};

// Re-export key types
pub use facet_store::{
    FsObjectStore, InMemoryObjectStore, Lane, ModelComponent, ObjectStore, ScopeObject, Source,
    Symlink, UnmergedEntry, Version, WriteBatch,
};
pub use facet_types::{ComponentId, LaneId, Ref};
