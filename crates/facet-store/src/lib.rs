//! Object model and storage for a Facet component scope.
//!
//! A scope holds five kinds of objects, all addressed by a [`Ref`]:
//!
//! - [`Source`] -- raw file contents, addressed by content hash
//! - [`Version`] -- immutable history node, addressed by the ref sealed at
//!   creation from its canonical content
//! - [`ModelComponent`] -- mutable per-component pointer (tags, head)
//! - [`Symlink`] -- immutable alias from a renamed component identity
//! - [`Lane`] -- mutable per-lane pointer (component heads)
//!
//! Pointer objects live at the hash of their identity and are rewritten
//! wholesale. [`ScopeObject`] is the tagged union the rest of the system
//! dispatches on.
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//! - [`FsObjectStore`] -- one zstd-compressed, CRC-checked file per object
//!
//! Mutations are staged in a [`WriteBatch`] and only reach a backend when
//! the owner persists the batch.
//!
//! [`Ref`]: facet_types::Ref

pub mod component;
pub mod error;
pub mod fs;
pub mod lane;
pub mod memory;
pub mod object;
pub mod source;
pub mod staging;
pub mod symlink;
pub mod traits;
pub mod unmerged;
pub mod version;

// Re-export primary types at crate root for ergonomic imports.
pub use component::ModelComponent;
pub use error::{StoreError, StoreResult};
pub use fs::{FsObjectStore, DEFAULT_COMPRESSION_LEVEL};
pub use lane::{Lane, LaneComponent};
pub use memory::InMemoryObjectStore;
pub use object::{ObjectKind, ScopeObject, StoredObject};
pub use source::Source;
pub use staging::{Staged, WriteBatch};
pub use symlink::Symlink;
pub use traits::ObjectStore;
pub use unmerged::{UnmergedComponents, UnmergedEntry};
pub use version::{BuildStatus, DependencyRecord, FileRef, Log, RelativePath, Version};
