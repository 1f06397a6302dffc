//! Version history graph for Facet components.
//!
//! Versions point at their parents by [`Ref`](facet_types::Ref). This crate
//! walks those links through a [`VersionSource`] (store, incoming batch, or
//! both), builds an indexed [`VersionGraph`], and answers the questions the
//! merge engine asks: which refs belong to a component's history, whether
//! one head is an ancestor of another, and how two heads diverge.

pub mod diverge;
pub mod error;
pub mod graph;
pub mod traverse;

pub use diverge::DivergeData;
pub use error::{DagError, DagResult};
pub use graph::VersionGraph;
pub use traverse::{
    all_version_hashes, collect_versions_info, load_graph, VersionInfo, VersionSource,
};
