use facet_dag::DagError;
use facet_store::StoreError;
use facet_types::{Ref, TypeError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScopeError {
    /// A symlink points at a component that has no stored object.
    #[error(
        "found a symlink object \"{symlink}\" that references a non-existent component \
         \"{target}\". to fix the issue, delete the object at \"{object_path}\""
    )]
    DanglingSymlink {
        symlink: String,
        target: String,
        object_path: String,
    },

    #[error(
        "unable to snap/tag \"{component}\", it is unmerged with conflicts. \
         please run \"{command}\""
    )]
    Unmerged { component: String, command: String },

    #[error("merge conflict on \"{component}\": versions {} differ", .versions.join(", "))]
    MergeConflict {
        component: String,
        versions: Vec<String>,
    },

    #[error("\"{component}\" needs to be updated first: the other side's head is {head}")]
    NeedsUpdate { component: String, head: Ref },

    #[error("component not found: {0}")]
    ComponentNotFound(String),

    #[error("version \"{version}\" of \"{component}\" is missing")]
    VersionObjectMissing { component: String, version: String },

    #[error("unable to remove head {version} of \"{component}\": it has {parents} parents")]
    MultipleParents {
        component: String,
        version: Ref,
        parents: usize,
    },

    #[error("unable to tag \"{component}\" as \"{tag}\" on a lane, only snaps are allowed")]
    TagOnLane { component: String, tag: String },

    #[error("\"{0}\" has no release label to snap or tag with")]
    MissingRelease(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("history error: {0}")]
    Dag(#[from] DagError),

    #[error("invalid identifier: {0}")]
    Type(#[from] TypeError),
}

pub type ScopeResult<T> = Result<T, ScopeError>;
