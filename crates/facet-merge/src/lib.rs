//! Merge decisions for Facet components and lanes.
//!
//! Everything here is synchronous and free of I/O: callers load the
//! relevant history (see `facet-dag`) and hand it in, and get back the
//! merged pointer object or a classification of what should happen.
//!
//! - [`component`] -- label conflicts, compatibility, and merging two
//!   [`ModelComponent`](facet_store::ModelComponent)s
//! - [`lane`] -- what a lane merge does with one incoming entry

pub mod component;
pub mod lane;

pub use component::{
    check_mergeable, conflicting_labels, is_compatible, merge_components, needs_update,
    ComponentMerge, Mergeability,
};
pub use lane::LaneStep;
