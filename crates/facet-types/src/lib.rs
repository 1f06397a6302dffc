//! Foundation types for Facet.
//!
//! This crate provides the identity and addressing types shared by every
//! other Facet crate. Every other Facet crate depends on `facet-types`.
//!
//! # Key Types
//!
//! - [`Ref`]: Content-hash identity used as the address of a stored object
//! - [`ComponentId`]: Scope-qualified component name with an optional version
//! - [`LaneId`]: Identity of a named alternate development line
//! - [`VersionLabel`]: A human tag or a raw snap hash

pub mod error;
pub mod hash;
pub mod id;
pub mod label;
pub mod names;

pub use error::TypeError;
pub use hash::Ref;
pub use id::{ComponentId, LaneId};
pub use label::{is_hash, VersionLabel};
pub use names::{validate_component_name, validate_lane_name, validate_tag_name};
