//! Content hashing for Facet.
//!
//! Provides domain-separated BLAKE3 hashing. Every object kind hashes under
//! its own domain tag so that identical bytes stored as different kinds
//! never share a [`Ref`](facet_types::Ref).
//!
//! All crypto operations wrap established libraries; no custom cryptography.

pub mod hasher;

pub use hasher::{ContentHasher, HasherError};
