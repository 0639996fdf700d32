//! Core types and utilities shared across vellum.
//!
//! This crate provides the foundations every other workspace member builds
//! on:
//! - Version, Specifier and RangeSpecifier (PEP 440-flavored version
//!   algebra)
//! - Canonical package name folding
//! - Environment marker expressions (PEP 508-style)
//! - Shared error types
//! - High-performance JSON helpers

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

/// Global allocator for every binary that links this crate in, mirroring
/// the teacher's choice of mimalloc for the resolver's allocation-heavy
/// backtracking search.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod canonical_name;
pub mod error;
pub mod json;
pub mod marker;
pub mod version;

pub use canonical_name::{canonicalize, same_package};
pub use error::{Error, Result};
pub use json::{from_json, from_json_slice, to_json, to_json_pretty};
pub use marker::{Environment, Marker};
pub use version::{Operator, RangeSpecifier, Specifier, Version};

// Re-exported for crates that need fast maps without pulling in `ahash`
// directly.
pub use ahash::{AHashMap, AHashSet};
