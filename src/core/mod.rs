//! Core types for the expansion engine.
//!
//! This module holds the vocabulary the rest of the crate is written in:
//!
//! - [`ReforgeError`] and [`ErrorKind`] — the strongly-typed failure
//!   modes of an expansion batch, grouped into the six fatal categories.
//! - [`ComponentIdentifier`] — the `(name, version)` identity every
//!   recipe, plan entry, and store operation is keyed by.
//!
//! Everything here is deliberately small and dependency-free so the
//! leaf modules (schema, planner, plugin host, store) can share it
//! without coupling to each other.

pub mod error;
pub mod identifier;

pub use error::{ErrorKind, ReforgeError};
pub use identifier::ComponentIdentifier;
