//! Transformer plugin host.
//!
//! Templates ship their transformer as a dynamic library named
//! `transformer.<ext>` (the platform's plugin extension) inside their
//! artifact directory. This module owns everything about getting from
//! that file to a usable [`BoundTransformer`]:
//!
//! - [`registration`] — the ABI a transformer artifact exports: one
//!   well-known registration symbol, emitted by
//!   [`declare_transformers!`](crate::declare_transformers), carrying the
//!   constructors the artifact offers.
//! - [`host`] — the [`TransformerHost`] seam the expansion driver
//!   consumes, and [`DynamicLibraryHost`], which loads each artifact into
//!   its own linker scope.
//!
//! # Discovery discipline
//!
//! An artifact must register exactly one transformer. No registration
//! symbol or an empty constructor list fails with "no candidate
//! transformer"; two or more constructors fail with "more than one
//! candidate transformer"; a constructor that panics fails as an
//! instantiation error. All are plugin-kind errors and fatal to the
//! batch.
//!
//! # Isolation
//!
//! Every load creates a fresh library scope for that artifact alone.
//! Plugin-internal symbols resolve within the artifact's own scope, so
//! two transformer artifacts shipping identically named helper types
//! never observe each other. The scope lives exactly as long as the
//! [`BoundTransformer`] it produced; a single process can load many
//! disjoint scopes over its lifetime without leaking earlier ones.
//!
//! [`BoundTransformer`]: crate::transformer::BoundTransformer

pub mod host;
pub mod registration;

pub use host::{DynamicLibraryHost, TransformerHost};
pub use registration::{TransformerConstructor, TransformerRegistration, PLUGIN_ABI_VERSION, REGISTRATION_SYMBOL};

/// File name of a transformer artifact on the current platform, e.g.
/// `transformer.so` on Linux or `transformer.dll` on Windows.
pub fn transformer_artifact_name() -> String {
    format!("transformer.{}", std::env::consts::DLL_EXTENSION)
}
