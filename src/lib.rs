//! reforge - recipe template expansion engine
//!
//! A library for component-based edge deployment platforms that expands
//! *recipe templates* into fully-specified component recipes. A
//! deployment provides a directory of component recipes and a directory
//! of artifacts; some recipes are templates (no lifecycle, a parameter
//! schema, and an executable transformer artifact) and some are
//! parameter files (one template dependency plus concrete parameter
//! values). reforge pairs each parameter file with its template, runs
//! the template's transformer over it, and persists the generated
//! recipes into the component store so the rest of the pipeline treats
//! them as ordinary components.
//!
//! # Architecture Overview
//!
//! ```text
//! process(recipe_dir, artifacts_dir)
//!    │
//!    ├─ store::ComponentStore::list_recipes ── parse every recipe
//!    ├─ planner::ExpansionPlan::build ──────── classify + validate rules
//!    ├─ plugin::TransformerHost::load ──────── one isolated scope per template
//!    │     └─ transformer::BoundTransformer::bind ── schema validate + compare
//!    ├─ transformer::BoundTransformer::expand_one ── merge params + transform
//!    └─ store::ComponentStore::save_package_recipe ── persist output
//! ```
//!
//! # Core Modules
//!
//! - [`core`] - error types ([`core::ReforgeError`]) and component
//!   identity
//! - [`recipe`] - the typed recipe model and its YAML/JSON round-trip
//! - [`schema`] - parameter schema validation, comparison, and merging
//! - [`transformer`] - the contract transformer plugins implement
//! - [`plugin`] - the registration ABI and the dynamic-library host
//! - [`planner`] - recipe scanning, classification, and work planning
//! - [`store`] - the component store gateway and its local-disk
//!   implementation
//! - [`engine`] - the expansion driver tying everything together
//!
//! # Guarantees
//!
//! - **Deterministic**: templates expand in lexicographic name order,
//!   parameter files in `(name, version)` order; two runs over the same
//!   inputs persist byte-identical recipes.
//! - **Isolated plugins**: every transformer artifact loads into its own
//!   linker scope, so identically named internals of two artifacts never
//!   collide.
//! - **Aggregated diagnostics**: schema and parameter validation report
//!   every violation in a single error.
//! - **Single-threaded and re-entrant**: one `process` call runs on one
//!   thread and leaves no state behind.
//!
//! # Example
//!
//! ```no_run
//! use reforge::engine::TemplateEngine;
//! use reforge::plugin::DynamicLibraryHost;
//! use reforge::store::LocalComponentStore;
//! use std::path::Path;
//!
//! # fn main() -> anyhow::Result<()> {
//! let store = LocalComponentStore::new("/var/lib/deployment/store");
//! let host = DynamicLibraryHost::new();
//!
//! TemplateEngine::new(&store, &host).process(
//!     Path::new("/var/lib/deployment/recipes"),
//!     Path::new("/var/lib/deployment/artifacts"),
//! )?;
//! # Ok(())
//! # }
//! ```
//!
//! # Writing a transformer
//!
//! Transformer artifacts are `cdylib` crates implementing
//! [`transformer::RecipeTransformer`] and exporting themselves with
//! [`declare_transformers!`]; see the [`plugin::registration`] module
//! docs and the `demos/` directory for complete examples.

// Core types
pub mod core;
pub mod recipe;
pub mod schema;

// Expansion pipeline
pub mod engine;
pub mod planner;
pub mod plugin;
pub mod transformer;

// Persistence
pub mod store;

pub use engine::TemplateEngine;
