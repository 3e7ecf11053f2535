//! The expansion driver.
//!
//! [`TemplateEngine`] orchestrates one expansion batch end to end: scan
//! the recipe directory through the store gateway, build the
//! [`ExpansionPlan`], load each template's transformer through the
//! plugin host, expand every parameter file, and persist the generated
//! recipes back into the component store.
//!
//! The engine is single-threaded and re-entrant. All plan state lives
//! inside one [`process`](TemplateEngine::process) call and is dropped
//! before it returns, so back-to-back invocations share nothing.
//! Templates expand in lexicographic name order and parameter files in
//! plan order, which makes persisted output reproducible run over run.
//!
//! Any failure aborts the batch. Recipes persisted before the failure
//! remain persisted; cleanup, like removing template recipes from the
//! store after a successful run, is the caller's decision.

use std::path::Path;

use anyhow::Result;
use tracing::{debug, info};

use crate::planner::ExpansionPlan;
use crate::plugin::{transformer_artifact_name, TransformerHost};
use crate::recipe::io;
use crate::store::ComponentStore;

/// Drives template expansion against a component store and a plugin
/// host.
///
/// Both collaborators are borrowed: the engine owns no state of its own
/// beyond the duration of a single [`process`](Self::process) call.
///
/// # Examples
///
/// ```no_run
/// use reforge::engine::TemplateEngine;
/// use reforge::plugin::DynamicLibraryHost;
/// use reforge::store::LocalComponentStore;
/// use std::path::Path;
///
/// # fn main() -> anyhow::Result<()> {
/// let store = LocalComponentStore::new("/var/lib/deployment/store");
/// let host = DynamicLibraryHost::new();
/// let engine = TemplateEngine::new(&store, &host);
/// engine.process(
///     Path::new("/var/lib/deployment/recipes"),
///     Path::new("/var/lib/deployment/artifacts"),
/// )?;
/// # Ok(())
/// # }
/// ```
pub struct TemplateEngine<'a> {
    store: &'a dyn ComponentStore,
    host: &'a dyn TransformerHost,
}

impl<'a> TemplateEngine<'a> {
    /// An engine over the given store and plugin host.
    pub fn new(store: &'a dyn ComponentStore, host: &'a dyn TransformerHost) -> Self {
        Self { store, host }
    }

    /// Expand every parameter file under `recipe_dir` and persist the
    /// generated recipes.
    ///
    /// Transformer artifacts are looked up at
    /// `<artifacts_dir>/<templateName>/<templateVersion>/transformer.<ext>`.
    /// The input recipe directory is never mutated; all output goes
    /// through the store gateway.
    ///
    /// # Errors
    ///
    /// Fails on the first violated rule or failed expansion; see the
    /// crate's error-kind table. The batch aborts but recipes persisted
    /// before the failure remain in the store.
    pub fn process(&self, recipe_dir: &Path, artifacts_dir: &Path) -> Result<()> {
        let scanned = self.store.list_recipes(recipe_dir)?;
        debug!(recipes = scanned.len(), dir = %recipe_dir.display(), "scanned recipe directory");

        let plan = ExpansionPlan::build(scanned)?;
        if plan.is_empty() {
            debug!("no parameter files to expand");
            return Ok(());
        }
        info!(
            templates = plan.expansion_count(),
            parameter_files = plan.parameter_file_count(),
            "expanding templates"
        );

        for expansion in plan.expansions() {
            let artifact_path = artifacts_dir
                .join(expansion.template_name)
                .join(expansion.template_id.version.to_string())
                .join(transformer_artifact_name());
            let bound = self.host.load(&artifact_path, expansion.template)?;

            for param_file in &expansion.parameter_files {
                let expanded = bound.expand_one(param_file)?;
                let serialized = io::serialize(&expanded)?;
                self.store
                    .save_package_recipe(&param_file.identifier(), &serialized)?;
                info!(
                    component = %param_file.identifier(),
                    template = %expansion.template_id,
                    "expanded parameter file"
                );
            }
            // The bound transformer (and its plugin scope) is released
            // before the next template loads.
        }
        Ok(())
    }
}
