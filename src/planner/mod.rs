//! Scanning recipes and planning expansion work.
//!
//! The planner turns the raw contents of a recipe directory into an
//! [`ExpansionPlan`]: which templates exist, which parameter files each
//! template expands, and in what order. It runs in three passes over the
//! in-memory recipes:
//!
//! 1. **Scan** — index every recipe by identifier (rejecting duplicates)
//!    and every template by name, keeping only the highest version per
//!    template name.
//! 2. **Classify** — walk each recipe's dependency edges against the
//!    template index, enforcing the dependency rules: templates never
//!    depend on templates, a parameter file has at most one template
//!    dependency, and a declared range must be satisfied by the local
//!    template version. A dependency on an absent component is ignored
//!    unless its name marks it as a template (`…Template`), in which
//!    case the deployment is missing a template it needs.
//! 3. **Lifecycle check** — every template must have an empty lifecycle,
//!    top-level and in every manifest.
//!
//! The plan owns the recipes for the duration of one `process` call and
//! is dropped when the call returns. Iteration order is deterministic:
//! templates in lexicographic name order, parameter files sorted by
//! `(name, version)`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use tracing::debug;

use crate::core::{ComponentIdentifier, ReforgeError};
use crate::recipe::Recipe;

/// Suffix that marks a dependency name as a template even when the
/// component is absent locally. Used only for the missing-template
/// diagnostic; present components are classified by type.
const TEMPLATE_NAME_SUFFIX: &str = "Template";

/// One template's planned work: its recipe and the parameter files it
/// expands, in order.
#[derive(Debug)]
pub struct PlannedExpansion<'a> {
    /// Template name.
    pub template_name: &'a str,
    /// Identifier of the template version that will expand.
    pub template_id: &'a ComponentIdentifier,
    /// The template recipe.
    pub template: &'a Recipe,
    /// Parameter files to expand, sorted by `(name, version)`.
    pub parameter_files: Vec<&'a Recipe>,
}

/// The work plan for one `process` invocation.
///
/// Built by [`ExpansionPlan::build`] from the scanned recipe directory;
/// released when the invocation returns.
#[derive(Debug, Default)]
pub struct ExpansionPlan {
    recipes: BTreeMap<ComponentIdentifier, Recipe>,
    templates: BTreeMap<String, ComponentIdentifier>,
    expansions: BTreeMap<String, Vec<ComponentIdentifier>>,
}

impl ExpansionPlan {
    /// Build a plan from the parsed contents of a recipe directory.
    ///
    /// Runs the scan, classification, and lifecycle passes; any rule
    /// violation fails the whole plan.
    pub fn build(scanned: Vec<(PathBuf, Recipe)>) -> Result<Self> {
        let mut plan = Self::default();
        plan.scan(scanned)?;
        plan.classify()?;
        plan.ensure_templates_have_no_lifecycle()?;
        debug!(
            templates = plan.templates.len(),
            expansions = plan.expansions.len(),
            "expansion plan built"
        );
        Ok(plan)
    }

    fn scan(&mut self, scanned: Vec<(PathBuf, Recipe)>) -> Result<()> {
        for (path, recipe) in scanned {
            let identifier = recipe.identifier();
            debug!(recipe = %identifier, file = %path.display(), "scanned recipe");
            if self.recipes.contains_key(&identifier) {
                return Err(ReforgeError::DuplicateComponent { identifier }.into());
            }
            if recipe.is_template() {
                match self.templates.get(&recipe.component_name) {
                    Some(existing) if existing.version >= identifier.version => {}
                    _ => {
                        self.templates
                            .insert(recipe.component_name.clone(), identifier.clone());
                    }
                }
            }
            self.recipes.insert(identifier, recipe);
        }
        Ok(())
    }

    fn classify(&mut self) -> Result<()> {
        for (identifier, recipe) in &self.recipes {
            let mut has_template_dependency = false;
            for (dependency_name, properties) in &recipe.component_dependencies {
                let Some(template_id) = self.templates.get(dependency_name) else {
                    if dependency_name.ends_with(TEMPLATE_NAME_SUFFIX) {
                        return Err(ReforgeError::TemplateNotFoundLocally {
                            component: identifier.name.clone(),
                            template: dependency_name.clone(),
                            requirement: properties.version_requirement.clone(),
                        }
                        .into());
                    }
                    // An ordinary dependency on a component resolved
                    // elsewhere in the deployment pipeline.
                    continue;
                };

                if recipe.is_template() {
                    return Err(ReforgeError::IllegalTemplateDependency {
                        template: identifier.name.clone(),
                    }
                    .into());
                }
                if has_template_dependency {
                    return Err(ReforgeError::MultipleTemplateDependencies {
                        component: identifier.name.clone(),
                    }
                    .into());
                }
                if !properties.version_requirement.matches(&template_id.version) {
                    return Err(ReforgeError::TemplateVersionUnsatisfied {
                        component: identifier.name.clone(),
                        template: template_id.name.clone(),
                        requirement: properties.version_requirement.clone(),
                        found: template_id.version.clone(),
                    }
                    .into());
                }

                has_template_dependency = true;
                self.expansions
                    .entry(dependency_name.clone())
                    .or_default()
                    .push(identifier.clone());
            }
        }
        // BTreeMap iteration already yields identifiers in order, but the
        // ordering contract belongs to the plan, not to the map choice.
        for parameter_files in self.expansions.values_mut() {
            parameter_files.sort();
        }
        Ok(())
    }

    fn ensure_templates_have_no_lifecycle(&self) -> Result<()> {
        for (name, template_id) in &self.templates {
            let recipe = &self.recipes[template_id];
            for manifest in &recipe.manifests {
                if !manifest.lifecycle.is_empty() {
                    return Err(ReforgeError::TemplateHasLifecycle {
                        template: name.clone(),
                        entries: manifest.lifecycle.len(),
                    }
                    .into());
                }
            }
            if !recipe.lifecycle.is_empty() {
                return Err(ReforgeError::TemplateHasLifecycle {
                    template: name.clone(),
                    entries: recipe.lifecycle.len(),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Planned expansions, templates in lexicographic name order.
    pub fn expansions(&self) -> impl Iterator<Item = PlannedExpansion<'_>> {
        self.expansions.iter().map(|(name, parameter_files)| {
            let template_id = &self.templates[name];
            PlannedExpansion {
                template_name: name,
                template_id,
                template: &self.recipes[template_id],
                parameter_files: parameter_files
                    .iter()
                    .map(|id| &self.recipes[id])
                    .collect(),
            }
        })
    }

    /// Number of templates with at least one parameter file to expand.
    pub fn expansion_count(&self) -> usize {
        self.expansions.len()
    }

    /// Total number of parameter files across all templates.
    pub fn parameter_file_count(&self) -> usize {
        self.expansions.values().map(Vec::len).sum()
    }

    /// Whether any expansion work was planned.
    pub fn is_empty(&self) -> bool {
        self.expansions.is_empty()
    }

    /// All templates discovered in the scan, including those with no
    /// parameter files.
    pub fn templates(&self) -> impl Iterator<Item = (&str, &ComponentIdentifier)> {
        self.templates.iter().map(|(name, id)| (name.as_str(), id))
    }

    /// Look up a scanned recipe by identifier.
    pub fn recipe(&self, identifier: &ComponentIdentifier) -> Option<&Recipe> {
        self.recipes.get(identifier)
    }
}
