//! Transformer artifact for `ADependentTemplate`.
//!
//! Pure-substitution template whose transformer leans on a private
//! `DependentModel` helper. The sibling `b-dependent-transformer` ships
//! a helper with the same name and a different shape; the host's
//! per-artifact scopes keep the two from ever meeting.

use anyhow::Result;
use reforge::declare_transformers;
use reforge::recipe::{PlatformManifest, Recipe};
use reforge::schema::ParameterSchema;
use reforge::transformer::{EffectiveParameters, RecipeTransformer};

struct DependentModel {
    field: String,
    integer: i64,
}

impl DependentModel {
    fn new(field: &str, integer: i64) -> Self {
        Self {
            field: field.to_string(),
            integer,
        }
    }
}

struct DependentTransformer;

impl RecipeTransformer for DependentTransformer {
    fn declared_schema(&self) -> ParameterSchema {
        ParameterSchema::new()
    }

    fn transform(&self, param_file: &Recipe, _parameters: &EffectiveParameters) -> Result<Recipe> {
        let dep = DependentModel::new("field", 14);
        let run = format!("echo Field: {} Integer: {}", dep.field, dep.integer);
        Ok(Recipe::new(
            param_file.component_name.clone(),
            param_file.component_version.clone(),
        )
        .with_manifest(PlatformManifest::run_on_all_platforms(run)))
    }
}

declare_transformers!(|| Box::new(DependentTransformer));
