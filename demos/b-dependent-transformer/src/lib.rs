//! Transformer artifact for `BDependentTemplate`.
//!
//! Ships a `DependentModel` with the same name as the one inside
//! `a-dependent-transformer` but a different shape (its field goes
//! through `CustomString`, which appends the reversed value). Both
//! artifacts load and expand in one process without colliding.

use anyhow::Result;
use reforge::declare_transformers;
use reforge::recipe::{PlatformManifest, Recipe};
use reforge::schema::ParameterSchema;
use reforge::transformer::{EffectiveParameters, RecipeTransformer};

struct CustomString {
    val: String,
}

impl CustomString {
    fn of(s: &str) -> Self {
        let reversed: String = s.chars().rev().collect();
        Self {
            val: format!("{s}{reversed}"),
        }
    }
}

struct DependentModel {
    field: CustomString,
    integer: i64,
}

impl DependentModel {
    fn new(field: &str, integer: i64) -> Self {
        Self {
            field: CustomString::of(field),
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
        let dep = DependentModel::new("fold", 42);
        let run = format!("echo Field: {} Integer: {}", dep.field.val, dep.integer);
        Ok(Recipe::new(
            param_file.component_name.clone(),
            param_file.component_version.clone(),
        )
        .with_manifest(PlatformManifest::run_on_all_platforms(run)))
    }
}

declare_transformers!(|| Box::new(DependentTransformer));
