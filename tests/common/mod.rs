//! Common fixtures for reforge integration tests.
//!
//! Consolidates the deployment-directory scaffolding and the in-process
//! fixture transformers the engine tests run against. The fixture host
//! binds transformers through the same `BoundTransformer` path the
//! dynamic-library host uses, so everything downstream of discovery is
//! the production code path.

// Not every test file uses every fixture.
#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tempfile::TempDir;

use reforge::core::ReforgeError;
use reforge::plugin::{transformer_artifact_name, TransformerHost};
use reforge::recipe::{io, ComponentConfiguration, ComponentType, Recipe};
use reforge::schema::ParameterSchema;
use reforge::store::LocalComponentStore;
use reforge::transformer::{BoundTransformer, EffectiveParameters, RecipeTransformer};

/// Constructor for a fixture transformer.
pub type TransformerFactory = fn() -> Box<dyn RecipeTransformer>;

/// Host that binds in-process transformers keyed by template name.
///
/// Mirrors the production host's observable behavior: the artifact file
/// must exist, an unknown template has no candidate transformer, and
/// binding runs the full initialization protocol.
#[derive(Default)]
pub struct FixtureHost {
    factories: HashMap<String, TransformerFactory>,
}

impl FixtureHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, template: &str, factory: TransformerFactory) -> Self {
        self.factories.insert(template.to_string(), factory);
        self
    }
}

impl TransformerHost for FixtureHost {
    fn load(&self, artifact_path: &Path, template: &Recipe) -> Result<BoundTransformer> {
        if !artifact_path.is_file() {
            return Err(ReforgeError::TransformerArtifactNotFound {
                path: artifact_path.to_path_buf(),
            }
            .into());
        }
        let factory = self.factories.get(&template.component_name).ok_or_else(|| {
            ReforgeError::NoCandidateTransformer {
                template: template.component_name.clone(),
            }
        })?;
        BoundTransformer::bind(factory(), template)
    }
}

/// A deployment rooted in a temp directory:
///
/// ```text
/// <root>/recipes/     input recipe directory
/// <root>/artifacts/   input artifact directory
/// <root>/store/       component store written by the engine
/// ```
pub struct TestDeployment {
    root: TempDir,
}

impl TestDeployment {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create deployment tempdir");
        fs::create_dir_all(root.path().join("recipes")).unwrap();
        fs::create_dir_all(root.path().join("artifacts")).unwrap();
        Self { root }
    }

    pub fn recipe_dir(&self) -> PathBuf {
        self.root.path().join("recipes")
    }

    pub fn artifacts_dir(&self) -> PathBuf {
        self.root.path().join("artifacts")
    }

    pub fn store(&self) -> LocalComponentStore {
        LocalComponentStore::new(self.root.path().join("store"))
    }

    /// Serialize a recipe into the input recipe directory.
    pub fn add_recipe(&self, recipe: &Recipe) {
        let serialized = io::serialize(recipe).expect("serialize fixture recipe");
        self.add_recipe_document(&format!("{}.yaml", recipe.identifier()), &serialized);
    }

    /// Write a raw recipe document into the input recipe directory.
    pub fn add_recipe_document(&self, file_name: &str, content: &str) {
        fs::write(self.recipe_dir().join(file_name), content).unwrap();
    }

    /// Create `artifacts/<template>/<version>/transformer.<ext>`.
    ///
    /// The file content is irrelevant to the fixture host; only its
    /// presence is checked, exactly like the real host's existence
    /// probe.
    pub fn add_transformer_artifact(&self, template: &str, version: &str) {
        let dir = self.artifacts_dir().join(template).join(version);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(transformer_artifact_name()), b"fixture artifact").unwrap();
    }

    /// Recipes the engine persisted into the store, sorted by file name.
    pub fn persisted_recipes(&self) -> Vec<Recipe> {
        let store = self.store();
        let dir = store.recipe_directory();
        if !dir.exists() {
            return Vec::new();
        }
        let mut paths: Vec<_> = fs::read_dir(&dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        paths.sort();
        paths
            .iter()
            .map(|path| io::parse_file(path).expect("parse persisted recipe"))
            .collect()
    }

    /// Raw bytes of every persisted recipe, keyed by file name.
    pub fn persisted_bytes(&self) -> Vec<(String, Vec<u8>)> {
        let dir = self.store().recipe_directory();
        if !dir.exists() {
            return Vec::new();
        }
        let mut entries: Vec<_> = fs::read_dir(&dir)
            .unwrap()
            .map(|entry| {
                let path = entry.unwrap().path();
                let name = path.file_name().unwrap().to_string_lossy().into_owned();
                (name, fs::read(&path).unwrap())
            })
            .collect();
        entries.sort();
        entries
    }

    /// Wipe the store between runs.
    pub fn reset_store(&self) {
        let dir = self.root.path().join("store");
        if dir.exists() {
            fs::remove_dir_all(&dir).unwrap();
        }
    }
}

/// The run step of the first manifest of `recipe`.
pub fn run_step(recipe: &Recipe) -> &str {
    recipe.manifests[0]
        .lifecycle
        .get("run")
        .and_then(|value| value.as_str())
        .expect("manifest has a run step")
}

// ---------------------------------------------------------------------------
// Fixture transformers
// ---------------------------------------------------------------------------

/// Parameter schema of the logger template, shared between the fixture
/// transformer and the template recipes tests author.
pub fn logger_schema() -> ParameterSchema {
    serde_yaml::from_str(
        r#"
intervalInSecs:
  type: number
  required: true
timestamp:
  type: boolean
  required: false
  defaultValue: false
message:
  type: string
  required: false
  defaultValue: Ping pong
"#,
    )
    .unwrap()
}

/// Expands logger parameter files into periodic-echo components.
///
/// `sleep <intervalInSecs> && echo <message>` with an optional
/// `` ; echo `date` `` suffix when `timestamp` is set.
pub struct LoggerTransformer;

impl RecipeTransformer for LoggerTransformer {
    fn declared_schema(&self) -> ParameterSchema {
        logger_schema()
    }

    fn transform(&self, param_file: &Recipe, parameters: &EffectiveParameters) -> Result<Recipe> {
        let interval = parameters
            .get("intervalInSecs")
            .cloned()
            .unwrap_or_default();
        let message = parameters.get_str("message").unwrap_or_default().to_string();
        let timestamp = parameters.get_bool("timestamp").unwrap_or(false);

        let run = format!(
            "sleep {interval} && echo {message}{}",
            if timestamp { " ; echo `date`" } else { "" }
        );

        let mut recipe = Recipe::new(
            param_file.component_name.clone(),
            param_file.component_version.clone(),
        )
        .with_configuration(ComponentConfiguration::with_defaults(parameters.to_value()))
        .with_manifest(reforge::recipe::PlatformManifest::run_on_all_platforms(run));
        recipe.component_description = param_file.component_description.clone();
        Ok(recipe)
    }
}

/// The A-side dependent transformer and its private helper model.
///
/// Deliberately shaped like `b_dependent` — both modules define a
/// `DependentModel`, with different internals — to prove that two
/// transformers never observe each other's helpers.
pub mod a_dependent {
    use super::*;

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

        fn field(&self) -> &str {
            &self.field
        }

        fn integer(&self) -> i64 {
            self.integer
        }
    }

    pub struct DependentTransformer;

    impl RecipeTransformer for DependentTransformer {
        fn declared_schema(&self) -> ParameterSchema {
            ParameterSchema::new()
        }

        fn transform(
            &self,
            param_file: &Recipe,
            _parameters: &EffectiveParameters,
        ) -> Result<Recipe> {
            let dep = DependentModel::new("field", 14);
            let run = format!("echo Field: {} Integer: {}", dep.field(), dep.integer());
            Ok(Recipe::new(
                param_file.component_name.clone(),
                param_file.component_version.clone(),
            )
            .with_manifest(reforge::recipe::PlatformManifest::run_on_all_platforms(run)))
        }
    }
}

/// The B-side dependent transformer: same helper names as
/// [`a_dependent`], different shapes.
pub mod b_dependent {
    use super::*;

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

        fn get(&self) -> &str {
            &self.val
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

        fn field(&self) -> &str {
            self.field.get()
        }

        fn integer(&self) -> i64 {
            self.integer
        }
    }

    pub struct DependentTransformer;

    impl RecipeTransformer for DependentTransformer {
        fn declared_schema(&self) -> ParameterSchema {
            ParameterSchema::new()
        }

        fn transform(
            &self,
            param_file: &Recipe,
            _parameters: &EffectiveParameters,
        ) -> Result<Recipe> {
            let dep = DependentModel::new("fold", 42);
            let run = format!("echo Field: {} Integer: {}", dep.field(), dep.integer());
            Ok(Recipe::new(
                param_file.component_name.clone(),
                param_file.component_version.clone(),
            )
            .with_manifest(reforge::recipe::PlatformManifest::run_on_all_platforms(run)))
        }
    }
}

// ---------------------------------------------------------------------------
// Recipe builders
// ---------------------------------------------------------------------------

/// A template recipe with the given parameter schema and no lifecycle.
pub fn template_recipe(name: &str, version: &str, schema: ParameterSchema) -> Recipe {
    Recipe::new(name, version.parse().unwrap())
        .with_component_type(ComponentType::Template)
        .with_parameter_schema(schema)
}

/// A parameter file depending on `template` with the given values.
pub fn parameter_file_recipe(
    name: &str,
    version: &str,
    template: &str,
    range: &str,
    values: serde_json::Value,
) -> Recipe {
    Recipe::new(name, version.parse().unwrap())
        .with_dependency(
            template,
            reforge::recipe::DependencyProperties::requiring(range.parse().unwrap()),
        )
        .with_configuration(ComponentConfiguration::with_defaults(values))
}
