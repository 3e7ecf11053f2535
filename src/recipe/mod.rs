//! Component recipe model.
//!
//! A recipe is the declarative description of one deployable component:
//! its identity, its dependencies, its per-platform manifests with their
//! lifecycle steps, and — for templates — the parameter schema its
//! transformer expects. The model is a faithful, lossless mapping of the
//! on-disk recipe documents: a parsed recipe serializes back to an
//! equivalent document (`parse(serialize(r)) == r`), and fields absent in
//! the input surface as the model's empty value, never as parse errors.
//!
//! Recipes are read and written in YAML or JSON; see [`io`].
//!
//! # Classification
//!
//! The engine classifies recipes by inspecting this model:
//! - a recipe is a *template* iff its [`ComponentType`] is
//!   [`ComponentType::Template`];
//! - a recipe is a *parameter file* iff it declares exactly one
//!   dependency on a locally-present template.
//!
//! The planner enforces the dependency rules; the model only carries the
//! data.

pub mod io;

use std::collections::BTreeMap;

use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::ComponentIdentifier;
use crate::schema::ParameterSchema;

/// Version tag of the recipe document format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecipeFormatVersion {
    /// The January 25, 2020 recipe format.
    #[default]
    #[serde(rename = "2020-01-25")]
    Jan25_2020,
}

/// Category of a component.
///
/// The component type is authoritative for template classification: a
/// recipe is a template iff its type says so, regardless of its name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    /// An ordinary deployable component.
    #[default]
    Generic,
    /// A recipe-producing template; carries a parameter schema and a
    /// transformer artifact, never a lifecycle.
    Template,
    /// A component loaded into the nucleus process.
    Plugin,
    /// The nucleus itself.
    Nucleus,
}

/// How strongly a component depends on another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DependencyType {
    /// Dependent is restarted when the dependency changes state.
    Hard,
    /// Dependent only waits for the dependency at startup.
    Soft,
}

/// Declared dependency edge: a semver range plus an optional hard/soft
/// marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct DependencyProperties {
    /// Semver range the locally-present dependency must satisfy.
    pub version_requirement: VersionReq,
    /// Hard/soft marker; absent means hard.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_type: Option<DependencyType>,
}

impl DependencyProperties {
    /// Dependency on a version range, with no hard/soft marker.
    pub fn requiring(requirement: VersionReq) -> Self {
        Self {
            version_requirement: requirement,
            dependency_type: None,
        }
    }
}

/// Platform matcher of a [`PlatformManifest`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Platform {
    /// Operating system matched by the manifest; `"all"` or absent
    /// matches everything.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    /// CPU architecture matched by the manifest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
}

impl Platform {
    /// Matcher that applies to every platform.
    pub fn all() -> Self {
        Self {
            os: Some("all".to_string()),
            architecture: None,
        }
    }
}

/// One artifact shipped by a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ComponentArtifact {
    /// Artifact location.
    pub uri: String,
    /// Integrity digest of the artifact, if declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    /// Digest algorithm, if declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm: Option<String>,
}

/// Per-platform manifest: a platform matcher, a lifecycle, and the
/// artifacts the component ships on that platform.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlatformManifest {
    /// Platform matcher; absent matches everything.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    /// Display name of the manifest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Lifecycle phase → shell command or structured step. Empty for
    /// templates.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub lifecycle: BTreeMap<String, Value>,
    /// Artifacts shipped for this platform.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<ComponentArtifact>,
}

impl PlatformManifest {
    /// Manifest that runs `script` as its `run` step on every platform.
    pub fn run_on_all_platforms(script: impl Into<String>) -> Self {
        let mut lifecycle = BTreeMap::new();
        lifecycle.insert("run".to_string(), Value::String(script.into()));
        Self {
            platform: Some(Platform::all()),
            name: None,
            lifecycle,
            artifacts: Vec::new(),
        }
    }
}

/// Component configuration block.
///
/// For parameter files, `DefaultConfiguration` carries the
/// caller-supplied parameter values; for generated recipes it carries
/// whatever configuration the transformer emitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct ComponentConfiguration {
    /// Default configuration document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_configuration: Option<Value>,
}

impl ComponentConfiguration {
    /// Configuration wrapping the given default-configuration document.
    pub fn with_defaults(default_configuration: Value) -> Self {
        Self {
            default_configuration: Some(default_configuration),
        }
    }
}

/// A component recipe.
///
/// Field names mirror the wire form (PascalCase keys); unknown document
/// fields are rejected at parse time so typos in recipes fail loudly
/// instead of being silently dropped on the next serialization.
///
/// # Examples
///
/// ```
/// use reforge::recipe::{ComponentType, Recipe};
///
/// let recipe = Recipe::new("LoggerTemplate", "1.0.0".parse().unwrap())
///     .with_component_type(ComponentType::Template);
/// assert!(recipe.is_template());
/// assert_eq!(recipe.identifier().to_string(), "LoggerTemplate-1.0.0");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Recipe {
    /// Recipe document format tag.
    #[serde(default)]
    pub recipe_format_version: RecipeFormatVersion,
    /// Component name.
    pub component_name: String,
    /// Exact component version.
    pub component_version: Version,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_description: Option<String>,
    /// Publisher of the component.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_publisher: Option<String>,
    /// Component category; absent means generic.
    #[serde(default, skip_serializing_if = "is_default_component_type")]
    pub component_type: ComponentType,
    /// Dependency name → declared properties.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub component_dependencies: BTreeMap<String, DependencyProperties>,
    /// Configuration block; parameter values for parameter files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_configuration: Option<ComponentConfiguration>,
    /// Parameter schema mirrored into a template's recipe. Must equal the
    /// schema declared by the template's transformer artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_parameter_schema: Option<ParameterSchema>,
    /// Per-platform manifests.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub manifests: Vec<PlatformManifest>,
    /// Top-level lifecycle; templates must leave this empty.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub lifecycle: BTreeMap<String, Value>,
}

fn is_default_component_type(component_type: &ComponentType) -> bool {
    *component_type == ComponentType::Generic
}

impl Recipe {
    /// Minimal recipe: current format version, the given identity, and
    /// everything else empty.
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            recipe_format_version: RecipeFormatVersion::Jan25_2020,
            component_name: name.into(),
            component_version: version,
            component_description: None,
            component_publisher: None,
            component_type: ComponentType::Generic,
            component_dependencies: BTreeMap::new(),
            component_configuration: None,
            template_parameter_schema: None,
            manifests: Vec::new(),
            lifecycle: BTreeMap::new(),
        }
    }

    /// Set the component type.
    #[must_use]
    pub fn with_component_type(mut self, component_type: ComponentType) -> Self {
        self.component_type = component_type;
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.component_description = Some(description.into());
        self
    }

    /// Add a dependency edge.
    #[must_use]
    pub fn with_dependency(mut self, name: impl Into<String>, properties: DependencyProperties) -> Self {
        self.component_dependencies.insert(name.into(), properties);
        self
    }

    /// Set the configuration block.
    #[must_use]
    pub fn with_configuration(mut self, configuration: ComponentConfiguration) -> Self {
        self.component_configuration = Some(configuration);
        self
    }

    /// Set the template parameter schema.
    #[must_use]
    pub fn with_parameter_schema(mut self, schema: ParameterSchema) -> Self {
        self.template_parameter_schema = Some(schema);
        self
    }

    /// Add a platform manifest.
    #[must_use]
    pub fn with_manifest(mut self, manifest: PlatformManifest) -> Self {
        self.manifests.push(manifest);
        self
    }

    /// The `(name, version)` identity of this recipe.
    pub fn identifier(&self) -> ComponentIdentifier {
        ComponentIdentifier::new(self.component_name.clone(), self.component_version.clone())
    }

    /// Whether this recipe is a template (by component type).
    pub fn is_template(&self) -> bool {
        self.component_type == ComponentType::Template
    }

    /// The caller-supplied parameter document, if any.
    pub fn default_configuration(&self) -> Option<&Value> {
        self.component_configuration
            .as_ref()
            .and_then(|configuration| configuration.default_configuration.as_ref())
    }

    /// Total number of lifecycle entries across the top level and every
    /// manifest. Templates must report zero.
    pub fn lifecycle_entry_count(&self) -> usize {
        self.lifecycle.len()
            + self
                .manifests
                .iter()
                .map(|manifest| manifest.lifecycle.len())
                .sum::<usize>()
    }
}
