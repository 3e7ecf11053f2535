//! Error handling for reforge.
//!
//! The engine reports failures through a single strongly-typed enum,
//! [`ReforgeError`]. Variants carry structured fields (component names,
//! paths, version requirements) so callers can react programmatically,
//! while the `Display` implementations render the messages template
//! authors actually read.
//!
//! # Error kinds
//!
//! Every variant belongs to one of six kinds, exposed through
//! [`ReforgeError::kind`]:
//!
//! - [`ErrorKind::TemplateAuthoring`] — the transformer artifact declared
//!   a schema that violates the parameter-schema invariants.
//! - [`ErrorKind::SchemaMismatch`] — the template recipe's visible schema
//!   disagrees with the schema baked into its transformer.
//! - [`ErrorKind::Dependency`] — illegal or unsatisfiable template
//!   dependency edges discovered while planning.
//! - [`ErrorKind::RecipeTransformer`] — a template carries a lifecycle,
//!   caller parameters fail validation, or a transformer fails at
//!   expansion time.
//! - [`ErrorKind::Plugin`] — the transformer artifact is missing, cannot
//!   be loaded, or does not contain exactly one usable transformer.
//! - [`ErrorKind::StoreIo`] — the component store could not read, parse,
//!   or persist a recipe.
//!
//! All kinds are fatal to the batch: nothing is retried and nothing is
//! recovered locally. Recipes persisted before the failure remain
//! persisted.
//!
//! # Aggregation
//!
//! Schema and parameter validation collect *every* violation before
//! failing: [`ReforgeError::TemplateAuthoring`],
//! [`ReforgeError::SchemaMismatch`] and
//! [`ReforgeError::ParameterValidation`] carry a `Vec<String>` of
//! violations that renders as a single multi-line message, so authors fix
//! the full list in one pass instead of replaying the batch per error.
//!
//! Functions across the crate return [`anyhow::Result`]; typed errors are
//! converted at the failure site and can be recovered with
//! `err.downcast_ref::<ReforgeError>()`.

use std::path::PathBuf;

use semver::{Version, VersionReq};
use thiserror::Error;

use crate::core::ComponentIdentifier;

/// All failure modes surfaced by the expansion engine.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ReforgeError {
    /// A recipe file under the input directory could not be parsed.
    ///
    /// Raised by the store gateway's fail-fast `list_recipes` contract;
    /// the message names the offending file.
    #[error("Unable to parse recipe file {}: {reason}", .file.display())]
    RecipeParse {
        /// Path of the recipe file that failed to parse.
        file: PathBuf,
        /// Parser diagnostic.
        reason: String,
    },

    /// Two recipe files in the same plan resolve to one identifier.
    #[error("Duplicate recipe for component {identifier}")]
    DuplicateComponent {
        /// The identifier claimed by more than one recipe file.
        identifier: ComponentIdentifier,
    },

    /// The transformer artifact declared a schema violating the
    /// parameter-schema invariants.
    ///
    /// Aggregates every violation: defaults on required fields, missing
    /// defaults on optional fields, defaults of the wrong type.
    #[error("Template transformer for {template} provided invalid schema:\n{}", .violations.join("\n"))]
    TemplateAuthoring {
        /// Name of the template whose transformer is at fault.
        template: String,
        /// One entry per violated invariant.
        violations: Vec<String>,
    },

    /// The template recipe's parameter schema differs from the schema
    /// declared by its transformer artifact.
    #[error("Template recipe for {template} provided schema different from its transformer:\n{}", .differences.join("\n"))]
    SchemaMismatch {
        /// Name of the template whose recipe is at fault.
        template: String,
        /// One entry per missing, extra, or differing field.
        differences: Vec<String>,
    },

    /// A template recipe declares a dependency on another template.
    #[error("Illegal dependency for template {template}. Templates cannot depend on other templates")]
    IllegalTemplateDependency {
        /// The offending template.
        template: String,
    },

    /// A parameter file declares more than one template dependency.
    #[error("Parameter file {component} has multiple template dependencies")]
    MultipleTemplateDependencies {
        /// The offending parameter file.
        component: String,
    },

    /// A dependency names a template that is not present locally.
    #[error("Component {component} depends on a version of {template} that can't be found locally. Requirement is {requirement}")]
    TemplateNotFoundLocally {
        /// The component declaring the dependency.
        component: String,
        /// The missing template name.
        template: String,
        /// The declared version range.
        requirement: VersionReq,
    },

    /// A dependency names a local template whose version fails the range.
    #[error("Component {component} depends on a version of {template} that can't be found locally. Requirement is {requirement} but have {found}")]
    TemplateVersionUnsatisfied {
        /// The component declaring the dependency.
        component: String,
        /// The template name.
        template: String,
        /// The declared version range.
        requirement: VersionReq,
        /// The version actually present.
        found: Version,
    },

    /// A template recipe carries a non-empty lifecycle.
    #[error("Templates cannot have non-empty lifecycle. {template} has a lifecycle map with {entries} key/value pairs")]
    TemplateHasLifecycle {
        /// The offending template.
        template: String,
        /// Number of lifecycle entries found.
        entries: usize,
    },

    /// Caller-supplied parameters do not satisfy the template schema.
    ///
    /// Aggregates every violation: missing required fields, type
    /// mismatches, and keys absent from the schema.
    #[error("Configuration for component {component} does not match required schema:\n{}", .violations.join("\n"))]
    ParameterValidation {
        /// The parameter file whose configuration is at fault.
        component: String,
        /// One entry per violation.
        violations: Vec<String>,
    },

    /// The transformer itself failed while expanding a parameter file.
    #[error("Failed to expand component {component}")]
    TransformFailed {
        /// The parameter file being expanded.
        component: String,
        /// The transformer's failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// No transformer artifact exists at the expected path.
    #[error("Transformer artifact not found: {}", .path.display())]
    TransformerArtifactNotFound {
        /// The path that was probed.
        path: PathBuf,
    },

    /// The artifact exists but the dynamic library could not be loaded.
    #[error("Could not load transformer artifact {}: {reason}", .path.display())]
    PluginLoad {
        /// The artifact path.
        path: PathBuf,
        /// Loader diagnostic.
        reason: String,
    },

    /// The artifact was built against an incompatible plugin ABI.
    #[error("Transformer artifact {} was built against plugin ABI {found}, host requires {expected}", .path.display())]
    IncompatiblePluginAbi {
        /// The artifact path.
        path: PathBuf,
        /// ABI version the host supports.
        expected: u32,
        /// ABI version the artifact declares.
        found: u32,
    },

    /// The loaded artifact registers no transformer.
    #[error("Could not find a candidate transformer for template {template}")]
    NoCandidateTransformer {
        /// The template whose artifact is at fault.
        template: String,
    },

    /// The loaded artifact registers more than one transformer.
    #[error("Found more than one candidate transformer ({count}) in {}", .path.display())]
    MultipleCandidateTransformers {
        /// The artifact path.
        path: PathBuf,
        /// How many transformers the artifact registered.
        count: usize,
    },

    /// The sole registered transformer's constructor failed.
    #[error("Could not instantiate the transformer for {template}: {reason}")]
    TransformerInstantiation {
        /// The template whose transformer is at fault.
        template: String,
        /// Panic payload or constructor diagnostic.
        reason: String,
    },

    /// The component store failed to read, write, or delete a recipe.
    #[error("Store {operation} failed for {}", .path.display())]
    StoreIo {
        /// The store operation that failed (e.g. "save", "delete", "walk").
        operation: String,
        /// The path involved.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A generated recipe could not be serialized for persistence.
    #[error("Could not serialize generated recipe for {component}: {reason}")]
    RecipeSerialize {
        /// The component whose recipe failed to serialize.
        component: String,
        /// Serializer diagnostic.
        reason: String,
    },
}

/// The six failure categories of the engine.
///
/// Obtained via [`ReforgeError::kind`]; every category is fatal to the
/// batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Transformer-declared schema violates the schema invariants.
    TemplateAuthoring,
    /// Transformer-declared schema differs from the template recipe's.
    SchemaMismatch,
    /// Illegal or unsatisfiable template dependency edge.
    Dependency,
    /// Template lifecycle violation, parameter validation failure, or
    /// transformer execution failure.
    RecipeTransformer,
    /// Transformer artifact missing, unloadable, or ill-formed.
    Plugin,
    /// Component store read/parse/persist failure.
    StoreIo,
}

impl ReforgeError {
    /// The failure category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TemplateAuthoring { .. } => ErrorKind::TemplateAuthoring,
            Self::SchemaMismatch { .. } => ErrorKind::SchemaMismatch,
            Self::DuplicateComponent { .. }
            | Self::IllegalTemplateDependency { .. }
            | Self::MultipleTemplateDependencies { .. }
            | Self::TemplateNotFoundLocally { .. }
            | Self::TemplateVersionUnsatisfied { .. } => ErrorKind::Dependency,
            Self::TemplateHasLifecycle { .. }
            | Self::ParameterValidation { .. }
            | Self::TransformFailed { .. } => ErrorKind::RecipeTransformer,
            Self::TransformerArtifactNotFound { .. }
            | Self::PluginLoad { .. }
            | Self::IncompatiblePluginAbi { .. }
            | Self::NoCandidateTransformer { .. }
            | Self::MultipleCandidateTransformers { .. }
            | Self::TransformerInstantiation { .. } => ErrorKind::Plugin,
            Self::RecipeParse { .. } | Self::StoreIo { .. } | Self::RecipeSerialize { .. } => {
                ErrorKind::StoreIo
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_violations_share_a_kind() {
        let err = ReforgeError::MultipleTemplateDependencies {
            component: "LoggerA".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Dependency);
        assert!(err.to_string().contains("has multiple template dependencies"));
    }

    #[test]
    fn test_aggregated_message_lists_every_violation() {
        let err = ReforgeError::TemplateAuthoring {
            template: "LoggerTemplate".into(),
            violations: vec![
                "Provided default value for required field: intervalInSecs".into(),
                "Did not provide default value for optional field: message".into(),
            ],
        };
        let message = err.to_string();
        assert!(message.contains("required field: intervalInSecs"));
        assert!(message.contains("optional field: message"));
    }

    #[test]
    fn test_unsatisfied_requirement_names_both_versions() {
        let err = ReforgeError::TemplateVersionUnsatisfied {
            component: "LoggerA".into(),
            template: "LoggerTemplate".into(),
            requirement: "^2.0".parse().unwrap(),
            found: "1.3.0".parse().unwrap(),
        };
        let message = err.to_string();
        assert!(message.contains("can't be found locally. Requirement is"));
        assert!(message.contains("1.3.0"));
        assert_eq!(err.kind(), ErrorKind::Dependency);
    }

    #[test]
    fn test_lifecycle_violation_is_transformer_kind() {
        let err = ReforgeError::TemplateHasLifecycle {
            template: "LoggerTemplate".into(),
            entries: 2,
        };
        assert_eq!(err.kind(), ErrorKind::RecipeTransformer);
        assert!(err.to_string().contains("Templates cannot have non-empty lifecycle"));
    }
}
