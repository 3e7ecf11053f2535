//! The transformer contract.
//!
//! A *transformer* is the code shipped inside a template's artifact that
//! turns a parameter file into a fully-specified component recipe.
//! Transformers implement [`RecipeTransformer`]; the plugin host
//! instantiates one per template and binds it with
//! [`BoundTransformer::bind`], which runs the initialization protocol:
//!
//! 1. validate the transformer-declared schema
//!    ([`crate::schema::validate_transformer_schema`]);
//! 2. compare it against the schema mirrored in the template recipe
//!    ([`crate::schema::compare_schemas`]).
//!
//! Either failure aborts initialization for that template and the batch
//! with it. Once bound, [`BoundTransformer::expand_one`] performs the
//! per-parameter-file work: merge and type-check the caller's values,
//! check them against the transformer's declared [`ParameterShape`], and
//! invoke [`RecipeTransformer::transform`].

use std::any::Any;

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::core::{ComponentIdentifier, ReforgeError};
use crate::recipe::Recipe;
use crate::schema::{self, ParameterSchema};

/// Shape of the parameter record a transformer consumes.
///
/// The moral equivalent of the record type a transformer deserializes
/// its parameters into. [`ParameterShape::Any`] accepts any merged bag
/// (pure-substitution templates); [`ParameterShape::Record`] rejects
/// merged keys outside the named fields, the way deserializing into a
/// closed record would.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterShape {
    /// Accept any parameter bag.
    Any,
    /// Accept exactly the named fields.
    Record(Vec<String>),
}

impl ParameterShape {
    /// A closed record over the given field names.
    pub fn record<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Record(fields.into_iter().map(Into::into).collect())
    }

    /// Keys in `parameters` that this shape does not accept.
    fn rejected_keys(&self, parameters: &Map<String, Value>) -> Vec<String> {
        match self {
            Self::Any => Vec::new(),
            Self::Record(fields) => parameters
                .keys()
                .filter(|key| !fields.iter().any(|field| field == *key))
                .cloned()
                .collect(),
        }
    }
}

/// The merged, validated parameter bag handed to
/// [`RecipeTransformer::transform`].
///
/// Caller-supplied values overlaid on the schema's defaults; every value
/// already type-checked against the declared schema. Typed getters cover
/// the common cases; [`EffectiveParameters::deserialize_into`] converts
/// the whole bag into a transformer-defined record type.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveParameters {
    values: Map<String, Value>,
}

impl EffectiveParameters {
    /// Wrap a merged parameter bag.
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// The raw value of a parameter.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// String value of a parameter.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// Integer value of a parameter.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.values.get(key).and_then(Value::as_i64)
    }

    /// Boolean value of a parameter.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.get(key).and_then(Value::as_bool)
    }

    /// Whether the bag holds no parameters.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The bag as a JSON object.
    pub fn as_object(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Convert the bag into the object document form.
    pub fn to_value(&self) -> Value {
        Value::Object(self.values.clone())
    }

    /// Deserialize the whole bag into a transformer-defined record.
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.to_value())?)
    }
}

/// A transformer plugin: consumes parameter files, produces
/// fully-specified recipes.
///
/// One concrete implementation lives inside each template artifact;
/// the plugin host discovers and instantiates it. Implementations keep
/// state only for the template they were built for — `transform` itself
/// is stateless per parameter file.
pub trait RecipeTransformer {
    /// The authoritative parameter schema baked into the artifact.
    fn declared_schema(&self) -> ParameterSchema;

    /// The record shape `transform` expects its parameters in.
    ///
    /// Defaults to [`ParameterShape::Any`], which suits
    /// pure-substitution templates.
    fn parameter_shape(&self) -> ParameterShape {
        ParameterShape::Any
    }

    /// Produce the fully-specified recipe for one parameter file.
    ///
    /// `parameters` is already merged against the declared schema and
    /// type-checked; implementations may rely on every required field
    /// being present and of the declared type.
    fn transform(&self, param_file: &Recipe, parameters: &EffectiveParameters) -> Result<Recipe>;
}

/// A transformer bound to its declaring template.
///
/// Created by [`BoundTransformer::bind`] after the initialization
/// protocol succeeds. When the transformer came out of a dynamic
/// library, the value also owns the library scope; field order drops the
/// transformer before its scope is released.
pub struct BoundTransformer {
    transformer: Box<dyn RecipeTransformer>,
    schema: ParameterSchema,
    template: ComponentIdentifier,
    // Plugin scope guard; must outlive `transformer`, dropped after it.
    _scope: Option<Box<dyn Any>>,
}

impl std::fmt::Debug for BoundTransformer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundTransformer")
            .field("schema", &self.schema)
            .field("template", &self.template)
            .finish_non_exhaustive()
    }
}

impl BoundTransformer {
    /// Run the initialization protocol and bind `transformer` to its
    /// template recipe.
    ///
    /// # Errors
    ///
    /// [`ReforgeError::TemplateAuthoring`] if the declared schema
    /// violates the schema invariants;
    /// [`ReforgeError::SchemaMismatch`] if the template recipe mirrors a
    /// different schema (an absent recipe schema compares as empty).
    pub fn bind(transformer: Box<dyn RecipeTransformer>, template: &Recipe) -> Result<Self> {
        let declared = transformer.declared_schema();
        schema::validate_transformer_schema(&declared).map_err(|violations| {
            ReforgeError::TemplateAuthoring {
                template: template.component_name.clone(),
                violations,
            }
        })?;

        let mirrored = template.template_parameter_schema.clone().unwrap_or_default();
        let differences = schema::compare_schemas(&declared, &mirrored);
        if !differences.is_empty() {
            return Err(ReforgeError::SchemaMismatch {
                template: template.component_name.clone(),
                differences,
            }
            .into());
        }

        Ok(Self {
            transformer,
            schema: declared,
            template: template.identifier(),
            _scope: None,
        })
    }

    /// Attach the plugin scope guard that must stay alive as long as the
    /// transformer code is reachable.
    pub(crate) fn with_scope(mut self, scope: Box<dyn Any>) -> Self {
        self._scope = Some(scope);
        self
    }

    /// The template this transformer expands for.
    pub fn template(&self) -> &ComponentIdentifier {
        &self.template
    }

    /// The validated schema expansion runs against.
    pub fn schema(&self) -> &ParameterSchema {
        &self.schema
    }

    /// Expand one parameter file into its fully-specified recipe.
    ///
    /// Merges the parameter file's default configuration against the
    /// bound schema, checks the transformer's parameter shape, and
    /// invokes the transformer.
    ///
    /// # Errors
    ///
    /// [`ReforgeError::ParameterValidation`] if the caller's values fail
    /// the merge or the shape check;
    /// [`ReforgeError::TransformFailed`] if the transformer errors.
    pub fn expand_one(&self, param_file: &Recipe) -> Result<Recipe> {
        let component = param_file.component_name.clone();
        let caller_values = match param_file.default_configuration() {
            None => Map::new(),
            Some(Value::Object(values)) => values.clone(),
            Some(other) => {
                return Err(ReforgeError::ParameterValidation {
                    component,
                    violations: vec![format!(
                        "Default configuration must be a mapping of parameter names to values, got {}",
                        schema::value_kind(other)
                    )],
                }
                .into());
            }
        };

        let merged = schema::merge_parameters(&self.schema, &caller_values).map_err(|violations| {
            ReforgeError::ParameterValidation {
                component: component.clone(),
                violations,
            }
        })?;

        let rejected = self.transformer.parameter_shape().rejected_keys(&merged);
        if !rejected.is_empty() {
            return Err(ReforgeError::ParameterValidation {
                component,
                violations: rejected
                    .into_iter()
                    .map(|key| format!("Transformer parameter shape does not accept parameter: {key}"))
                    .collect(),
            }
            .into());
        }

        let parameters = EffectiveParameters::new(merged);
        self.transformer
            .transform(param_file, &parameters)
            .map_err(|source| {
                ReforgeError::TransformFailed {
                    component: param_file.component_name.clone(),
                    source: source.into(),
                }
                .into()
            })
    }
}
