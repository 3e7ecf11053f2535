//! Parameter schema engine.
//!
//! A template declares the parameters it accepts as a mapping from field
//! name to [`TemplateParameter`]: a declared [`ParameterType`], whether
//! the field is required, and — for optional fields — a default value.
//! The schema appears in two places that must agree: baked into the
//! template's transformer artifact (authoritative) and mirrored in the
//! template recipe (visible to humans and tooling). This module owns
//! both sides of that contract:
//!
//! - [`validate_transformer_schema`] — per-field invariants on the
//!   artifact-declared schema.
//! - [`compare_schemas`] — field-for-field equivalence of the two
//!   declarations.
//! - [`merge_parameters`] — overlay caller-supplied values on declared
//!   defaults and type-check the result.
//! - [`value_kind`] — dynamic typing of document values.
//!
//! Every operation aggregates *all* violations it finds rather than
//! stopping at the first, so a template author sees the complete list in
//! a single failed run. Parameter keys are case-sensitive throughout: a
//! caller key `NumberParam` does not satisfy a schema key `numberParam`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Parameter schema of a template: field name → declaration.
pub type ParameterSchema = BTreeMap<String, TemplateParameter>;

/// Declared type of a template parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    /// Text value.
    String,
    /// Integral or floating numeric value.
    Number,
    /// Nested mapping.
    Object,
    /// Sequence of values.
    Array,
    /// True/false.
    Boolean,
}

impl ParameterType {
    /// Whether a dynamic value of `kind` satisfies this declared type.
    pub fn accepts(&self, kind: ValueKind) -> bool {
        matches!(
            (self, kind),
            (Self::String, ValueKind::String)
                | (Self::Number, ValueKind::Number)
                | (Self::Object, ValueKind::Object)
                | (Self::Array, ValueKind::Array)
                | (Self::Boolean, ValueKind::Boolean)
        )
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Object => "object",
            Self::Array => "array",
            Self::Boolean => "boolean",
        };
        f.write_str(name)
    }
}

/// Dynamic type of a document value.
///
/// Integral and floating values are both [`ValueKind::Number`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Text value.
    String,
    /// Numeric value, integral or floating.
    Number,
    /// Nested mapping.
    Object,
    /// Sequence of values.
    Array,
    /// True/false.
    Boolean,
    /// Explicit null.
    Null,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Object => "object",
            Self::Array => "array",
            Self::Boolean => "boolean",
            Self::Null => "null",
        };
        f.write_str(name)
    }
}

/// The dynamic type of a document value.
pub fn value_kind(value: &Value) -> ValueKind {
    match value {
        Value::String(_) => ValueKind::String,
        Value::Number(_) => ValueKind::Number,
        Value::Object(_) => ValueKind::Object,
        Value::Array(_) => ValueKind::Array,
        Value::Bool(_) => ValueKind::Boolean,
        Value::Null => ValueKind::Null,
    }
}

/// Declaration of one template parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateParameter {
    /// Declared value type.
    #[serde(rename = "type")]
    pub parameter_type: ParameterType,
    /// Whether the caller must supply this field. Required fields carry
    /// no default; optional fields must carry one.
    #[serde(default)]
    pub required: bool,
    /// Default value for optional fields.
    #[serde(rename = "defaultValue", default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

impl TemplateParameter {
    /// A required parameter of the given type.
    pub fn required(parameter_type: ParameterType) -> Self {
        Self {
            parameter_type,
            required: true,
            default_value: None,
        }
    }

    /// An optional parameter with a default value.
    pub fn optional(parameter_type: ParameterType, default_value: Value) -> Self {
        Self {
            parameter_type,
            required: false,
            default_value: Some(default_value),
        }
    }
}

impl fmt::Display for TemplateParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.required {
            write!(f, "{} (required)", self.parameter_type)
        } else {
            match &self.default_value {
                Some(default) => write!(f, "{} (optional, default {default})", self.parameter_type),
                None => write!(f, "{} (optional)", self.parameter_type),
            }
        }
    }
}

/// Check the per-field invariants of a transformer-declared schema.
///
/// - a required field must not carry a default value;
/// - an optional field must carry one;
/// - an optional field's default must be of the declared type.
///
/// # Errors
///
/// The list of all violations; callers wrap it into a
/// template-authoring error.
pub fn validate_transformer_schema(schema: &ParameterSchema) -> Result<(), Vec<String>> {
    let mut violations = Vec::new();
    for (key, parameter) in schema {
        if parameter.required {
            if parameter.default_value.is_some() {
                violations.push(format!("Provided default value for required field: {key}"));
            }
            continue;
        }
        match &parameter.default_value {
            None => {
                violations.push(format!("Did not provide default value for optional field: {key}"));
            }
            Some(default) => {
                let kind = value_kind(default);
                if !parameter.parameter_type.accepts(kind) {
                    violations.push(format!(
                        "Template value for \"{key}\" does not match schema. Expected {} but got {kind}",
                        parameter.parameter_type
                    ));
                }
            }
        }
    }
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// Compare the transformer-declared schema against the schema mirrored
/// in the template recipe.
///
/// Returns one entry per difference: fields the recipe is missing,
/// fields it declares that the transformer does not, and fields whose
/// `(type, required, defaultValue)` tuples disagree. Empty means the two
/// declarations are equivalent.
pub fn compare_schemas(from_artifact: &ParameterSchema, from_recipe: &ParameterSchema) -> Vec<String> {
    let mut differences = Vec::new();
    for (key, declared) in from_artifact {
        match from_recipe.get(key) {
            None => differences.push(format!("Missing parameter: {key}")),
            Some(mirrored) if mirrored != declared => {
                differences.push(format!(
                    "Template value for \"{key}\" does not match schema. Expected {declared} but got {mirrored}"
                ));
            }
            Some(_) => {}
        }
    }
    for key in from_recipe.keys() {
        if !from_artifact.contains_key(key) {
            differences.push(format!("Template declared parameter not found in schema: {key}"));
        }
    }
    differences
}

/// Overlay caller-supplied values on the schema's defaults and
/// type-check the result.
///
/// For each schema field: a caller value of the declared type wins;
/// otherwise an optional field falls back to its default, and a missing
/// required field is a violation. Caller keys absent from the schema and
/// caller values of the wrong type are violations too. Matching is
/// case-sensitive.
///
/// # Errors
///
/// The list of all violations; callers wrap it into a
/// parameter-validation error.
pub fn merge_parameters(
    schema: &ParameterSchema,
    caller_values: &Map<String, Value>,
) -> Result<Map<String, Value>, Vec<String>> {
    let mut merged = caller_values.clone();
    for (key, parameter) in schema {
        if !merged.contains_key(key) {
            if let Some(default) = &parameter.default_value {
                merged.insert(key.clone(), default.clone());
            }
        }
    }

    let mut violations = Vec::new();
    for (key, parameter) in schema {
        match merged.get(key) {
            // Defaults are validated at template-binding time, so a hole
            // here can only be a missing required parameter.
            None => violations.push(format!("Configuration does not specify required parameter: {key}")),
            Some(value) => {
                let kind = value_kind(value);
                if !parameter.parameter_type.accepts(kind) {
                    violations.push(format!(
                        "Provided parameter \"{key}\" does not satisfy required schema. Expected {} but got {kind}",
                        parameter.parameter_type
                    ));
                }
            }
        }
    }
    for key in merged.keys() {
        if !schema.contains_key(key) {
            violations.push(format!("Configuration declared parameter not found in schema: {key}"));
        }
    }

    if violations.is_empty() {
        Ok(merged)
    } else {
        Err(violations)
    }
}
