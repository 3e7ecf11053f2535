//! Reading and writing recipe documents.
//!
//! Recipes are exchanged in two encodings: YAML (the conventional
//! authoring format) and JSON. Parsing is strict — an unknown document
//! field or a malformed value fails with a [`ReforgeError::RecipeParse`]
//! naming the offending file. Generated recipes are persisted as YAML.

use std::fs;
use std::path::Path;

use anyhow::Result;

use crate::core::ReforgeError;
use crate::recipe::Recipe;

/// Supported recipe document encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeEncoding {
    /// YAML documents (`.yaml`, `.yml`, and the default for unknown
    /// extensions — YAML is a superset of JSON).
    Yaml,
    /// JSON documents (`.json`).
    Json,
}

/// Pick the encoding for a recipe file from its extension.
pub fn encoding_for(path: &Path) -> RecipeEncoding {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => RecipeEncoding::Json,
        _ => RecipeEncoding::Yaml,
    }
}

/// Parse one recipe file, choosing the encoding by extension.
///
/// # Errors
///
/// [`ReforgeError::StoreIo`] if the file cannot be read,
/// [`ReforgeError::RecipeParse`] if its content is not a valid recipe.
pub fn parse_file(path: &Path) -> Result<Recipe> {
    let content = fs::read_to_string(path).map_err(|source| ReforgeError::StoreIo {
        operation: "read".to_string(),
        path: path.to_path_buf(),
        source,
    })?;
    parse_str(&content, encoding_for(path)).map_err(|reason| {
        ReforgeError::RecipeParse {
            file: path.to_path_buf(),
            reason,
        }
        .into()
    })
}

/// Parse a recipe document from a string in the given encoding.
///
/// Returns the parser diagnostic on failure; callers attach the file
/// context.
pub fn parse_str(content: &str, encoding: RecipeEncoding) -> std::result::Result<Recipe, String> {
    match encoding {
        RecipeEncoding::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        RecipeEncoding::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
    }
}

/// Serialize a recipe to its persisted YAML form.
///
/// # Errors
///
/// [`ReforgeError::RecipeSerialize`] naming the component if the recipe
/// cannot be rendered.
pub fn serialize(recipe: &Recipe) -> Result<String> {
    serde_yaml::to_string(recipe).map_err(|e| {
        ReforgeError::RecipeSerialize {
            component: recipe.component_name.clone(),
            reason: e.to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ErrorKind, ReforgeError};
    use crate::recipe::{ComponentConfiguration, ComponentType, PlatformManifest, Recipe};
    use crate::schema::{ParameterSchema, ParameterType, TemplateParameter};

    const LOGGER_TEMPLATE_YAML: &str = r#"
RecipeFormatVersion: "2020-01-25"
ComponentName: LoggerTemplate
ComponentVersion: 1.0.0
ComponentType: template
TemplateParameterSchema:
  intervalInSecs:
    type: number
    required: true
  message:
    type: string
    required: false
    defaultValue: Ping pong
"#;

    #[test]
    fn test_parse_yaml_template_recipe() {
        let recipe = parse_str(LOGGER_TEMPLATE_YAML, RecipeEncoding::Yaml).unwrap();
        assert_eq!(recipe.component_name, "LoggerTemplate");
        assert!(recipe.is_template());
        let schema = recipe.template_parameter_schema.as_ref().unwrap();
        assert_eq!(schema.len(), 2);
        assert!(schema["intervalInSecs"].required);
        assert_eq!(
            schema["message"].default_value,
            Some(serde_json::Value::String("Ping pong".into()))
        );
    }

    #[test]
    fn test_parse_json_parameter_file() {
        let content = r#"{
            "RecipeFormatVersion": "2020-01-25",
            "ComponentName": "LoggerA",
            "ComponentVersion": "1.0.0",
            "ComponentDependencies": {
                "LoggerTemplate": { "VersionRequirement": "^1.0" }
            },
            "ComponentConfiguration": {
                "DefaultConfiguration": { "intervalInSecs": 5 }
            }
        }"#;
        let recipe = parse_str(content, RecipeEncoding::Json).unwrap();
        assert_eq!(recipe.component_dependencies.len(), 1);
        let params = recipe.default_configuration().unwrap();
        assert_eq!(params["intervalInSecs"], serde_json::json!(5));
    }

    #[test]
    fn test_unknown_field_is_a_parse_error() {
        let content = "RecipeFormatVersion: \"2020-01-25\"\nComponentName: A\nComponentVersion: 1.0.0\nComponentFlavor: spicy\n";
        assert!(parse_str(content, RecipeEncoding::Yaml).is_err());
    }

    #[test]
    fn test_round_trip_preserves_recipe() {
        let schema: ParameterSchema = [
            (
                "message".to_string(),
                TemplateParameter {
                    parameter_type: ParameterType::String,
                    required: false,
                    default_value: Some(serde_json::Value::String("Ping pong".into())),
                },
            ),
            (
                "intervalInSecs".to_string(),
                TemplateParameter {
                    parameter_type: ParameterType::Number,
                    required: true,
                    default_value: None,
                },
            ),
        ]
        .into_iter()
        .collect();

        let manifest = PlatformManifest {
            artifacts: vec![crate::recipe::ComponentArtifact {
                uri: "store:LoggerTemplate/1.2.3/transformer.so".to_string(),
                digest: Some("c2lnbmVk".to_string()),
                algorithm: Some("SHA-256".to_string()),
            }],
            ..Default::default()
        };
        let recipe = Recipe::new("LoggerTemplate", "1.2.3".parse().unwrap())
            .with_component_type(ComponentType::Template)
            .with_description("Expands logger components")
            .with_parameter_schema(schema)
            .with_manifest(manifest);

        let serialized = serialize(&recipe).unwrap();
        let reparsed = parse_str(&serialized, RecipeEncoding::Yaml).unwrap();
        assert_eq!(recipe, reparsed);
    }

    #[test]
    fn test_round_trip_preserves_generated_configuration() {
        let recipe = Recipe::new("LoggerA", "1.0.0".parse().unwrap())
            .with_configuration(ComponentConfiguration::with_defaults(serde_json::json!({
                "intervalInSecs": 5,
                "timestamp": false,
                "message": "Logger A says hi",
            })))
            .with_manifest(PlatformManifest::run_on_all_platforms(
                "sleep 5 && echo Logger A says hi",
            ));

        let reparsed =
            parse_str(&serialize(&recipe).unwrap(), RecipeEncoding::Yaml).unwrap();
        assert_eq!(recipe, reparsed);
    }

    #[test]
    fn test_parse_file_names_the_offending_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Broken-1.0.0.yaml");
        std::fs::write(&path, "ComponentName: [unclosed").unwrap();

        let err = parse_file(&path).unwrap_err();
        let reforge_err = err.downcast_ref::<ReforgeError>().unwrap();
        assert_eq!(reforge_err.kind(), ErrorKind::StoreIo);
        assert!(err.to_string().contains("Broken-1.0.0.yaml"));
    }
}
