//! Transformer artifact for `LoggerTemplate`.
//!
//! Expands a logger parameter file into a component that periodically
//! echoes a message: `sleep <intervalInSecs> && echo <message>`, with an
//! optional `` ; echo `date` `` suffix when `timestamp` is set.

use anyhow::Result;
use reforge::declare_transformers;
use reforge::recipe::{ComponentConfiguration, PlatformManifest, Recipe};
use reforge::schema::ParameterSchema;
use reforge::transformer::{EffectiveParameters, ParameterShape, RecipeTransformer};

const PARAMETER_SCHEMA: &str = r#"
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
"#;

struct LoggerTransformer;

impl RecipeTransformer for LoggerTransformer {
    fn declared_schema(&self) -> ParameterSchema {
        serde_yaml::from_str(PARAMETER_SCHEMA).expect("parameter schema is valid YAML")
    }

    fn parameter_shape(&self) -> ParameterShape {
        ParameterShape::record(["intervalInSecs", "timestamp", "message"])
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
        .with_manifest(PlatformManifest::run_on_all_platforms(run));
        recipe.component_description = param_file.component_description.clone();
        Ok(recipe)
    }
}

declare_transformers!(|| Box::new(LoggerTransformer));
