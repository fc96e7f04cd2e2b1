use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AdoLensError, Result};

/// A logical grouping of pipelines monitored as one health unit.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub project_id: String,
    pub pipelines: Vec<PipelineConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    /// Build definition id; resolved from `name` when absent.
    #[serde(default)]
    pub definition_id: Option<u32>,
    pub name: String,
    #[serde(rename = "type", default)]
    pub pipeline_type: PipelineType,
    #[serde(default)]
    pub build_filter: Option<BuildFilter>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineType {
    #[default]
    Build,
    Release,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildFilter {
    #[serde(default)]
    pub branch_name: Option<String>,
    /// How many recent builds to consider (defaults to 1).
    #[serde(default)]
    pub max_builds: Option<u32>,
}

/// Load the application grouping config from a JSON file.
pub fn load_applications(path: &Path) -> Result<Vec<ApplicationConfig>> {
    let contents = std::fs::read_to_string(path)?;
    let configs: Vec<ApplicationConfig> = serde_json::from_str(&contents)?;

    let errors = validate_applications(&configs);
    if errors.is_empty() {
        Ok(configs)
    } else {
        Err(AdoLensError::Config(errors.join("; ")))
    }
}

/// Checks performed before any network call is made.
pub fn validate_applications(configs: &[ApplicationConfig]) -> Vec<String> {
    let mut errors = Vec::new();

    for app in configs {
        if app.project_id.trim().is_empty() || app.project_id.contains("your-") {
            errors.push(format!(
                "Application \"{}\" has a missing or placeholder project id",
                app.name
            ));
        }

        if app.pipelines.is_empty() {
            errors.push(format!(
                "Application \"{}\" has no pipelines configured",
                app.name
            ));
        }

        for pipeline in &app.pipelines {
            if pipeline.name.trim().is_empty() {
                errors.push(format!(
                    "A pipeline in \"{}\" has an empty display name",
                    app.name
                ));
            }
            if pipeline.definition_id == Some(0) {
                errors.push(format!(
                    "Pipeline \"{}\" in \"{}\" has an invalid definition id",
                    pipeline.name, app.name
                ));
            }
        }
    }

    errors
}
