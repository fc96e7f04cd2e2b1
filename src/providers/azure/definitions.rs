use log::{debug, info};

use super::client::AzureClient;
use super::types::BuildDefinition;
use crate::error::Result;

/// Resolve a configured pipeline name to its build definition.
///
/// A missing pipeline is an expected configuration state, not an error:
/// the result is `Ok(None)` and the miss is logged.
pub async fn find_definition(
    client: &AzureClient,
    project: &str,
    name: &str,
) -> Result<Option<BuildDefinition>> {
    let filtered = client.get_definitions(project, Some(name)).await?;
    if let Some(definition) = match_filtered(&filtered, name) {
        return Ok(Some(definition.clone()));
    }

    // The API's name filter is not guaranteed to return matches for
    // inexact queries, so trade request volume for completeness only when
    // the cheap path fails.
    debug!("No filtered match for '{name}', scanning the full definition list");
    let all = client.get_definitions(project, None).await?;
    match match_unfiltered(&all, name) {
        Some(definition) => Ok(Some(definition.clone())),
        None => {
            info!("No build definition matching '{name}' in project {project}");
            Ok(None)
        }
    }
}

/// Ordered matching against a name-filtered definition set: exact, then
/// case-insensitive, then substring (definition name contains the query).
fn match_filtered<'a>(
    definitions: &'a [BuildDefinition],
    name: &str,
) -> Option<&'a BuildDefinition> {
    let lowered = name.to_lowercase();
    definitions
        .iter()
        .find(|d| d.name == name)
        .or_else(|| definitions.iter().find(|d| d.name.to_lowercase() == lowered))
        .or_else(|| definitions.iter().find(|d| d.name.contains(name)))
}

/// Matching against the unfiltered definition list adds a reverse
/// substring tier: the query containing the definition name.
fn match_unfiltered<'a>(
    definitions: &'a [BuildDefinition],
    name: &str,
) -> Option<&'a BuildDefinition> {
    match_filtered(definitions, name)
        .or_else(|| definitions.iter().find(|d| name.contains(&d.name)))
}
