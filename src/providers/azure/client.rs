use std::time::Duration;

use log::{debug, warn};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use super::types::{
    Build, BuildDefinition, CodeCoverageData, ListResponse, Project, ShallowTestCaseResult,
    TestRun,
};
use crate::auth::Token;
use crate::error::{AdoLensError, Result};

const API_VERSION: &str = "7.2-preview.1";

// Bounded retry for 429 / 5xx / network failures: 3 retries after the
// initial attempt, with the pacing delay below between attempts.
const MAX_RETRIES: u32 = 3;
const BASE_DELAY_MS: u64 = 100;
const MAX_DELAY_MS: u64 = 2000;

pub struct AzureClient {
    client: Client,
    org_url: Url,
    token: Token,
}

/// Pre-call pacing delay, doubling per attempt and capped. Applied before
/// every request, including the first, to keep the request rate down.
fn pacing_delay(attempt: u32) -> Duration {
    let millis = BASE_DELAY_MS
        .saturating_mul(2u64.saturating_pow(attempt.min(16)))
        .min(MAX_DELAY_MS);
    Duration::from_millis(millis)
}

impl AzureClient {
    pub fn new(base_url: &str, organization: &str, token: Token) -> Result<Self> {
        if organization.trim().is_empty() {
            return Err(AdoLensError::Config(
                "Organization name must not be empty".to_string(),
            ));
        }
        if token.as_str().trim().is_empty() {
            return Err(AdoLensError::Config(
                "Personal access token must not be empty".to_string(),
            ));
        }

        let client = Client::builder()
            .user_agent("adolens/0.1.0")
            .build()
            .map_err(|e| AdoLensError::Config(format!("Failed to create HTTP client: {e}")))?;

        let org_url = Url::parse(base_url)
            .map_err(|e| AdoLensError::Config(format!("Invalid base URL: {e}")))?
            .join(&format!("{}/", urlencoding::encode(organization)))
            .map_err(|e| AdoLensError::Config(format!("Invalid organization URL: {e}")))?;

        Ok(Self {
            client,
            org_url,
            token,
        })
    }

    /// Construct a URL scoped to one project.
    fn project_url(&self, project: &str, path: &str) -> Result<Url> {
        self.org_url
            .join(&format!("{}/{path}", urlencoding::encode(project)))
            .map_err(|e| AdoLensError::Config(format!("Invalid project URL: {e}")))
    }

    /// Issue one logical GET against the API and decode the JSON payload.
    ///
    /// 401/403/404 surface immediately as typed errors; 429, 5xx and
    /// network failures are retried with exponential backoff until the
    /// retry budget is spent.
    async fn get_json<T: DeserializeOwned>(&self, url: Url, query: &[(&str, String)]) -> Result<T> {
        let endpoint = url.path().to_string();

        for attempt in 0..=MAX_RETRIES {
            tokio::time::sleep(pacing_delay(attempt)).await;

            debug!("GET {endpoint} (attempt {attempt})");

            let request = self
                .client
                .get(url.clone())
                .query(&[("api-version", API_VERSION)])
                .query(query)
                .basic_auth("", Some(self.token.as_str()));

            let response = match request.send().await {
                Ok(response) => response,
                Err(err) if attempt < MAX_RETRIES => {
                    warn!("Network error on {endpoint}, retrying: {err}");
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            let status = response.status();
            if status == StatusCode::UNAUTHORIZED {
                return Err(AdoLensError::Unauthorized(endpoint));
            } else if status == StatusCode::FORBIDDEN {
                return Err(AdoLensError::Forbidden(endpoint));
            } else if status == StatusCode::NOT_FOUND {
                return Err(AdoLensError::NotFound(endpoint));
            } else if status == StatusCode::TOO_MANY_REQUESTS {
                if attempt < MAX_RETRIES {
                    warn!("Rate limited on {endpoint}, retrying");
                    continue;
                }
                return Err(AdoLensError::RateLimited(endpoint));
            } else if status.is_server_error() {
                if attempt < MAX_RETRIES {
                    warn!("Server error {status} on {endpoint}, retrying");
                    continue;
                }
                return Err(AdoLensError::Api(format!(
                    "{endpoint} returned {status} after {MAX_RETRIES} retries"
                )));
            } else if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(AdoLensError::Api(format!("{endpoint}: {status} - {body}")));
            } else {
                return Ok(response.json::<T>().await?);
            }
        }

        // The loop always returns; the retry arms only continue while
        // attempts remain.
        Err(AdoLensError::RateLimited(endpoint))
    }

    /// List the projects reachable in the organization.
    pub async fn get_projects(&self) -> Result<Vec<Project>> {
        let url = self
            .org_url
            .join("_apis/projects")
            .map_err(|e| AdoLensError::Config(format!("Invalid projects URL: {e}")))?;
        let response: ListResponse<Project> = self.get_json(url, &[]).await?;
        Ok(response.value)
    }

    /// List build definitions, optionally filtered by name.
    pub async fn get_definitions(
        &self,
        project: &str,
        name: Option<&str>,
    ) -> Result<Vec<BuildDefinition>> {
        let url = self.project_url(project, "_apis/build/definitions")?;
        let mut query = Vec::new();
        if let Some(name) = name {
            query.push(("name", name.to_string()));
        }
        let response: ListResponse<BuildDefinition> = self.get_json(url, &query).await?;
        Ok(response.value)
    }

    /// Fetch the most recent builds of one definition, newest first.
    pub async fn get_builds(
        &self,
        project: &str,
        definition_id: u32,
        max_builds: u32,
        branch: Option<&str>,
    ) -> Result<Vec<Build>> {
        let url = self.project_url(project, "_apis/build/builds")?;
        let mut query = vec![
            ("definitions", definition_id.to_string()),
            ("$top", max_builds.to_string()),
        ];
        if let Some(branch) = branch {
            query.push(("branchName", branch.to_string()));
        }
        let response: ListResponse<Build> = self.get_json(url, &query).await?;
        Ok(response.value)
    }

    /// Fetch the test runs published for one build.
    pub async fn get_test_runs(&self, project: &str, build_id: u32) -> Result<Vec<TestRun>> {
        let url = self.project_url(project, "_apis/test/runs")?;
        let query = [("buildIds", build_id.to_string())];
        let response: ListResponse<TestRun> = self.get_json(url, &query).await?;
        Ok(response.value)
    }

    /// Fetch the coverage payload for one build. Coverage is an optional
    /// facet of a build; a missing payload is `None`, not an error.
    pub async fn get_code_coverage(
        &self,
        project: &str,
        build_id: u32,
    ) -> Result<Option<CodeCoverageData>> {
        let url = self.project_url(project, &format!("_apis/build/builds/{build_id}/coverage"))?;
        match self.get_json::<CodeCoverageData>(url, &[]).await {
            Ok(coverage) => Ok(Some(coverage)),
            Err(AdoLensError::NotFound(endpoint)) => {
                debug!("No coverage published for build {build_id} ({endpoint})");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Fetch the flat per-test-case results for one build.
    pub async fn get_test_results_by_build(
        &self,
        project: &str,
        build_id: u32,
    ) -> Result<Vec<ShallowTestCaseResult>> {
        let url = self.project_url(project, "_apis/test/resultsbybuild")?;
        let query = [("buildId", build_id.to_string())];
        let response: ListResponse<ShallowTestCaseResult> = self.get_json(url, &query).await?;
        Ok(response.value)
    }
}
