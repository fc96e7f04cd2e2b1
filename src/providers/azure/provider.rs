use chrono::Utc;
use futures::future::join_all;
use log::{error, info, warn};

use super::client::AzureClient;
use super::definitions::find_definition;
use super::grouping::group_by_test_storage;
use super::summary::{classify_build, classify_health, summarize_coverage, summarize_test_runs};
use super::types::Project;
use crate::auth::Token;
use crate::config::{ApplicationConfig, PipelineConfig};
use crate::error::Result;
use crate::models::{
    Application, ApplicationTestScope, PipelineStatus, PipelineSummary, PipelineTestScope,
};

pub struct AzureDevOpsProvider {
    client: AzureClient,
}

/// Summary for a pipeline whose build could not be resolved or fetched.
fn unknown_summary(pipeline: &PipelineConfig, definition_id: u32) -> PipelineSummary {
    PipelineSummary {
        id: definition_id,
        name: pipeline.name.clone(),
        pipeline_type: pipeline.pipeline_type,
        status: PipelineStatus::Unknown,
        last_run: None,
        test_results: None,
        code_coverage: None,
        quality_gates: Vec::new(),
    }
}

impl AzureDevOpsProvider {
    pub fn new(base_url: &str, organization: &str, token: Token) -> Result<Self> {
        let client = AzureClient::new(base_url, organization, token)?;
        Ok(Self { client })
    }

    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        self.client.get_projects().await
    }

    /// One aggregation pass over every configured application.
    pub async fn fetch_applications(&self, configs: &[ApplicationConfig]) -> Vec<Application> {
        join_all(configs.iter().map(|config| self.fetch_application(config))).await
    }

    pub async fn fetch_application(&self, config: &ApplicationConfig) -> Application {
        info!(
            "Aggregating application '{}' ({} pipelines)",
            config.name,
            config.pipelines.len()
        );

        let pipelines = join_all(
            config
                .pipelines
                .iter()
                .map(|pipeline| self.fetch_pipeline(config, pipeline)),
        )
        .await;

        let overall_health = classify_health(&pipelines);

        Application {
            id: config.id.clone(),
            name: config.name.clone(),
            description: config.description.clone(),
            pipelines,
            last_updated: Utc::now(),
            overall_health,
        }
    }

    /// One bad pipeline must not abort its siblings: every failure here
    /// degrades to an unknown-status summary.
    async fn fetch_pipeline(
        &self,
        app: &ApplicationConfig,
        pipeline: &PipelineConfig,
    ) -> PipelineSummary {
        match self.try_fetch_pipeline(app, pipeline).await {
            Ok(summary) => summary,
            Err(err) => {
                error!("Failed to fetch pipeline data for '{}': {err}", pipeline.name);
                unknown_summary(pipeline, pipeline.definition_id.unwrap_or(0))
            }
        }
    }

    async fn resolve_definition_id(
        &self,
        project: &str,
        pipeline: &PipelineConfig,
    ) -> Result<Option<u32>> {
        if let Some(id) = pipeline.definition_id {
            return Ok(Some(id));
        }
        let definition = find_definition(&self.client, project, &pipeline.name).await?;
        Ok(definition.map(|d| d.id))
    }

    async fn try_fetch_pipeline(
        &self,
        app: &ApplicationConfig,
        pipeline: &PipelineConfig,
    ) -> Result<PipelineSummary> {
        let Some(definition_id) = self.resolve_definition_id(&app.project_id, pipeline).await?
        else {
            warn!(
                "Pipeline '{}' could not be resolved in project {}",
                pipeline.name, app.project_id
            );
            return Ok(unknown_summary(pipeline, 0));
        };

        let filter = pipeline.build_filter.as_ref();
        let max_builds = filter.and_then(|f| f.max_builds).unwrap_or(1);
        let branch = filter.and_then(|f| f.branch_name.as_deref());

        let builds = self
            .client
            .get_builds(&app.project_id, definition_id, max_builds, branch)
            .await?;

        let Some(latest) = builds.into_iter().next() else {
            info!("No builds found for pipeline '{}'", pipeline.name);
            return Ok(unknown_summary(pipeline, definition_id));
        };

        // Test runs and coverage both key off the build id alone; fetch
        // them concurrently.
        let (test_runs, coverage) = tokio::join!(
            self.client.get_test_runs(&app.project_id, latest.id),
            self.client.get_code_coverage(&app.project_id, latest.id),
        );

        let test_results = summarize_test_runs(&test_runs?);
        let code_coverage = coverage?.as_ref().and_then(summarize_coverage);
        let status = classify_build(Some(&latest));

        Ok(PipelineSummary {
            id: definition_id,
            name: pipeline.name.clone(),
            pipeline_type: pipeline.pipeline_type,
            status,
            last_run: Some(latest),
            test_results,
            code_coverage,
            quality_gates: Vec::new(),
        })
    }

    /// Per-pipeline test scope of one application: the latest build's
    /// results grouped by assembly, plus its coverage summary.
    pub async fn fetch_test_scope(&self, config: &ApplicationConfig) -> ApplicationTestScope {
        let scopes = join_all(
            config
                .pipelines
                .iter()
                .map(|pipeline| self.fetch_pipeline_scope(config, pipeline)),
        )
        .await;

        let pipelines = config
            .pipelines
            .iter()
            .map(|pipeline| pipeline.name.clone())
            .zip(scopes)
            .collect();

        ApplicationTestScope {
            application: config.id.clone(),
            collected_at: Utc::now(),
            pipelines,
        }
    }

    async fn fetch_pipeline_scope(
        &self,
        app: &ApplicationConfig,
        pipeline: &PipelineConfig,
    ) -> PipelineTestScope {
        match self.try_fetch_pipeline_scope(app, pipeline).await {
            Ok(scope) => scope,
            Err(err) => {
                error!("Failed to fetch test scope for '{}': {err}", pipeline.name);
                PipelineTestScope {
                    test_results: None,
                    code_coverage: None,
                }
            }
        }
    }

    async fn try_fetch_pipeline_scope(
        &self,
        app: &ApplicationConfig,
        pipeline: &PipelineConfig,
    ) -> Result<PipelineTestScope> {
        let empty = PipelineTestScope {
            test_results: None,
            code_coverage: None,
        };

        let Some(definition_id) = self.resolve_definition_id(&app.project_id, pipeline).await?
        else {
            warn!(
                "Pipeline '{}' could not be resolved in project {}",
                pipeline.name, app.project_id
            );
            return Ok(empty);
        };

        let branch = pipeline
            .build_filter
            .as_ref()
            .and_then(|f| f.branch_name.as_deref());
        let builds = self
            .client
            .get_builds(&app.project_id, definition_id, 1, branch)
            .await?;

        let Some(latest) = builds.into_iter().next() else {
            return Ok(empty);
        };

        let (results, coverage) = tokio::join!(
            self.client.get_test_results_by_build(&app.project_id, latest.id),
            self.client.get_code_coverage(&app.project_id, latest.id),
        );

        Ok(PipelineTestScope {
            test_results: Some(group_by_test_storage(results?)),
            code_coverage: coverage?.as_ref().and_then(summarize_coverage),
        })
    }
}
