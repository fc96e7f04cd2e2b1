use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::config::PipelineType;
use crate::providers::azure::types::{Build, ShallowTestCaseResult};

/// One configured application grouping, with its aggregated health.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub pipelines: Vec<PipelineSummary>,
    pub last_updated: DateTime<Utc>,
    pub overall_health: HealthStatus,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSummary {
    pub id: u32,
    pub name: String,
    #[serde(rename = "type")]
    pub pipeline_type: PipelineType,
    pub status: PipelineStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_run: Option<Build>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_results: Option<TestResultsSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_coverage: Option<CodeCoverageSummary>,
    /// Carried in the data model for the presentation layer; never computed here.
    pub quality_gates: Vec<QualityGateSummary>,
}

/// Coarse status of a pipeline's latest run. `Unknown` means the build
/// could not be resolved or fetched and must never be conflated with
/// `Failed`.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    Success,
    Failed,
    Running,
    Cancelled,
    Unknown,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestResultsSummary {
    pub total: u64,
    pub passed: u64,
    pub failed: u64,
    pub skipped: u64,
    /// Percentage; 0 when no tests ran.
    pub pass_rate: f64,
    /// Minutes, summed over runs with both timestamps.
    pub duration: f64,
}

/// Absent entirely (not zeroed) when a build published no line coverage.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CodeCoverageSummary {
    pub line_coverage: f64,
    pub branch_coverage: f64,
    pub function_coverage: f64,
    pub total_lines: u64,
    pub covered_lines: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QualityGateSummary {
    pub name: String,
    pub status: String,
    pub threshold: f64,
    pub actual: f64,
    pub unit: String,
}

/// Test results for one build, grouped by the assembly (DLL) that
/// produced them.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupedTestResults {
    pub total_tests: usize,
    pub test_groups: IndexMap<String, Vec<ShallowTestCaseResult>>,
}

/// Per-pipeline test scope of one application.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationTestScope {
    pub application: String,
    pub collected_at: DateTime<Utc>,
    pub pipelines: IndexMap<String, PipelineTestScope>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PipelineTestScope {
    pub test_results: Option<GroupedTestResults>,
    pub code_coverage: Option<CodeCoverageSummary>,
}
