//! Raw Azure DevOps REST API records, trimmed to the fields this tool
//! consumes. List endpoints wrap their payload in a `value` envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response envelope used by Azure DevOps list endpoints.
#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BuildDefinition {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BuildStatus {
    None,
    InProgress,
    Completed,
    Cancelling,
    Postponed,
    NotStarted,
    All,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BuildResult {
    None,
    Succeeded,
    PartiallySucceeded,
    Failed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

/// One execution instance of a pipeline definition.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Build {
    pub id: u32,
    #[serde(default)]
    pub build_number: Option<String>,
    pub status: BuildStatus,
    #[serde(default)]
    pub result: Option<BuildResult>,
    #[serde(default)]
    pub queue_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finish_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub source_branch: Option<String>,
    #[serde(default)]
    pub source_version: Option<String>,
}

/// A batch of test executions tied to a build.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestRun {
    pub id: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub started_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub run_statistics: Vec<RunStatistic>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunStatistic {
    pub outcome: TestOutcome,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TestOutcome {
    Passed,
    Failed,
    NotExecuted,
    Blocked,
    #[serde(other)]
    Other,
}

/// Raw coverage payload for one build. Unlike the list endpoints this is
/// returned bare, not wrapped in a `value` envelope.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CodeCoverageData {
    #[serde(default)]
    pub coverage_data: Vec<CoverageData>,
    #[serde(default)]
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CoverageData {
    #[serde(default)]
    pub coverage_stats: Vec<CoverageStats>,
}

/// A labeled covered/total pair (Lines, Branches or Functions).
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CoverageStats {
    pub label: String,
    pub total: u64,
    pub covered: u64,
}

/// Flat per-test-case record, used for the by-assembly test scope view.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShallowTestCaseResult {
    pub id: u32,
    #[serde(default)]
    pub run_id: Option<u32>,
    #[serde(default)]
    pub test_case_title: Option<String>,
    #[serde(default)]
    pub automated_test_name: Option<String>,
    #[serde(default)]
    pub automated_test_storage: Option<String>,
    #[serde(default)]
    pub outcome: Option<String>,
    #[serde(default)]
    pub priority: Option<i32>,
    #[serde(default)]
    pub duration_in_ms: Option<f64>,
}
