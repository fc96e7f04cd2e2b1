//! Reduction of raw test-run and coverage records into the
//! presentation-ready summaries, plus run-status and health
//! classification.

use super::types::{
    Build, BuildResult, BuildStatus, CodeCoverageData, CoverageStats, TestOutcome, TestRun,
};
use crate::models::{
    CodeCoverageSummary, HealthStatus, PipelineStatus, PipelineSummary, TestResultsSummary,
};

/// Accumulate every run statistic across the build's test runs. `None`
/// when the build published no test runs at all.
pub fn summarize_test_runs(test_runs: &[TestRun]) -> Option<TestResultsSummary> {
    if test_runs.is_empty() {
        return None;
    }

    let mut total = 0u64;
    let mut passed = 0u64;
    let mut failed = 0u64;
    let mut skipped = 0u64;

    for run in test_runs {
        for stat in &run.run_statistics {
            match stat.outcome {
                TestOutcome::Passed => passed += stat.count,
                TestOutcome::Failed => failed += stat.count,
                TestOutcome::NotExecuted | TestOutcome::Blocked => skipped += stat.count,
                TestOutcome::Other => {}
            }
            total += stat.count;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let pass_rate = if total > 0 {
        (passed as f64 / total as f64) * 100.0
    } else {
        0.0
    };

    // Only runs with both timestamps contribute to the duration.
    #[allow(clippy::cast_precision_loss)]
    let duration = test_runs
        .iter()
        .filter_map(|run| match (run.started_date, run.completed_date) {
            (Some(started), Some(completed)) => {
                Some((completed - started).num_milliseconds() as f64 / 60_000.0)
            }
            _ => None,
        })
        .sum();

    Some(TestResultsSummary {
        total,
        passed,
        failed,
        skipped,
        pass_rate,
        duration,
    })
}

#[allow(clippy::cast_precision_loss)]
fn coverage_percentage(stat: &CoverageStats) -> f64 {
    if stat.total > 0 {
        (stat.covered as f64 / stat.total as f64) * 100.0
    } else {
        0.0
    }
}

/// Reduce the first coverage record of a build's payload. A payload
/// without a "Lines" statistic means no usable coverage was published;
/// that is `None`, which is distinct from zero coverage.
pub fn summarize_coverage(coverage: &CodeCoverageData) -> Option<CodeCoverageSummary> {
    let record = coverage.coverage_data.first()?;
    let stat = |label: &str| record.coverage_stats.iter().find(|s| s.label == label);

    let lines = stat("Lines")?;

    Some(CodeCoverageSummary {
        line_coverage: coverage_percentage(lines),
        branch_coverage: stat("Branches").map(coverage_percentage).unwrap_or(0.0),
        function_coverage: stat("Functions").map(coverage_percentage).unwrap_or(0.0),
        total_lines: lines.total,
        covered_lines: lines.covered,
    })
}

/// Coarse run status of a pipeline from its latest build. A build that
/// could not be resolved or fetched is `Unknown`, never `Failed`.
pub fn classify_build(build: Option<&Build>) -> PipelineStatus {
    let Some(build) = build else {
        return PipelineStatus::Unknown;
    };

    match build.status {
        BuildStatus::Completed => {
            if build.result == Some(BuildResult::Succeeded) {
                PipelineStatus::Success
            } else {
                PipelineStatus::Failed
            }
        }
        BuildStatus::InProgress => PipelineStatus::Running,
        BuildStatus::Cancelling => PipelineStatus::Cancelled,
        _ => PipelineStatus::Unknown,
    }
}

/// Overall application health. Precedence is fixed: critical when any
/// pipeline failed, else warning when any is still running, else healthy.
/// Unknown and cancelled pipelines do not escalate health on their own.
pub fn classify_health(pipelines: &[PipelineSummary]) -> HealthStatus {
    if pipelines.iter().any(|p| p.status == PipelineStatus::Failed) {
        HealthStatus::Critical
    } else if pipelines.iter().any(|p| p.status == PipelineStatus::Running) {
        HealthStatus::Warning
    } else {
        HealthStatus::Healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineType;
    use crate::providers::azure::types::{CoverageData, RunStatistic};
    use chrono::{Duration, TimeZone, Utc};

    fn run_with_stats(stats: Vec<(TestOutcome, u64)>) -> TestRun {
        TestRun {
            id: 1,
            name: None,
            state: Some("completed".to_string()),
            started_date: None,
            completed_date: None,
            run_statistics: stats
                .into_iter()
                .map(|(outcome, count)| RunStatistic { outcome, count })
                .collect(),
        }
    }

    fn build_with(status: BuildStatus, result: Option<BuildResult>) -> Build {
        Build {
            id: 42,
            build_number: Some("20240901.1".to_string()),
            status,
            result,
            queue_time: None,
            start_time: None,
            finish_time: None,
            source_branch: Some("refs/heads/main".to_string()),
            source_version: None,
        }
    }

    fn summary_with_status(status: PipelineStatus) -> PipelineSummary {
        PipelineSummary {
            id: 1,
            name: "p".to_string(),
            pipeline_type: PipelineType::Build,
            status,
            last_run: None,
            test_results: None,
            code_coverage: None,
            quality_gates: Vec::new(),
        }
    }

    fn coverage_with(stats: Vec<(&str, u64, u64)>) -> CodeCoverageData {
        CodeCoverageData {
            coverage_data: vec![CoverageData {
                coverage_stats: stats
                    .into_iter()
                    .map(|(label, covered, total)| CoverageStats {
                        label: label.to_string(),
                        covered,
                        total,
                    })
                    .collect(),
            }],
            last_error: None,
        }
    }

    #[test]
    fn test_statistics_accumulate_into_buckets() {
        let runs = vec![run_with_stats(vec![
            (TestOutcome::Passed, 238),
            (TestOutcome::Failed, 3),
            (TestOutcome::NotExecuted, 4),
        ])];

        let summary = summarize_test_runs(&runs).unwrap();
        assert_eq!(summary.total, 245);
        assert_eq!(summary.passed, 238);
        assert_eq!(summary.failed, 3);
        assert_eq!(summary.skipped, 4);
        assert!((summary.pass_rate - 97.142_857).abs() < 0.001);
    }

    #[test]
    fn test_blocked_counts_as_skipped_and_other_outcomes_count_toward_total() {
        let runs = vec![run_with_stats(vec![
            (TestOutcome::Passed, 10),
            (TestOutcome::Blocked, 2),
            (TestOutcome::Other, 3),
        ])];

        let summary = summarize_test_runs(&runs).unwrap();
        assert_eq!(summary.total, 15);
        assert_eq!(summary.skipped, 2);
    }

    #[test]
    fn test_zero_total_yields_zero_pass_rate() {
        let runs = vec![run_with_stats(vec![])];

        let summary = summarize_test_runs(&runs).unwrap();
        assert_eq!(summary.total, 0);
        assert_eq!(summary.pass_rate, 0.0);
    }

    #[test]
    fn test_no_runs_yields_no_summary() {
        assert!(summarize_test_runs(&[]).is_none());
    }

    #[test]
    fn test_duration_sums_only_runs_with_both_timestamps() {
        let started = Utc.with_ymd_and_hms(2024, 9, 1, 12, 0, 0).unwrap();
        let mut timed = run_with_stats(vec![(TestOutcome::Passed, 1)]);
        timed.started_date = Some(started);
        timed.completed_date = Some(started + Duration::minutes(30));

        let mut unfinished = run_with_stats(vec![(TestOutcome::Passed, 1)]);
        unfinished.started_date = Some(started);

        let summary = summarize_test_runs(&[timed, unfinished]).unwrap();
        assert!((summary.duration - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_coverage_percentages() {
        let coverage = coverage_with(vec![
            ("Lines", 13452, 15420),
            ("Branches", 900, 1000),
            ("Functions", 450, 500),
        ]);

        let summary = summarize_coverage(&coverage).unwrap();
        assert!((summary.line_coverage - 87.237_354).abs() < 0.001);
        assert!((summary.branch_coverage - 90.0).abs() < f64::EPSILON);
        assert!((summary.function_coverage - 90.0).abs() < f64::EPSILON);
        assert_eq!(summary.total_lines, 15420);
        assert_eq!(summary.covered_lines, 13452);
    }

    #[test]
    fn test_lines_only_coverage_zeroes_other_categories() {
        let coverage = coverage_with(vec![("Lines", 13452, 15420)]);

        let summary = summarize_coverage(&coverage).unwrap();
        assert!(summary.line_coverage > 87.0);
        assert_eq!(summary.branch_coverage, 0.0);
        assert_eq!(summary.function_coverage, 0.0);
    }

    #[test]
    fn test_missing_lines_statistic_means_no_summary() {
        let coverage = coverage_with(vec![("Branches", 900, 1000)]);
        assert!(summarize_coverage(&coverage).is_none());
    }

    #[test]
    fn test_empty_coverage_payload_means_no_summary() {
        let coverage = CodeCoverageData {
            coverage_data: Vec::new(),
            last_error: None,
        };
        assert!(summarize_coverage(&coverage).is_none());
    }

    #[test]
    fn test_completed_succeeded_is_success() {
        let build = build_with(BuildStatus::Completed, Some(BuildResult::Succeeded));
        assert_eq!(classify_build(Some(&build)), PipelineStatus::Success);
    }

    #[test]
    fn test_completed_with_any_other_result_is_failed() {
        for result in [
            Some(BuildResult::Failed),
            Some(BuildResult::PartiallySucceeded),
            Some(BuildResult::Cancelled),
            None,
        ] {
            let build = build_with(BuildStatus::Completed, result);
            assert_eq!(classify_build(Some(&build)), PipelineStatus::Failed);
        }
    }

    #[test]
    fn test_in_progress_is_running_and_cancelling_is_cancelled() {
        let running = build_with(BuildStatus::InProgress, None);
        assert_eq!(classify_build(Some(&running)), PipelineStatus::Running);

        let cancelling = build_with(BuildStatus::Cancelling, None);
        assert_eq!(classify_build(Some(&cancelling)), PipelineStatus::Cancelled);
    }

    #[test]
    fn test_no_build_is_unknown_not_failed() {
        assert_eq!(classify_build(None), PipelineStatus::Unknown);

        let postponed = build_with(BuildStatus::Postponed, None);
        assert_eq!(classify_build(Some(&postponed)), PipelineStatus::Unknown);
    }

    #[test]
    fn test_any_failed_pipeline_is_critical() {
        let pipelines = vec![
            summary_with_status(PipelineStatus::Success),
            summary_with_status(PipelineStatus::Running),
            summary_with_status(PipelineStatus::Failed),
        ];
        assert_eq!(classify_health(&pipelines), HealthStatus::Critical);
    }

    #[test]
    fn test_running_without_failures_is_warning() {
        let pipelines = vec![
            summary_with_status(PipelineStatus::Success),
            summary_with_status(PipelineStatus::Running),
        ];
        assert_eq!(classify_health(&pipelines), HealthStatus::Warning);
    }

    #[test]
    fn test_unknown_and_cancelled_do_not_escalate() {
        let pipelines = vec![
            summary_with_status(PipelineStatus::Unknown),
            summary_with_status(PipelineStatus::Cancelled),
            summary_with_status(PipelineStatus::Success),
        ];
        assert_eq!(classify_health(&pipelines), HealthStatus::Healthy);
    }

    #[test]
    fn test_no_pipelines_is_healthy() {
        assert_eq!(classify_health(&[]), HealthStatus::Healthy);
    }
}
