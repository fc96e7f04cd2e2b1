use indexmap::IndexMap;

use super::types::ShallowTestCaseResult;
use crate::models::GroupedTestResults;

/// Group a build's test results by the assembly (DLL) that produced
/// them, preserving first-seen order. Results without a storage name
/// land under the empty key.
pub fn group_by_test_storage(results: Vec<ShallowTestCaseResult>) -> GroupedTestResults {
    let total_tests = results.len();
    let mut test_groups: IndexMap<String, Vec<ShallowTestCaseResult>> = IndexMap::new();

    for result in results {
        let storage_key = result.automated_test_storage.clone().unwrap_or_default();
        test_groups.entry(storage_key).or_default().push(result);
    }

    GroupedTestResults {
        total_tests,
        test_groups,
    }
}
