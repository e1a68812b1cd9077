use crate::error::{ConformanceError, Result};
use crate::properties::{PropertyStore, PropertyValue};
use crate::test_case::TestState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use ulid::Ulid;

/// Outcome of one scheduled test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub state: TestState,
    /// Set when the test was skipped because a required property was absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_property: Option<String>,
}

impl TestRecord {
    #[must_use]
    pub fn executed(name: impl Into<String>, category: Option<String>, state: TestState) -> Self {
        Self {
            name: name.into(),
            category,
            state,
            missing_property: None,
        }
    }

    #[must_use]
    pub fn skipped(
        name: impl Into<String>,
        category: Option<String>,
        missing_property: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            state: TestState::NotRun,
            missing_property: Some(missing_property.into()),
        }
    }

    #[must_use]
    pub fn is_skipped(&self) -> bool {
        self.missing_property.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub passed: usize,
    pub failed: usize,
    pub broken: usize,
    pub not_run: usize,
}

impl RunSummary {
    #[must_use]
    pub fn total(&self) -> usize {
        self.passed + self.failed + self.broken + self.not_run
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} passed, {} failed, {} broken, {} not run",
            self.passed, self.failed, self.broken, self.not_run
        )
    }
}

/// Everything a run produced, in execution order.
///
/// When the queued-message loop limit stops a run early, `aborted` holds the
/// error and `records` covers only the tests reached before it.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub run_id: Ulid,
    pub records: Vec<TestRecord>,
    pub properties: PropertyStore,
    pub aborted: Option<ConformanceError>,
}

#[derive(Serialize)]
struct RunReport<'a> {
    run_id: String,
    summary: RunSummary,
    records: &'a [TestRecord],
    properties: BTreeMap<String, PropertyValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    aborted: Option<String>,
}

impl RunResult {
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        self.records
            .iter()
            .fold(RunSummary::default(), |mut summary, record| {
                match record.state {
                    TestState::Passed => summary.passed += 1,
                    TestState::Failed => summary.failed += 1,
                    TestState::Broken => summary.broken += 1,
                    TestState::NotRun => summary.not_run += 1,
                }
                summary
            })
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.aborted.is_none()
    }

    #[must_use]
    pub fn record(&self, name: &str) -> Option<&TestRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    /// Names of the tests in the order they were reached.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.name.as_str())
    }

    pub fn to_json(&self) -> Result<String> {
        let report = RunReport {
            run_id: self.run_id.to_string(),
            summary: self.summary(),
            records: &self.records,
            properties: self.properties.snapshot(),
            aborted: self.aborted.as_ref().map(ToString::to_string),
        };
        Ok(serde_json::to_string_pretty(&report)?)
    }
}
