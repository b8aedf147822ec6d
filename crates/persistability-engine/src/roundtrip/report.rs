//! Verification reports

use persistability_core::errors::{ExError, ExErrorKind};
use persistability_core_types::RunId;
use std::fmt;

/// What happened to one case
#[derive(Debug, Clone)]
pub enum CaseOutcome {
    Passed,
    Failed(ExError),
    /// Not attempted because an earlier case failed under fail-fast
    NotRun,
}

#[derive(Debug, Clone)]
pub struct CaseResult {
    pub label: String,
    pub outcome: CaseOutcome,
    pub duration_ms: u64,
}

impl CaseResult {
    pub fn passed(&self) -> bool {
        matches!(self.outcome, CaseOutcome::Passed)
    }

    pub fn error(&self) -> Option<&ExError> {
        match &self.outcome {
            CaseOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Outcome of one verification run, in registration order
#[derive(Debug, Clone)]
pub struct RoundTripReport {
    pub run_id: RunId,
    pub results: Vec<CaseResult>,
}

impl RoundTripReport {
    pub fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            results: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.results.iter().all(CaseResult::passed)
    }

    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.passed()).count()
    }

    /// Failed cases with their errors
    pub fn failures(&self) -> impl Iterator<Item = (&str, &ExError)> {
        self.results
            .iter()
            .filter_map(|r| r.error().map(|e| (r.label.as_str(), e)))
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    /// Turn a failing report into an error
    ///
    /// A single failure is returned as is. Several failures are folded into
    /// one `RoundTripFailed` error naming every failed label, with the first
    /// failure as its source.
    pub fn into_result(self) -> Result<Self, ExError> {
        let mut failures: Vec<(String, ExError)> = self
            .failures()
            .map(|(label, err)| (label.to_string(), err.clone()))
            .collect();

        match failures.len() {
            0 => Ok(self),
            1 => {
                let (_, err) = failures.remove(0);
                Err(err.with_run_id(self.run_id))
            }
            n => {
                let labels: Vec<String> = failures.iter().map(|(l, _)| l.clone()).collect();
                let (_, first) = failures.remove(0);
                Err(ExError::new(ExErrorKind::RoundTripFailed)
                    .with_op("verify_all")
                    .with_run_id(self.run_id.clone())
                    .with_message(format!(
                        "{} of {} round trips failed: {}",
                        n,
                        self.results.len(),
                        labels.join(", ")
                    ))
                    .with_candidates(labels)
                    .with_source(first))
            }
        }
    }
}

impl fmt::Display for RoundTripReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "run {}", self.run_id)?;
        for result in &self.results {
            match &result.outcome {
                CaseOutcome::Passed => {
                    writeln!(f, "  PASS {} ({} ms)", result.label, result.duration_ms)?
                }
                CaseOutcome::Failed(err) => writeln!(f, "  FAIL {}: {}", result.label, err)?,
                CaseOutcome::NotRun => writeln!(f, "  SKIP {}", result.label)?,
            }
        }
        write!(
            f,
            "{} passed, {} failed, {} total",
            self.passed_count(),
            self.failure_count(),
            self.results.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(label: &str, outcome: CaseOutcome) -> CaseResult {
        CaseResult {
            label: label.to_string(),
            outcome,
            duration_ms: 0,
        }
    }

    fn failure(label: &str) -> CaseOutcome {
        CaseOutcome::Failed(
            ExError::new(ExErrorKind::PropertyMismatch)
                .with_entity(label)
                .with_message(format!("{} differs", label)),
        )
    }

    #[test]
    fn test_all_passed() {
        let mut report = RoundTripReport::new(RunId::new());
        report.results.push(result("Company", CaseOutcome::Passed));
        assert!(report.is_success());
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn test_single_failure_is_returned_as_is() {
        let mut report = RoundTripReport::new(RunId::new());
        report.results.push(result("Company", failure("Company")));
        report.results.push(result("Employee", CaseOutcome::NotRun));

        let err = report.into_result().unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::PropertyMismatch);
        assert!(err.run_id().is_some());
    }

    #[test]
    fn test_several_failures_are_folded() {
        let mut report = RoundTripReport::new(RunId::new());
        report.results.push(result("Company", failure("Company")));
        report.results.push(result("Employee", failure("Employee")));

        let rendered = report.to_string();
        assert!(rendered.contains("FAIL Company"));
        assert!(rendered.contains("0 passed, 2 failed, 2 total"));

        let err = report.into_result().unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::RoundTripFailed);
        assert_eq!(
            err.candidates(),
            Some(&["Company".to_string(), "Employee".to_string()][..])
        );
        assert_eq!(
            err.source_error().map(|e| e.kind()),
            Some(ExErrorKind::PropertyMismatch)
        );
    }
}
