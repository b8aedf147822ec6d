//! Round-trip verifier
//!
//! Runs every registered case sequentially against one entity manager.
//! Each case gets its own pair of units of work; nothing is shared between
//! cases except the database.

use crate::roundtrip::case::{RoundTrip, RoundTripCase};
use crate::roundtrip::report::{CaseOutcome, CaseResult, RoundTripReport};
use persistability_core::builder::Builder;
use persistability_core::errors::ExError;
use persistability_core::{log_op_end, log_op_error, log_op_start};
use persistability_core_types::RunContext;
use persistability_store::{Entity, EntityManager, SqliteTransactor};

/// What to do after a case fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop at the first failure; later cases are not run
    #[default]
    FailFast,
    /// Run every case and report all failures together
    CollectAll,
}

pub struct RoundTripVerifier<'a> {
    em: &'a EntityManager,
    cases: Vec<Box<dyn RoundTrip + 'a>>,
    policy: FailurePolicy,
    run: RunContext,
}

impl<'a> RoundTripVerifier<'a> {
    pub fn new(em: &'a EntityManager) -> Self {
        Self {
            em,
            cases: Vec::new(),
            policy: FailurePolicy::default(),
            run: RunContext::new(persistability_store::config::DEFAULT_UNIT),
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_run_context(mut self, run: RunContext) -> Self {
        self.run = run;
        self
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    pub fn run_context(&self) -> &RunContext {
        &self.run
    }

    /// The entity manager cases run against, for builders that persist
    pub fn entity_manager(&self) -> &'a EntityManager {
        self.em
    }

    /// Register a builder under the label derived from its type
    pub fn register<E, B>(&mut self, builder: B) -> &mut Self
    where
        E: Entity + Clone,
        B: Builder<E> + 'a,
    {
        self.add(RoundTripCase::new(builder))
    }

    /// Register a prepared case
    pub fn add(&mut self, case: impl RoundTrip + 'a) -> &mut Self {
        self.cases.push(Box::new(case));
        self
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Labels in registration order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.cases.iter().map(|c| c.label())
    }

    /// Run every case under the configured policy and report each outcome
    pub fn run(&self) -> RoundTripReport {
        let run_id = self.run.run_id.as_str();
        log_op_start!(
            "verify_all",
            run_id = run_id,
            unit = %self.run.unit,
            case_count = self.cases.len()
        );
        let start = std::time::Instant::now();

        let transactor = SqliteTransactor::new(self.em);
        let mut report = RoundTripReport::new(self.run.run_id.clone());
        let mut stopped = false;

        for case in &self.cases {
            if stopped {
                report.results.push(CaseResult {
                    label: case.label().to_string(),
                    outcome: CaseOutcome::NotRun,
                    duration_ms: 0,
                });
                continue;
            }

            let (outcome, duration_ms) = self.verify_case(case.as_ref(), &transactor);
            if matches!(outcome, CaseOutcome::Failed(_)) && self.policy == FailurePolicy::FailFast
            {
                stopped = true;
            }
            report.results.push(CaseResult {
                label: case.label().to_string(),
                outcome,
                duration_ms,
            });
        }

        log_op_end!(
            "verify_all",
            duration_ms = start.elapsed().as_millis() as u64,
            run_id = run_id,
            case_count = report.results.len(),
            failure_count = report.failure_count()
        );
        report
    }

    /// Run every case and fail unless all of them pass
    pub fn verify_all(&self) -> Result<RoundTripReport, ExError> {
        self.run().into_result()
    }

    fn verify_case(
        &self,
        case: &dyn RoundTrip,
        transactor: &SqliteTransactor<'_>,
    ) -> (CaseOutcome, u64) {
        let label = case.label();
        let run_id = self.run.run_id.as_str();
        log_op_start!("round_trip", type_label = label, run_id = run_id);
        let start = std::time::Instant::now();

        let result = case.verify(transactor);
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(()) => {
                log_op_end!(
                    "round_trip",
                    duration_ms = duration_ms,
                    type_label = label,
                    run_id = run_id
                );
                (CaseOutcome::Passed, duration_ms)
            }
            Err(err) => {
                let err = err.with_run_id(self.run.run_id.clone());
                log_op_error!(
                    "round_trip",
                    err.clone(),
                    duration_ms = duration_ms,
                    type_label = label,
                    run_id = run_id
                );
                (CaseOutcome::Failed(err), duration_ms)
            }
        }
    }
}
