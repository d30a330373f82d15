//! Orphan detection and recovery.
//!
//! The reconciler is pull-based: call [`Reconciler::run_once`] from an
//! operator command or a scheduler. It never races the live workflows
//! because it only looks at records that have been sitting in a dirty state
//! longer than the cutoff.

use crate::log::SagaLog;
use crate::record::{SagaRecord, SagaState};
use chrono::Duration;
use corebank_commons::store::StoreError;
use std::future::Future;
use thiserror::Error;

/// A compensation attempt failed; the record stays dirty and will be picked
/// up again on the next run.
#[derive(Debug, Error)]
#[error("compensation failed: {0}")]
pub struct CompensationError(pub String);

/// What a [`Compensator`] did with an orphaned record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompensationOutcome {
    /// The orphaned remote side effect was undone (e.g. the customer that
    /// never got an account was logically deleted)
    Compensated,
    /// The missing local step was completed instead of undone
    Completed,
    /// Neither is safe automatically; an operator has to look at it
    NeedsOperator,
}

/// Applies domain-specific recovery for one stalled saga record.
///
/// Implementations decide per record whether to complete, compensate, or
/// escalate. They receive the correlation payload the workflow stored at
/// `begin`.
pub trait Compensator: Send + Sync {
    /// Attempts to recover `record`.
    ///
    /// # Errors
    ///
    /// Returns [`CompensationError`] when the attempt itself failed and
    /// should be retried on a later run.
    fn compensate(
        &self,
        record: &SagaRecord,
    ) -> impl Future<Output = Result<CompensationOutcome, CompensationError>> + Send;
}

/// Tally of one reconciliation run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcilerReport {
    /// Stalled records examined
    pub examined: usize,
    /// Orphaned side effects undone
    pub compensated: usize,
    /// Workflows completed from the record
    pub completed: usize,
    /// Records escalated to an operator
    pub needs_operator: usize,
    /// Compensation attempts that themselves failed
    pub failed: usize,
}

/// Scans the saga log for stalled records and applies a [`Compensator`].
pub struct Reconciler<L, C> {
    log: L,
    compensator: C,
    cutoff: Duration,
    batch_size: usize,
}

impl<L: SagaLog, C: Compensator> Reconciler<L, C> {
    /// Creates a reconciler.
    ///
    /// `cutoff` is how long a record must have been dirty before it is
    /// considered stalled rather than in flight; `batch_size` bounds one
    /// run.
    pub const fn new(log: L, compensator: C, cutoff: Duration, batch_size: usize) -> Self {
        Self {
            log,
            compensator,
            cutoff,
            batch_size,
        }
    }

    /// Examines one batch of stalled records.
    ///
    /// Records whose compensation succeeds move to
    /// [`SagaState::Compensated`] (or [`SagaState::Persisted`] when the
    /// compensator completed the workflow instead). Escalated and failed
    /// records stay dirty for the next run.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the stalled-record scan fails. Individual
    /// compensation failures are tallied, not propagated.
    pub async fn run_once(&self) -> Result<ReconcilerReport, StoreError> {
        let stalled = self.log.find_stalled(self.cutoff, self.batch_size).await?;
        let mut report = ReconcilerReport {
            examined: stalled.len(),
            ..ReconcilerReport::default()
        };

        for record in &stalled {
            tracing::warn!(
                saga_id = %record.id,
                kind = record.kind.as_str(),
                state = record.state.as_str(),
                stalled_since = %record.updated_at,
                "stalled saga record found"
            );
            metrics::counter!("saga.stalled_found", "kind" => record.kind.as_str())
                .increment(1);

            match self.compensator.compensate(record).await {
                Ok(CompensationOutcome::Compensated) => {
                    self.settle(record, SagaState::Compensated).await;
                    report.compensated += 1;
                },
                Ok(CompensationOutcome::Completed) => {
                    self.settle(record, SagaState::Persisted).await;
                    report.completed += 1;
                },
                Ok(CompensationOutcome::NeedsOperator) => {
                    tracing::warn!(
                        saga_id = %record.id,
                        "saga record needs operator attention"
                    );
                    report.needs_operator += 1;
                },
                Err(error) => {
                    tracing::error!(
                        saga_id = %record.id,
                        error = %error,
                        "compensation attempt failed"
                    );
                    report.failed += 1;
                },
            }
        }

        Ok(report)
    }

    async fn settle(&self, record: &SagaRecord, state: SagaState) {
        crate::log::transition_quietly(&self.log, record.id, state).await;
        tracing::info!(
            saga_id = %record.id,
            kind = record.kind.as_str(),
            outcome = state.as_str(),
            "saga record settled"
        );
    }
}
