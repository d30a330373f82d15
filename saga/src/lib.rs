//! Persisted saga log and orphan reconciler for the corebank workflows.
//!
//! The provisioning and origination workflows span two stores with no
//! distributed transaction between them. When a workflow fails after its
//! remote call succeeded, an upstream side effect is left behind: a
//! customer without an account, or a deposit without a credit. The
//! workflows themselves never roll such a side effect back.
//!
//! This crate turns that implicit inconsistency window into explicit,
//! observable state:
//!
//! - every workflow execution writes a [`record::SagaRecord`] and advances
//!   it through the state machine as steps complete;
//! - the [`reconciler::Reconciler`] later scans for records stalled in a
//!   dirty state and hands each to a [`reconciler::Compensator`].
//!
//! The saga log must never break the business path: only `begin` (which
//! runs before any side effect) is allowed to fail a workflow; later
//! transitions are recorded best-effort.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod log;
pub mod reconciler;
pub mod record;

pub use log::{PgSagaLog, SagaLog, transition_quietly};
pub use reconciler::{CompensationError, CompensationOutcome, Compensator, Reconciler};
pub use record::{SagaKind, SagaRecord, SagaState};
