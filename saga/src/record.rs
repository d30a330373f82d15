//! Saga record types: which workflow ran, and how far it got.

use chrono::{DateTime, Utc};
use corebank_commons::store::StoreError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which workflow a saga record belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SagaKind {
    /// `add_account`: create customer remotely, then persist the account
    AccountProvisioning,
    /// `register_credit`: deposit remotely, then persist the credit
    CreditOrigination,
}

impl SagaKind {
    /// Database string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AccountProvisioning => "account_provisioning",
            Self::CreditOrigination => "credit_origination",
        }
    }

    /// Parses the database string representation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] for an unknown kind.
    pub fn parse(s: &str) -> Result<Self, StoreError> {
        match s {
            "account_provisioning" => Ok(Self::AccountProvisioning),
            "credit_origination" => Ok(Self::CreditOrigination),
            other => Err(StoreError::Database(format!("invalid saga kind: {other}"))),
        }
    }
}

/// Progress of a single workflow execution.
///
/// One attempt moves through:
///
/// ```text
/// Started -> RemoteCallRequested -> { RemoteCallFailed | RemoteCallConfirmed }
///         -> { PersistFailed | Persisted } -> EventPublished
/// ```
///
/// `RemoteCallFailed`, `Persisted` and `EventPublished` are clean terminals.
/// Everything else left behind by a finished process is an orphan candidate
/// for the reconciler. `Compensated` is the state the reconciler moves a
/// record into once the orphaned side effect has been undone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SagaState {
    /// Record created, input validated, no side effect yet
    Started,
    /// Remote call issued, outcome unknown
    RemoteCallRequested,
    /// Remote dependency reported failure; nothing was created anywhere
    RemoteCallFailed,
    /// Remote side effect exists; local persistence not yet attempted
    RemoteCallConfirmed,
    /// Remote side effect exists but local persistence failed
    PersistFailed,
    /// Both the remote side effect and the local row exist
    Persisted,
    /// Domain event publish succeeded after persistence
    EventPublished,
    /// The reconciler undid the orphaned remote side effect
    Compensated,
}

impl SagaState {
    /// Database string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::RemoteCallRequested => "remote_call_requested",
            Self::RemoteCallFailed => "remote_call_failed",
            Self::RemoteCallConfirmed => "remote_call_confirmed",
            Self::PersistFailed => "persist_failed",
            Self::Persisted => "persisted",
            Self::EventPublished => "event_published",
            Self::Compensated => "compensated",
        }
    }

    /// Parses the database string representation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] for an unknown state.
    pub fn parse(s: &str) -> Result<Self, StoreError> {
        match s {
            "started" => Ok(Self::Started),
            "remote_call_requested" => Ok(Self::RemoteCallRequested),
            "remote_call_failed" => Ok(Self::RemoteCallFailed),
            "remote_call_confirmed" => Ok(Self::RemoteCallConfirmed),
            "persist_failed" => Ok(Self::PersistFailed),
            "persisted" => Ok(Self::Persisted),
            "event_published" => Ok(Self::EventPublished),
            "compensated" => Ok(Self::Compensated),
            other => Err(StoreError::Database(format!("invalid saga state: {other}"))),
        }
    }

    /// True for states a finished workflow may legitimately rest in.
    #[must_use]
    pub const fn is_clean_terminal(&self) -> bool {
        matches!(
            self,
            Self::RemoteCallFailed | Self::Persisted | Self::EventPublished | Self::Compensated
        )
    }
}

/// One persisted workflow execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SagaRecord {
    /// Record id, generated at `begin`
    pub id: Uuid,
    /// Which workflow ran
    pub kind: SagaKind,
    /// How far it got
    pub state: SagaState,
    /// Correlation data (account number, customer email, amounts) needed to
    /// locate the orphaned side effect later
    pub payload: serde_json::Value,
    /// When the record was created
    pub created_at: DateTime<Utc>,
    /// When the state last changed
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn state_roundtrip() {
        for state in [
            SagaState::Started,
            SagaState::RemoteCallRequested,
            SagaState::RemoteCallFailed,
            SagaState::RemoteCallConfirmed,
            SagaState::PersistFailed,
            SagaState::Persisted,
            SagaState::EventPublished,
            SagaState::Compensated,
        ] {
            assert_eq!(SagaState::parse(state.as_str()).unwrap(), state);
        }
        assert!(SagaState::parse("nonsense").is_err());
    }

    #[test]
    fn kind_roundtrip() {
        for kind in [SagaKind::AccountProvisioning, SagaKind::CreditOrigination] {
            assert_eq!(SagaKind::parse(kind.as_str()).unwrap(), kind);
        }
        assert!(SagaKind::parse("nonsense").is_err());
    }

    #[test]
    fn dirty_states_are_not_clean_terminals() {
        assert!(!SagaState::Started.is_clean_terminal());
        assert!(!SagaState::RemoteCallRequested.is_clean_terminal());
        assert!(!SagaState::RemoteCallConfirmed.is_clean_terminal());
        assert!(!SagaState::PersistFailed.is_clean_terminal());

        assert!(SagaState::RemoteCallFailed.is_clean_terminal());
        assert!(SagaState::Persisted.is_clean_terminal());
        assert!(SagaState::EventPublished.is_clean_terminal());
        assert!(SagaState::Compensated.is_clean_terminal());
    }
}
