//! Caller-facing error taxonomy of the credit service.

use corebank_commons::remote::TransportError;
use corebank_commons::store::StoreError;
use corebank_commons::validate::ValidationError;
use thiserror::Error;

/// Sentinel used when a failed dependency sent no usable error body.
pub const NO_DETAILS: &str = "no details";

/// Errors the credit service surfaces to its callers.
#[derive(Debug, Error)]
pub enum CreditError {
    /// Malformed or missing input; no remote call was made
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The account service could not be reached or understood; whether the
    /// deposit happened is unknown
    #[error("account service unreachable")]
    AccountService(#[from] TransportError),

    /// The account service answered with a non-success business outcome;
    /// no money moved and no credit row was created
    #[error("account deposit failed (status {status}): {details}")]
    AccountDeposit {
        /// HTTP status the account service answered with
        status: u16,
        /// Best-effort details from the error body, or `"no details"`
        details: String,
    },

    /// The account service answered success but violated its payload
    /// contract; treated as a dependency bug
    #[error("account service returned an invalid response: {reason}")]
    AccountInvalidResponse {
        /// What was wrong with the payload
        reason: &'static str,
    },

    /// The caller-supplied customer id does not own the target account.
    /// The deposit has already happened at this point; the saga record
    /// tracks the orphan.
    #[error("account belongs to customer {actual}, not {claimed}")]
    OwnershipMismatch {
        /// Customer id the caller supplied
        claimed: i64,
        /// Owner reported by the account service
        actual: i64,
    },

    /// No active credit matched the lookup key
    #[error("credit {id} not found")]
    NotFound {
        /// The lookup key
        id: i64,
    },

    /// The row changed between lookup and mutation; the caller may retry
    #[error("credit {id} was modified concurrently")]
    Conflict {
        /// The contested credit id
        id: i64,
    },

    /// The credit store raised a fault while saving. When this happens
    /// during origination the deposit has already mutated the account and
    /// is not reversed, an accepted inconsistency recorded in the saga
    /// log.
    #[error("credit store failure")]
    Persistence(#[source] StoreError),
}

impl CreditError {
    /// Maps a store fault onto the taxonomy, using `id` for the
    /// key-carrying variants.
    #[must_use]
    pub fn from_store(error: StoreError, id: i64) -> Self {
        match error {
            StoreError::RowNotFound => Self::NotFound { id },
            StoreError::VersionConflict => Self::Conflict { id },
            other => Self::Persistence(other),
        }
    }
}
