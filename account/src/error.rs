//! Caller-facing error taxonomy of the account service.
//!
//! The variants map the partial-failure points of the provisioning
//! workflow one to one, so callers can tell "nothing happened" apart from
//! "a customer now exists with no account".

use corebank_commons::remote::TransportError;
use corebank_commons::store::StoreError;
use corebank_commons::validate::ValidationError;
use thiserror::Error;

/// Sentinel used when a failed dependency sent no usable error body.
pub const NO_DETAILS: &str = "no details";

/// Errors the account service surfaces to its callers.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Malformed or missing input; no remote call was made
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The customer service could not be reached or understood; whether the
    /// customer was created is unknown
    #[error("customer service unreachable")]
    CustomerService(#[from] TransportError),

    /// The customer service answered with a non-success business outcome;
    /// no account was created
    #[error("customer creation failed (status {status}): {details}")]
    CustomerCreation {
        /// HTTP status the customer service answered with
        status: u16,
        /// Best-effort details from the error body, or `"no details"`
        details: String,
    },

    /// The customer service answered success but violated its payload
    /// contract; treated as a dependency bug
    #[error("customer service returned an invalid response: {reason}")]
    CustomerInvalidResponse {
        /// What was wrong with the payload
        reason: &'static str,
    },

    /// An active account with this number already exists
    #[error("account number '{account_number}' is already in use")]
    DuplicateNumber {
        /// The conflicting number
        account_number: String,
    },

    /// No active account matched the lookup key
    #[error("account '{account_number}' not found")]
    NotFound {
        /// The lookup key
        account_number: String,
    },

    /// The row changed between lookup and mutation; the caller may retry
    #[error("account '{account_number}' was modified concurrently")]
    Conflict {
        /// The contested account number
        account_number: String,
    },

    /// The account store raised a fault while saving. When this happens
    /// during provisioning the customer already exists upstream and is not
    /// deleted, an accepted inconsistency recorded in the saga log.
    #[error("account store failure")]
    Persistence(#[source] StoreError),
}

impl AccountError {
    /// Maps a store fault onto the taxonomy, using `account_number` for the
    /// key-carrying variants.
    #[must_use]
    pub fn from_store(error: StoreError, account_number: &str) -> Self {
        match error {
            StoreError::RowNotFound => Self::NotFound {
                account_number: account_number.to_string(),
            },
            StoreError::VersionConflict => Self::Conflict {
                account_number: account_number.to_string(),
            },
            StoreError::DuplicateKey(_) => Self::DuplicateNumber {
                account_number: account_number.to_string(),
            },
            other => Self::Persistence(other),
        }
    }
}
