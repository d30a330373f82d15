//! Caller-facing error taxonomy of the customer service.

use corebank_commons::store::StoreError;
use corebank_commons::validate::ValidationError;
use thiserror::Error;

/// Errors the customer service surfaces to its callers.
#[derive(Debug, Error)]
pub enum CustomerError {
    /// Malformed or missing input; nothing was written
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Another active customer already uses this email
    #[error("a customer with email '{email}' already exists")]
    DuplicateEmail {
        /// The conflicting email
        email: String,
    },

    /// No active customer matched the lookup key
    #[error("customer {id} not found")]
    NotFound {
        /// The lookup key
        id: i64,
    },

    /// The row changed between lookup and mutation; the caller may retry
    #[error("customer {id} was modified concurrently")]
    Conflict {
        /// The contested customer id
        id: i64,
    },

    /// The store raised a fault while writing
    #[error("customer store failure")]
    Persistence(#[source] StoreError),
}

impl CustomerError {
    /// Maps a store fault onto the taxonomy, using `id`/`email` for the
    /// key-carrying variants.
    #[must_use]
    pub fn from_store(error: StoreError, id: i64, email: &str) -> Self {
        match error {
            StoreError::RowNotFound => Self::NotFound { id },
            StoreError::VersionConflict => Self::Conflict { id },
            StoreError::DuplicateKey(_) => Self::DuplicateEmail {
                email: email.to_string(),
            },
            other => Self::Persistence(other),
        }
    }
}
