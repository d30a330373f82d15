//! Test doubles for the corebank services.
//!
//! Everything here implements the real service-facing traits over shared
//! in-memory state, so workflows can be exercised end to end without a
//! database, a broker or the network. Each double is a cheap `Clone` over
//! an `Arc`; tests keep one handle for assertions and hand another to the
//! service under test.
//!
//! Failure injection is deliberate and minimal: stores can fail their next
//! insert, the saga log can refuse to begin, the publisher can be switched
//! to reject everything. This is enough to drive every partial-failure
//! branch of the provisioning and origination workflows.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod gateways;
pub mod publisher;
pub mod saga;
pub mod stores;

pub use gateways::{StubAccountGateway, StubCustomerGateway};
pub use publisher::RecordingPublisher;
pub use saga::InMemorySagaLog;
pub use stores::{InMemoryAccountStore, InMemoryCreditStore, InMemoryCustomerStore};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Locks a mutex, recovering the data from a poisoned lock. Test doubles
/// never hold a guard across an invariant-breaking point, so the data is
/// always usable.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
