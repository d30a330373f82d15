//! Customer service: owns the customer store and the operations on it.
//!
//! Customers are created either directly or by the account service's
//! provisioning workflow (over the wire contract in `corebank-commons`).
//! Either way this crate owns all writes to the customer store; other
//! services hold customers only by id.
//!
//! Deletes are logical: a deletion timestamp plus a cleared active flag,
//! never a physical removal. Mutations are guarded by a version column so
//! concurrent writers fail with a conflict instead of silently losing an
//! update.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod model;
pub mod service;
pub mod store;

pub use error::CustomerError;
pub use model::{Address, Customer, NewCustomer, UpdateCustomer};
pub use service::CustomerService;
pub use store::{CustomerStore, PgCustomerStore};
