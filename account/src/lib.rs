//! Account service: the provisioning workflow and the account store.
//!
//! The central operation is [`service::AccountService::add_account`]: create
//! a customer through the remote customer service, then persist an account
//! linked to the returned customer id. The two writes hit different stores
//! with no transaction spanning them, so the workflow's job is to execute
//! them in a fixed order and classify every partial-failure outcome
//! precisely (see [`error::AccountError`]). A customer created upstream is
//! never deleted by this workflow when the account persist fails; the saga
//! log makes that orphan visible instead.
//!
//! The service also owns the deposit operation the credit service calls,
//! deduplicated by a caller-supplied idempotency key.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod error;
pub mod model;
pub mod service;
pub mod store;

pub use client::{CustomerGateway, HttpCustomerClient};
pub use error::AccountError;
pub use model::{Account, AccountStatus, AccountType, FullAccountInfo, NewAccount, SaveAccount};
pub use service::AccountService;
pub use store::{AccountStore, DepositOutcome, PgAccountStore};
