//! Credit service: the origination workflow, the credit store and the
//! domain-event publisher.
//!
//! [`service::CreditService::register_credit`] deposits funds into an
//! existing account through the remote account service, then records the
//! credit locally, then publishes a `CreditCreated` event. The deposit and
//! the credit row live in different stores with no transaction between
//! them; the invariant of exactly one successful deposit per persisted
//! active credit is upheld by step order plus the deposit idempotency key,
//! and every partial-failure outcome is classified in
//! [`error::CreditError`]. A deposit is never reversed when the credit
//! persist fails; the saga log records the orphan.
//!
//! Event publication is fire-and-forget: a broker failure is logged and
//! counted but never fails the origination.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod error;
pub mod model;
pub mod publisher;
pub mod service;
pub mod store;

pub use client::{AccountGateway, HttpAccountClient};
pub use error::CreditError;
pub use model::{Credit, CreditCreated, CreditType, GetCredit, NewCredit, SaveCredit};
pub use publisher::{CreditEventPublisher, KafkaCreditEventPublisher, PublishError};
pub use service::CreditService;
pub use store::{CreditStore, PgCreditStore};
