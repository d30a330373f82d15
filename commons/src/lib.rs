//! Shared building blocks for the corebank services.
//!
//! Each service (customer, account, credit) owns its own entities and store,
//! but they talk to each other over narrow wire contracts. This crate holds
//! exactly the parts that cross a service boundary:
//!
//! - [`dto`]: request/response payloads exchanged between services
//! - [`event`]: the domain-event envelope published to the broker
//! - [`remote`]: the remote entity client contract (status + optional body)
//! - [`validate`]: input validation shared by the write paths
//! - [`store`]: the storage-fault vocabulary every store speaks
//!
//! Nothing in here performs I/O; the crate is pure data and checks.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod dto;
pub mod event;
pub mod remote;
pub mod store;
pub mod validate;
