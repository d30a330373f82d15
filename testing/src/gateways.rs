//! Scripted gateway stubs.
//!
//! Each stub pops the next queued outcome per call and records the request
//! it was given. An exhausted queue answers as a transport fault rather
//! than panicking, so a workflow that calls more often than the test
//! scripted fails the test at the assertion, with the fault visible.

use crate::lock;
use corebank_account::client::CustomerGateway;
use corebank_commons::dto::{DepositRequest, GetAccount, GetCustomerDetail, SaveCustomer};
use corebank_commons::remote::{RemoteResponse, TransportError};
use corebank_credit::client::AccountGateway;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

type Scripted<T> = VecDeque<Result<RemoteResponse<T>, TransportError>>;

fn next_or_fault<T>(queue: &Mutex<Scripted<T>>) -> Result<RemoteResponse<T>, TransportError> {
    lock(queue)
        .pop_front()
        .unwrap_or_else(|| Err(TransportError::Request("no scripted response".to_string())))
}

/// Scripted [`CustomerGateway`].
#[derive(Clone, Default)]
pub struct StubCustomerGateway {
    responses: Arc<Mutex<Scripted<GetCustomerDetail>>>,
    requests: Arc<Mutex<Vec<SaveCustomer>>>,
}

impl StubCustomerGateway {
    /// Creates a stub with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the next outcome.
    pub fn enqueue(&self, outcome: Result<RemoteResponse<GetCustomerDetail>, TransportError>) {
        lock(&self.responses).push_back(outcome);
    }

    /// Returns the requests seen so far, in call order.
    #[must_use]
    pub fn requests(&self) -> Vec<SaveCustomer> {
        lock(&self.requests).clone()
    }
}

impl CustomerGateway for StubCustomerGateway {
    async fn create_customer(
        &self,
        request: &SaveCustomer,
    ) -> Result<RemoteResponse<GetCustomerDetail>, TransportError> {
        lock(&self.requests).push(request.clone());
        next_or_fault(&self.responses)
    }
}

/// Scripted [`AccountGateway`].
#[derive(Clone, Default)]
pub struct StubAccountGateway {
    responses: Arc<Mutex<Scripted<GetAccount>>>,
    requests: Arc<Mutex<Vec<DepositRequest>>>,
}

impl StubAccountGateway {
    /// Creates a stub with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the next outcome.
    pub fn enqueue(
        &self,
        outcome: Result<RemoteResponse<GetAccount>, TransportError>,
    ) {
        lock(&self.responses).push_back(outcome);
    }

    /// Returns the requests seen so far, in call order.
    #[must_use]
    pub fn requests(&self) -> Vec<DepositRequest> {
        lock(&self.requests).clone()
    }
}

impl AccountGateway for StubAccountGateway {
    async fn deposit(
        &self,
        request: &DepositRequest,
    ) -> Result<RemoteResponse<GetAccount>, TransportError> {
        lock(&self.requests).push(request.clone());
        next_or_fault(&self.responses)
    }
}
