//! Provisioning workflow tests over in-memory doubles.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use corebank_account::error::AccountError;
use corebank_account::model::{AccountStatus, AccountType, SaveAccount};
use corebank_account::service::AccountService;
use corebank_commons::dto::{GetAddress, GetCustomerDetail, SaveAddress, SaveCustomer};
use corebank_commons::remote::{RemoteResponse, TransportError};
use corebank_commons::store::StoreError;
use corebank_saga::SagaState;
use corebank_testing::{InMemoryAccountStore, InMemorySagaLog, StubCustomerGateway};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn save_address() -> SaveAddress {
    SaveAddress {
        country: "Argentina".to_string(),
        state: "Buenos Aires".to_string(),
        city: "La Plata".to_string(),
        postal_code: "1900".to_string(),
        street: "Calle 7".to_string(),
        street_number: "1234".to_string(),
        apartment: None,
        floor: None,
        additional_info: None,
    }
}

fn save_customer(email: &str) -> SaveCustomer {
    SaveCustomer {
        name: "Ana".to_string(),
        last_name: "Torres".to_string(),
        email: email.to_string(),
        mobile: "+1 5551234567".to_string(),
        address: save_address(),
    }
}

fn save_account(number: &str, email: &str) -> SaveAccount {
    SaveAccount {
        account_number: number.to_string(),
        account_type: AccountType::Savings,
        status: AccountStatus::Active,
        balance: dec!(100.00),
        customer: save_customer(email),
    }
}

fn created_customer(id: i64, email: &str) -> GetCustomerDetail {
    GetCustomerDetail {
        id,
        name: "Ana".to_string(),
        last_name: "Torres".to_string(),
        email: email.to_string(),
        phone: "+1 5551234567".to_string(),
        address: GetAddress {
            country: "Argentina".to_string(),
            state: "Buenos Aires".to_string(),
            city: "La Plata".to_string(),
            postal_code: "1900".to_string(),
            street: "Calle 7".to_string(),
            street_number: "1234".to_string(),
            apartment: None,
            floor: None,
            additional_info: None,
        },
        created_at: None,
        updated_at: None,
    }
}

fn service(
    store: InMemoryAccountStore,
    customers: StubCustomerGateway,
    saga: InMemorySagaLog,
) -> AccountService<InMemoryAccountStore, StubCustomerGateway, InMemorySagaLog> {
    AccountService::new(store, customers, saga)
}

#[tokio::test]
async fn provisioning_links_account_to_created_customer() {
    let store = InMemoryAccountStore::new();
    let customers = StubCustomerGateway::new();
    let saga = InMemorySagaLog::new();
    customers.enqueue(Ok(RemoteResponse {
        status: 201,
        body: Some(created_customer(42, "ana@example.com")),
        details: None,
    }));

    let svc = service(store.clone(), customers.clone(), saga.clone());
    let info = svc
        .add_account(save_account("AC-1", "ana@example.com"))
        .await
        .unwrap();

    assert_eq!(info.customer.id, 42);
    assert_eq!(info.account.customer_id, 42);
    assert_eq!(info.account.account_number, "AC-1");
    assert_eq!(info.account.balance, dec!(100.00));

    // One stored row, linked to the remote customer's id.
    let rows = store.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].customer_id, 42);

    let sagas = saga.records();
    assert_eq!(sagas.len(), 1);
    assert_eq!(
        saga.states(sagas[0].id),
        vec![
            SagaState::Started,
            SagaState::RemoteCallRequested,
            SagaState::RemoteCallConfirmed,
            SagaState::Persisted,
        ]
    );
}

#[tokio::test]
async fn refused_customer_creation_creates_nothing() {
    let store = InMemoryAccountStore::new();
    let customers = StubCustomerGateway::new();
    let saga = InMemorySagaLog::new();
    customers.enqueue(Ok(RemoteResponse {
        status: 409,
        body: None,
        details: Some("email already registered".to_string()),
    }));

    let svc = service(store.clone(), customers, saga.clone());
    let error = svc
        .add_account(save_account("AC-2", "dup@example.com"))
        .await
        .unwrap_err();

    match error {
        AccountError::CustomerCreation { status, details } => {
            assert_eq!(status, 409);
            assert_eq!(details, "email already registered");
        },
        other => panic!("expected CustomerCreation, got {other:?}"),
    }
    assert!(store.rows().is_empty());
    assert_eq!(saga.records()[0].state, SagaState::RemoteCallFailed);
}

#[tokio::test]
async fn refused_creation_without_body_reports_no_details() {
    let customers = StubCustomerGateway::new();
    customers.enqueue(Ok(RemoteResponse {
        status: 500,
        body: None,
        details: None,
    }));

    let svc = service(
        InMemoryAccountStore::new(),
        customers,
        InMemorySagaLog::new(),
    );
    let error = svc
        .add_account(save_account("AC-3", "a@example.com"))
        .await
        .unwrap_err();

    match error {
        AccountError::CustomerCreation { details, .. } => assert_eq!(details, "no details"),
        other => panic!("expected CustomerCreation, got {other:?}"),
    }
}

#[tokio::test]
async fn transport_fault_leaves_saga_awaiting_reconciliation() {
    let store = InMemoryAccountStore::new();
    let customers = StubCustomerGateway::new();
    let saga = InMemorySagaLog::new();
    customers.enqueue(Err(TransportError::Timeout("deadline elapsed".to_string())));

    let svc = service(store.clone(), customers, saga.clone());
    let error = svc
        .add_account(save_account("AC-4", "b@example.com"))
        .await
        .unwrap_err();

    assert!(matches!(error, AccountError::CustomerService(_)));
    assert!(store.rows().is_empty());
    // Whether the customer was created is unknown; the record stays dirty
    // for the reconciler.
    assert_eq!(saga.records()[0].state, SagaState::RemoteCallRequested);
}

#[tokio::test]
async fn empty_success_body_is_a_contract_violation() {
    let customers = StubCustomerGateway::new();
    customers.enqueue(Ok(RemoteResponse {
        status: 200,
        body: None,
        details: None,
    }));

    let svc = service(
        InMemoryAccountStore::new(),
        customers,
        InMemorySagaLog::new(),
    );
    let error = svc
        .add_account(save_account("AC-5", "c@example.com"))
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        AccountError::CustomerInvalidResponse { reason: "empty body" }
    ));
}

#[tokio::test]
async fn missing_customer_id_is_a_contract_violation() {
    let customers = StubCustomerGateway::new();
    customers.enqueue(Ok(RemoteResponse {
        status: 201,
        body: Some(created_customer(0, "d@example.com")),
        details: None,
    }));

    let svc = service(
        InMemoryAccountStore::new(),
        customers,
        InMemorySagaLog::new(),
    );
    let error = svc
        .add_account(save_account("AC-6", "d@example.com"))
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        AccountError::CustomerInvalidResponse { reason: "missing id" }
    ));
}

#[tokio::test]
async fn persist_fault_reports_the_orphaned_customer() {
    let store = InMemoryAccountStore::new();
    let customers = StubCustomerGateway::new();
    let saga = InMemorySagaLog::new();
    customers.enqueue(Ok(RemoteResponse {
        status: 201,
        body: Some(created_customer(7, "e@example.com")),
        details: None,
    }));
    store.fail_next_insert(StoreError::Database("connection reset".to_string()));

    let svc = service(store.clone(), customers, saga.clone());
    let error = svc
        .add_account(save_account("AC-7", "e@example.com"))
        .await
        .unwrap_err();

    match error {
        AccountError::Persistence(StoreError::Database(message)) => {
            assert_eq!(message, "connection reset");
        },
        other => panic!("expected Persistence, got {other:?}"),
    }
    assert!(store.rows().is_empty());
    assert_eq!(saga.records()[0].state, SagaState::PersistFailed);
}

#[tokio::test]
async fn saga_begin_failure_aborts_before_any_side_effect() {
    let customers = StubCustomerGateway::new();
    let saga = InMemorySagaLog::new();
    saga.fail_begin();

    let svc = service(InMemoryAccountStore::new(), customers.clone(), saga);
    let error = svc
        .add_account(save_account("AC-8", "f@example.com"))
        .await
        .unwrap_err();

    assert!(matches!(error, AccountError::Persistence(_)));
    assert!(customers.requests().is_empty());
}

#[tokio::test]
async fn invalid_input_never_reaches_the_customer_service() {
    let customers = StubCustomerGateway::new();
    let svc = service(
        InMemoryAccountStore::new(),
        customers.clone(),
        InMemorySagaLog::new(),
    );

    let mut bad_mobile = save_account("AC-9", "g@example.com");
    bad_mobile.customer.mobile = "5551234567".to_string();
    assert!(matches!(
        svc.add_account(bad_mobile).await.unwrap_err(),
        AccountError::Validation(_)
    ));

    let mut negative_balance = save_account("AC-9", "g@example.com");
    negative_balance.balance = dec!(-1.00);
    assert!(matches!(
        svc.add_account(negative_balance).await.unwrap_err(),
        AccountError::Validation(_)
    ));

    assert!(customers.requests().is_empty());
}

#[tokio::test]
async fn duplicate_active_number_is_rejected() {
    let store = InMemoryAccountStore::new();
    let customers = StubCustomerGateway::new();
    for id in [1, 2] {
        customers.enqueue(Ok(RemoteResponse {
            status: 201,
            body: Some(created_customer(id, "h@example.com")),
            details: None,
        }));
    }

    let svc = service(store, customers, InMemorySagaLog::new());
    svc.add_account(save_account("AC-10", "h@example.com"))
        .await
        .unwrap();
    let error = svc
        .add_account(save_account("AC-10", "h2@example.com"))
        .await
        .unwrap_err();

    assert!(matches!(error, AccountError::DuplicateNumber { .. }));
}

proptest! {
    // For any valid opening balance and any id the customer service hands
    // back, the stored account is linked to that id and keeps the balance.
    #[test]
    fn provisioned_account_is_linked_and_balanced(
        balance_cents in 0i64..100_000_000,
        customer_id in 1i64..1_000_000,
        number in "[A-Z]{2}-[0-9]{1,8}",
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        rt.block_on(async {
            let balance = Decimal::new(balance_cents, 2);
            let customers = StubCustomerGateway::new();
            customers.enqueue(Ok(RemoteResponse {
                status: 201,
                body: Some(created_customer(customer_id, "p@example.com")),
                details: None,
            }));

            let svc = service(
                InMemoryAccountStore::new(),
                customers,
                InMemorySagaLog::new(),
            );
            let mut request = save_account(&number, "p@example.com");
            request.balance = balance;

            let info = svc.add_account(request).await.unwrap();
            prop_assert_eq!(info.account.customer_id, customer_id);
            prop_assert_eq!(info.customer.id, customer_id);
            prop_assert_eq!(info.account.balance, balance);
            Ok(())
        })?;
    }
}
