//! Deposit and lifecycle tests over the in-memory store.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use corebank_account::error::AccountError;
use corebank_account::model::{AccountStatus, AccountType, NewAccount};
use corebank_account::service::AccountService;
use corebank_account::store::AccountStore;
use corebank_commons::dto::DepositRequest;
use corebank_testing::{InMemoryAccountStore, InMemorySagaLog, StubCustomerGateway};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

async fn seeded_service(
    number: &str,
    balance: Decimal,
) -> AccountService<InMemoryAccountStore, StubCustomerGateway, InMemorySagaLog> {
    let store = InMemoryAccountStore::new();
    store
        .insert(NewAccount {
            account_number: number.to_string(),
            account_type: AccountType::Checking,
            status: AccountStatus::Active,
            balance,
            customer_id: 1,
        })
        .await
        .unwrap();
    AccountService::new(store, StubCustomerGateway::new(), InMemorySagaLog::new())
}

fn deposit(number: &str, amount: Decimal, key: &str) -> DepositRequest {
    DepositRequest {
        account_number: number.to_string(),
        amount,
        idempotency_key: key.to_string(),
    }
}

#[tokio::test]
async fn deposit_adds_to_the_balance() {
    let svc = seeded_service("AC-1", dec!(10.00)).await;

    let account = svc.deposit(deposit("AC-1", dec!(25.50), "k-1")).await.unwrap();

    assert_eq!(account.balance, dec!(35.50));
}

#[tokio::test]
async fn replayed_key_does_not_move_money_again() {
    let svc = seeded_service("AC-1", dec!(10.00)).await;

    svc.deposit(deposit("AC-1", dec!(25.50), "k-1")).await.unwrap();
    let replay = svc.deposit(deposit("AC-1", dec!(25.50), "k-1")).await.unwrap();

    assert_eq!(replay.balance, dec!(35.50));

    let fresh = svc.find_by_number("AC-1").await.unwrap();
    assert_eq!(fresh.balance, dec!(35.50));
}

#[tokio::test]
async fn zero_and_negative_amounts_are_rejected() {
    let svc = seeded_service("AC-1", dec!(10.00)).await;

    for amount in [dec!(0.00), dec!(-5.00)] {
        let error = svc.deposit(deposit("AC-1", amount, "k-1")).await.unwrap_err();
        assert!(matches!(error, AccountError::Validation(_)));
    }

    let account = svc.find_by_number("AC-1").await.unwrap();
    assert_eq!(account.balance, dec!(10.00));
}

#[tokio::test]
async fn deposit_to_unknown_account_does_not_burn_the_key() {
    let svc = seeded_service("AC-1", dec!(10.00)).await;

    let error = svc
        .deposit(deposit("AC-9", dec!(5.00), "k-1"))
        .await
        .unwrap_err();
    assert!(matches!(error, AccountError::NotFound { .. }));

    // The failed attempt did not record the key; it still works here.
    let account = svc.deposit(deposit("AC-1", dec!(5.00), "k-1")).await.unwrap();
    assert_eq!(account.balance, dec!(15.00));
}

#[tokio::test]
async fn deleted_account_disappears_from_lookups() {
    let svc = seeded_service("AC-1", dec!(10.00)).await;

    svc.delete_by_number("AC-1").await.unwrap();

    assert!(matches!(
        svc.find_by_number("AC-1").await.unwrap_err(),
        AccountError::NotFound { .. }
    ));
    assert!(matches!(
        svc.delete_by_number("AC-1").await.unwrap_err(),
        AccountError::NotFound { .. }
    ));
    assert!(matches!(
        svc.deposit(deposit("AC-1", dec!(5.00), "k-2")).await.unwrap_err(),
        AccountError::NotFound { .. }
    ));
}

proptest! {
    // Distinct keys accumulate exactly once each, regardless of replays
    // interleaved between them.
    #[test]
    fn distinct_keys_accumulate_exactly_once(cents in proptest::collection::vec(1i64..10_000, 1..8)) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        rt.block_on(async {
            let svc = seeded_service("AC-P", Decimal::ZERO).await;
            let mut expected = Decimal::ZERO;

            for (i, amount_cents) in cents.iter().enumerate() {
                let amount = Decimal::new(*amount_cents, 2);
                let key = format!("k-{i}");
                svc.deposit(deposit("AC-P", amount, &key)).await.unwrap();
                svc.deposit(deposit("AC-P", amount, &key)).await.unwrap();
                expected += amount;
            }

            let account = svc.find_by_number("AC-P").await.unwrap();
            prop_assert_eq!(account.balance, expected);
            Ok(())
        })?;
    }
}
