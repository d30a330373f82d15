//! Customer lifecycle tests over the in-memory store.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use corebank_commons::dto::{SaveAddress, SaveCustomer};
use corebank_customer::error::CustomerError;
use corebank_customer::model::UpdateCustomer;
use corebank_customer::service::CustomerService;
use corebank_testing::InMemoryCustomerStore;

fn save_customer(email: &str) -> SaveCustomer {
    SaveCustomer {
        name: "Ana".to_string(),
        last_name: "Torres".to_string(),
        email: email.to_string(),
        mobile: "+54 2215550123".to_string(),
        address: SaveAddress {
            country: "Argentina".to_string(),
            state: "Buenos Aires".to_string(),
            city: "La Plata".to_string(),
            postal_code: "1900".to_string(),
            street: "Calle 7".to_string(),
            street_number: "1234".to_string(),
            apartment: Some("B".to_string()),
            floor: Some("3".to_string()),
            additional_info: None,
        },
    }
}

fn service() -> (
    CustomerService<InMemoryCustomerStore>,
    InMemoryCustomerStore,
) {
    let store = InMemoryCustomerStore::new();
    (CustomerService::new(store.clone()), store)
}

#[tokio::test]
async fn saved_customer_is_found_by_id_and_email() {
    let (svc, _) = service();

    let created = svc.save(save_customer("ana@example.com")).await.unwrap();
    assert!(created.id > 0);
    assert_eq!(created.phone, "+54 2215550123");
    assert_eq!(created.address.city, "La Plata");

    let by_id = svc.find_by_id(created.id).await.unwrap();
    assert_eq!(by_id.email, "ana@example.com");

    let by_email = svc.find_by_email("ana@example.com").await.unwrap();
    assert_eq!(by_email.id, created.id);
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let (svc, _) = service();

    svc.save(save_customer("ana@example.com")).await.unwrap();
    let error = svc.save(save_customer("ana@example.com")).await.unwrap_err();

    match error {
        CustomerError::DuplicateEmail { email } => assert_eq!(email, "ana@example.com"),
        other => panic!("expected DuplicateEmail, got {other:?}"),
    }
}

#[tokio::test]
async fn email_stays_reserved_after_delete() {
    let (svc, _) = service();

    let created = svc.save(save_customer("ana@example.com")).await.unwrap();
    svc.delete_by_id(created.id).await.unwrap();

    // The unique constraint spans deleted rows too.
    assert!(matches!(
        svc.save(save_customer("ana@example.com")).await.unwrap_err(),
        CustomerError::DuplicateEmail { .. }
    ));
}

#[tokio::test]
async fn malformed_input_is_rejected() {
    let (svc, store) = service();

    let mut blank_name = save_customer("a@example.com");
    blank_name.name = "  ".to_string();

    let mut bad_email = save_customer("a@example.com");
    bad_email.email = "not-an-email".to_string();

    let mut bad_mobile = save_customer("a@example.com");
    bad_mobile.mobile = "02215550123".to_string();

    for request in [blank_name, bad_email, bad_mobile] {
        assert!(matches!(
            svc.save(request).await.unwrap_err(),
            CustomerError::Validation(_)
        ));
    }

    assert!(store.rows().is_empty());
}

#[tokio::test]
async fn partial_update_keeps_unnamed_fields() {
    let (svc, _) = service();
    let created = svc.save(save_customer("ana@example.com")).await.unwrap();

    let updated = svc
        .update_by_id(
            created.id,
            UpdateCustomer {
                name: None,
                last_name: Some("Suarez".to_string()),
                mobile: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.name, "Ana");
    assert_eq!(updated.last_name, "Suarez");
    assert_eq!(updated.phone, "+54 2215550123");
    assert_eq!(updated.email, "ana@example.com");
}

#[tokio::test]
async fn update_rejects_a_malformed_mobile() {
    let (svc, _) = service();
    let created = svc.save(save_customer("ana@example.com")).await.unwrap();

    let error = svc
        .update_by_id(
            created.id,
            UpdateCustomer {
                name: None,
                last_name: None,
                mobile: Some("12345".to_string()),
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(error, CustomerError::Validation(_)));
}

#[tokio::test]
async fn deleted_customer_disappears_from_lookups() {
    let (svc, store) = service();
    let created = svc.save(save_customer("ana@example.com")).await.unwrap();

    svc.delete_by_id(created.id).await.unwrap();

    assert!(matches!(
        svc.find_by_id(created.id).await.unwrap_err(),
        CustomerError::NotFound { .. }
    ));
    assert!(matches!(
        svc.find_by_email("ana@example.com").await.unwrap_err(),
        CustomerError::NotFound { .. }
    ));
    assert!(matches!(
        svc.delete_by_id(created.id).await.unwrap_err(),
        CustomerError::NotFound { .. }
    ));

    // The row survives with its deletion marked, it is just invisible.
    let rows = store.rows();
    assert_eq!(rows.len(), 1);
    assert!(!rows[0].is_active);
    assert!(rows[0].deleted_at.is_some());
}

#[tokio::test]
async fn missing_customer_update_reports_not_found() {
    let (svc, _) = service();

    let error = svc
        .update_by_id(
            999,
            UpdateCustomer {
                name: Some("Eva".to_string()),
                last_name: None,
                mobile: None,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(error, CustomerError::NotFound { id: 999 }));
}
