//! HTTP contract tests for the customer gateway, against a local mock
//! server.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use corebank_account::client::{CustomerGateway, HttpCustomerClient};
use corebank_commons::dto::{SaveAddress, SaveCustomer};
use corebank_commons::remote::TransportError;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json_string, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request() -> SaveCustomer {
    SaveCustomer {
        name: "Ana".to_string(),
        last_name: "Torres".to_string(),
        email: "ana@example.com".to_string(),
        mobile: "+1 5551234567".to_string(),
        address: SaveAddress {
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
    }
}

fn customer_body(id: i64) -> serde_json::Value {
    json!({
        "id": id,
        "name": "Ana",
        "last_name": "Torres",
        "email": "ana@example.com",
        "phone": "+1 5551234567",
        "address": {
            "country": "Argentina",
            "state": "Buenos Aires",
            "city": "La Plata",
            "postal_code": "1900",
            "street": "Calle 7",
            "street_number": "1234"
        }
    })
}

#[tokio::test]
async fn success_body_is_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/customers"))
        .respond_with(ResponseTemplate::new(201).set_body_json(customer_body(42)))
        .mount(&server)
        .await;

    let client = HttpCustomerClient::new(server.uri()).unwrap();
    let response = client.create_customer(&request()).await.unwrap();

    assert!(response.is_success());
    assert_eq!(response.status, 201);
    let customer = response.body.unwrap();
    assert_eq!(customer.id, 42);
    assert_eq!(customer.email, "ana@example.com");
}

#[tokio::test]
async fn error_body_message_becomes_details() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/customers"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({"message": "email already registered"})),
        )
        .mount(&server)
        .await;

    let client = HttpCustomerClient::new(server.uri()).unwrap();
    let response = client.create_customer(&request()).await.unwrap();

    assert!(!response.is_success());
    assert_eq!(response.status, 409);
    assert!(response.body.is_none());
    assert_eq!(response.details.as_deref(), Some("email already registered"));
}

#[tokio::test]
async fn unstructured_error_body_is_kept_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/customers"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = HttpCustomerClient::new(server.uri()).unwrap();
    let response = client.create_customer(&request()).await.unwrap();

    assert_eq!(response.status, 500);
    assert_eq!(response.details.as_deref(), Some("boom"));
}

#[tokio::test]
async fn empty_success_body_maps_to_none() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/customers"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = HttpCustomerClient::new(server.uri()).unwrap();
    let response = client.create_customer(&request()).await.unwrap();

    assert!(response.is_success());
    assert!(response.body.is_none());
}

#[tokio::test]
async fn malformed_success_body_is_a_transport_fault() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/customers"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = HttpCustomerClient::new(server.uri()).unwrap();
    let error = client.create_customer(&request()).await.unwrap_err();

    assert!(matches!(error, TransportError::Deserialize(_)));
}

#[tokio::test]
async fn slow_service_surfaces_as_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/customers"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(customer_body(1))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let client =
        HttpCustomerClient::with_timeout(server.uri(), Duration::from_millis(50)).unwrap();
    let error = client.create_customer(&request()).await.unwrap_err();

    assert!(matches!(error, TransportError::Timeout(_)));
}

#[tokio::test]
async fn request_body_is_the_serialized_payload() {
    let server = MockServer::start().await;
    let expected = serde_json::to_string(&request()).unwrap();
    Mock::given(method("POST"))
        .and(path("/customers"))
        .and(body_json_string(&expected))
        .respond_with(ResponseTemplate::new(201).set_body_json(customer_body(42)))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpCustomerClient::new(server.uri()).unwrap();
    client.create_customer(&request()).await.unwrap();
}
