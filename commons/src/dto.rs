//! Wire payloads exchanged between the corebank services.
//!
//! These types define the remote contracts: what the account service sends
//! when it asks the customer service to create a customer, and what the
//! credit service sends when it asks the account service for a deposit.
//! Field names are the wire names; both sides deserialize with serde.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Address payload embedded in a customer creation request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveAddress {
    /// Country name
    pub country: String,
    /// State or province
    pub state: String,
    /// City name
    pub city: String,
    /// Postal or ZIP code
    pub postal_code: String,
    /// Street name
    pub street: String,
    /// Street number
    pub street_number: String,
    /// Apartment identifier, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apartment: Option<String>,
    /// Floor, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor: Option<String>,
    /// Free-form additional information
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
}

/// Customer creation request, sent by the account service to the customer
/// service when provisioning a new banking relationship.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveCustomer {
    /// First name
    pub name: String,
    /// Last name
    pub last_name: String,
    /// Unique email address
    pub email: String,
    /// Mobile number in international format (e.g. `+1 5551234567`)
    pub mobile: String,
    /// Embedded address
    pub address: SaveAddress,
}

/// Address as returned by the customer service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetAddress {
    /// Country name
    pub country: String,
    /// State or province
    pub state: String,
    /// City name
    pub city: String,
    /// Postal or ZIP code
    pub postal_code: String,
    /// Street name
    pub street: String,
    /// Street number
    pub street_number: String,
    /// Apartment identifier, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apartment: Option<String>,
    /// Floor, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor: Option<String>,
    /// Free-form additional information
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
}

/// Customer detail as returned by the customer service on a successful
/// creation. The wire contract calls the mobile number `phone` here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetCustomerDetail {
    /// Generated customer id. Deserializes to 0 when the remote body omits
    /// it, which callers must treat as a contract violation.
    #[serde(default)]
    pub id: i64,
    /// First name
    pub name: String,
    /// Last name
    pub last_name: String,
    /// Email address
    pub email: String,
    /// Mobile number
    pub phone: String,
    /// Embedded address
    pub address: GetAddress,
    /// Creation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Deposit request, sent by the credit service to the account service.
///
/// The `idempotency_key` lets the account store deduplicate retried
/// requests: replaying the same key never applies the amount twice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositRequest {
    /// Target account number
    pub account_number: String,
    /// Amount to deposit, strictly positive
    pub amount: Decimal,
    /// Caller-supplied deduplication token
    pub idempotency_key: String,
}

/// Account view as returned by the account service after a deposit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetAccount {
    /// Generated account id
    pub id: i64,
    /// Unique account number
    pub account_number: String,
    /// Account type tag (e.g. `SAVINGS`)
    pub account_type: String,
    /// Status tag (e.g. `ACTIVE`)
    pub status: String,
    /// Balance after the operation
    pub balance: Decimal,
    /// Owning customer id
    pub customer_id: i64,
}

/// Error body shape remote services answer with on a non-2xx result.
///
/// Only best-effort: callers fall back to the raw body text when this does
/// not parse.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable error message
    pub message: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn save_customer_round_trips_wire_names() {
        let json = r#"{
            "name": "Ana",
            "last_name": "Li",
            "email": "ana@x.com",
            "mobile": "+1 5551234567",
            "address": {
                "country": "Argentina",
                "state": "Buenos Aires",
                "city": "La Plata",
                "postal_code": "1900",
                "street": "Calle 7",
                "street_number": "1234"
            }
        }"#;

        let customer: SaveCustomer = serde_json::from_str(json).unwrap();
        assert_eq!(customer.last_name, "Li");
        assert_eq!(customer.address.apartment, None);

        let back = serde_json::to_value(&customer).unwrap();
        assert_eq!(back["last_name"], "Li");
        assert!(back["address"].get("apartment").is_none());
    }

    #[test]
    fn get_account_deserializes_decimal_balance() {
        let json = r#"{
            "id": 7,
            "account_number": "AC-1",
            "account_type": "SAVINGS",
            "status": "ACTIVE",
            "balance": "150.00",
            "customer_id": 42
        }"#;

        let account: GetAccount = serde_json::from_str(json).unwrap();
        assert_eq!(account.balance, dec!(150.00));
        assert_eq!(account.customer_id, 42);
    }
}
