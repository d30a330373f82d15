//! Input validation shared by the write paths.
//!
//! Every workflow validates its full input before the first remote call is
//! made, so a malformed request can never leave a partial side effect
//! behind. The helpers here are deliberately small; each service composes
//! them into its own request checks.

use crate::dto::{DepositRequest, SaveAddress, SaveCustomer};
use regex::Regex;
use rust_decimal::Decimal;
use std::sync::LazyLock;
use thiserror::Error;

/// International mobile format: `+` then a 1-4 digit country code, an
/// optional space, then 7-15 digits.
const MOBILE_PATTERN: &str = r"^\+[1-9][0-9]{0,3}\s?[0-9]{7,15}$";

/// Loose email shape check: one `@`, no whitespace, a dotted domain.
const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

#[allow(clippy::expect_used)] // pattern is a constant, checked by tests
static MOBILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(MOBILE_PATTERN).expect("mobile pattern compiles"));

#[allow(clippy::expect_used)] // pattern is a constant, checked by tests
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("email pattern compiles"));

/// A rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid `{field}`: {message}")]
pub struct ValidationError {
    /// The offending field, dot-separated for nested payloads
    pub field: String,
    /// What was wrong with it
    pub message: String,
}

impl ValidationError {
    /// Builds an error for `field` with the given message.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Rejects a blank value or one longer than `max` characters.
///
/// # Errors
///
/// Returns [`ValidationError`] when the value is blank or too long.
pub fn non_blank(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be blank"));
    }
    if value.chars().count() > max {
        return Err(ValidationError::new(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(())
}

/// Rejects an amount that is not strictly positive.
///
/// # Errors
///
/// Returns [`ValidationError`] when `value <= 0`.
pub fn positive(field: &str, value: Decimal) -> Result<(), ValidationError> {
    if value <= Decimal::ZERO {
        return Err(ValidationError::new(field, "must be strictly positive"));
    }
    Ok(())
}

/// Rejects a negative amount (zero is allowed).
///
/// # Errors
///
/// Returns [`ValidationError`] when `value < 0`.
pub fn non_negative(field: &str, value: Decimal) -> Result<(), ValidationError> {
    if value < Decimal::ZERO {
        return Err(ValidationError::new(field, "must not be negative"));
    }
    Ok(())
}

/// Rejects a decimal with more than `max` fractional digits.
///
/// # Errors
///
/// Returns [`ValidationError`] when the scale exceeds `max`.
pub fn max_scale(field: &str, value: Decimal, max: u32) -> Result<(), ValidationError> {
    if value.scale() > max {
        return Err(ValidationError::new(
            field,
            format!("must have at most {max} fractional digits"),
        ));
    }
    Ok(())
}

/// Rejects an integer outside `min..=max`.
///
/// # Errors
///
/// Returns [`ValidationError`] when the value is out of range.
pub fn in_range(field: &str, value: i32, min: i32, max: i32) -> Result<(), ValidationError> {
    if value < min || value > max {
        return Err(ValidationError::new(
            field,
            format!("must be between {min} and {max}"),
        ));
    }
    Ok(())
}

/// Rejects a malformed email address.
///
/// # Errors
///
/// Returns [`ValidationError`] when the value does not look like an email.
pub fn email(field: &str, value: &str) -> Result<(), ValidationError> {
    if !EMAIL_RE.is_match(value) {
        return Err(ValidationError::new(field, "must be a valid email address"));
    }
    Ok(())
}

/// Rejects a mobile number not in international format.
///
/// # Errors
///
/// Returns [`ValidationError`] when the value does not match the
/// international mobile pattern.
pub fn mobile(field: &str, value: &str) -> Result<(), ValidationError> {
    if !MOBILE_RE.is_match(value) {
        return Err(ValidationError::new(
            field,
            "must be an international mobile number like +54 1122334455",
        ));
    }
    Ok(())
}

/// Validates a full customer creation payload.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found, with nested fields reported
/// as `address.<field>`.
pub fn save_customer(customer: &SaveCustomer) -> Result<(), ValidationError> {
    non_blank("name", &customer.name, 100)?;
    non_blank("last_name", &customer.last_name, 100)?;
    non_blank("email", &customer.email, 150)?;
    email("email", &customer.email)?;
    non_blank("mobile", &customer.mobile, 20)?;
    mobile("mobile", &customer.mobile)?;
    address(&customer.address)
}

/// Validates an embedded address payload.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found.
pub fn address(address: &SaveAddress) -> Result<(), ValidationError> {
    non_blank("address.country", &address.country, 50)?;
    non_blank("address.state", &address.state, 50)?;
    non_blank("address.city", &address.city, 50)?;
    non_blank("address.postal_code", &address.postal_code, 20)?;
    non_blank("address.street", &address.street, 100)?;
    non_blank("address.street_number", &address.street_number, 10)?;
    if let Some(apartment) = &address.apartment {
        non_blank("address.apartment", apartment, 10)?;
    }
    if let Some(floor) = &address.floor {
        non_blank("address.floor", floor, 5)?;
    }
    if let Some(info) = &address.additional_info {
        non_blank("address.additional_info", info, 200)?;
    }
    Ok(())
}

/// Validates a deposit request. Zero amounts are rejected here: a deposit
/// must move money.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found.
pub fn deposit(request: &DepositRequest) -> Result<(), ValidationError> {
    non_blank("account_number", &request.account_number, 30)?;
    positive("amount", request.amount)?;
    max_scale("amount", request.amount, 2)?;
    non_blank("idempotency_key", &request.idempotency_key, 64)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::dto::SaveAddress;
    use rust_decimal_macros::dec;

    fn test_address() -> SaveAddress {
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

    fn test_customer() -> SaveCustomer {
        SaveCustomer {
            name: "Ana".to_string(),
            last_name: "Li".to_string(),
            email: "ana@x.com".to_string(),
            mobile: "+1 5551234567".to_string(),
            address: test_address(),
        }
    }

    #[test]
    fn accepts_a_well_formed_customer() {
        assert!(save_customer(&test_customer()).is_ok());
    }

    #[test]
    fn rejects_blank_name() {
        let mut customer = test_customer();
        customer.name = "   ".to_string();
        let err = save_customer(&customer).unwrap_err();
        assert_eq!(err.field, "name");
    }

    #[test]
    fn mobile_accepts_single_digit_country_code() {
        assert!(mobile("mobile", "+1 5551234567").is_ok());
        assert!(mobile("mobile", "+54 1122334455").is_ok());
        assert!(mobile("mobile", "+541122334455").is_ok());
    }

    #[test]
    fn mobile_rejects_garbage() {
        assert!(mobile("mobile", "5551234567").is_err());
        assert!(mobile("mobile", "+0 5551234567").is_err());
        assert!(mobile("mobile", "+1 555").is_err());
        assert!(mobile("mobile", "").is_err());
    }

    #[test]
    fn zero_deposit_amount_is_rejected() {
        let request = DepositRequest {
            account_number: "AC-1".to_string(),
            amount: Decimal::ZERO,
            idempotency_key: "key-1".to_string(),
        };
        let err = deposit(&request).unwrap_err();
        assert_eq!(err.field, "amount");
    }

    #[test]
    fn deposit_amount_scale_is_capped_at_two() {
        let request = DepositRequest {
            account_number: "AC-1".to_string(),
            amount: dec!(10.001),
            idempotency_key: "key-1".to_string(),
        };
        assert!(deposit(&request).is_err());
    }

    #[test]
    fn in_range_bounds_are_inclusive() {
        assert!(in_range("term_months", 1, 1, 600).is_ok());
        assert!(in_range("term_months", 600, 1, 600).is_ok());
        assert!(in_range("term_months", 0, 1, 600).is_err());
        assert!(in_range("term_months", 601, 1, 600).is_err());
    }
}
