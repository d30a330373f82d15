//! Credit entity, enums and wire payloads.

use chrono::{DateTime, Utc};
use corebank_commons::store::StoreError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of credit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreditType {
    /// Unsecured personal credit
    Personal,
    /// Mortgage credit
    Mortgage,
    /// Vehicle credit
    Auto,
}

impl CreditType {
    /// Database string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Personal => "PERSONAL",
            Self::Mortgage => "MORTGAGE",
            Self::Auto => "AUTO",
        }
    }

    /// Parses the database string representation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] for an unknown tag.
    pub fn parse(s: &str) -> Result<Self, StoreError> {
        match s {
            "PERSONAL" => Ok(Self::Personal),
            "MORTGAGE" => Ok(Self::Mortgage),
            "AUTO" => Ok(Self::Auto),
            other => Err(StoreError::Database(format!("invalid credit type: {other}"))),
        }
    }
}

/// A stored credit row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credit {
    /// Generated id
    pub id: i64,
    /// Principal amount, strictly positive
    pub amount: Decimal,
    /// Repayment term in months (1-600)
    pub term_months: i32,
    /// Interest rate, strictly positive, at most 9.9999
    pub interest_rate: Decimal,
    /// Credit kind
    pub credit_type: CreditType,
    /// Account the principal was deposited into
    pub account_number: String,
    /// Owning customer id (weak reference)
    pub customer_id: i64,
    /// Logical-delete flag
    pub is_active: bool,
    /// Optimistic-concurrency version, bumped on every mutation
    pub version: i64,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
    /// Logical-delete timestamp, set once
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Attributes for a credit about to be inserted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewCredit {
    /// Principal amount
    pub amount: Decimal,
    /// Repayment term in months
    pub term_months: i32,
    /// Interest rate
    pub interest_rate: Decimal,
    /// Credit kind
    pub credit_type: CreditType,
    /// Account the principal was deposited into
    pub account_number: String,
    /// Owning customer id
    pub customer_id: i64,
}

/// Credit origination request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveCredit {
    /// Principal amount, strictly positive, at most 2 fractional digits
    pub amount: Decimal,
    /// Repayment term in months, 1-600
    pub term_months: i32,
    /// Interest rate, strictly positive, at most 9.9999 with 4 fractional
    /// digits
    pub interest_rate: Decimal,
    /// Credit kind
    pub credit_type: CreditType,
    /// Account to deposit the principal into
    pub account_number: String,
    /// Owning customer id; cross-checked against the account's actual owner
    pub customer_id: i64,
    /// Caller-supplied token letting the account store deduplicate a
    /// retried origination's deposit
    pub idempotency_key: String,
}

/// Credit view returned to callers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetCredit {
    /// Generated id
    pub id: i64,
    /// Principal amount
    pub amount: Decimal,
    /// Repayment term in months
    pub term_months: i32,
    /// Interest rate
    pub interest_rate: Decimal,
    /// Credit kind tag (e.g. `PERSONAL`)
    pub credit_type: String,
    /// Account the principal was deposited into
    pub account_number: String,
    /// Owning customer id
    pub customer_id: i64,
}

impl From<Credit> for GetCredit {
    fn from(credit: Credit) -> Self {
        Self {
            id: credit.id,
            amount: credit.amount,
            term_months: credit.term_months,
            interest_rate: credit.interest_rate,
            credit_type: credit.credit_type.as_str().to_string(),
            account_number: credit.account_number,
            customer_id: credit.customer_id,
        }
    }
}

/// Payload of the `CreditCreated` domain event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditCreated {
    /// Owning customer id
    pub customer_id: i64,
    /// Account the principal was deposited into
    pub account_number: String,
    /// Principal amount
    pub amount: Decimal,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn credit_type_roundtrip() {
        for ty in [CreditType::Personal, CreditType::Mortgage, CreditType::Auto] {
            assert_eq!(CreditType::parse(ty.as_str()).unwrap(), ty);
        }
        assert!(CreditType::parse("PAYDAY").is_err());
    }
}
