//! Account entity, enums and the account service's own wire payloads.

use chrono::{DateTime, Utc};
use corebank_commons::dto::{GetAccount, GetCustomerDetail, SaveCustomer};
use corebank_commons::store::StoreError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    /// Savings account
    Savings,
    /// Checking account
    Checking,
    /// Fixed-term deposit account
    FixedTerm,
}

impl AccountType {
    /// Database string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Savings => "SAVINGS",
            Self::Checking => "CHECKING",
            Self::FixedTerm => "FIXED_TERM",
        }
    }

    /// Parses the database string representation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] for an unknown tag.
    pub fn parse(s: &str) -> Result<Self, StoreError> {
        match s {
            "SAVINGS" => Ok(Self::Savings),
            "CHECKING" => Ok(Self::Checking),
            "FIXED_TERM" => Ok(Self::FixedTerm),
            other => Err(StoreError::Database(format!("invalid account type: {other}"))),
        }
    }
}

/// Lifecycle status of an account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    /// Open and usable
    Active,
    /// Temporarily blocked
    Suspended,
    /// Permanently closed
    Closed,
}

impl AccountStatus {
    /// Database string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Suspended => "SUSPENDED",
            Self::Closed => "CLOSED",
        }
    }

    /// Parses the database string representation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] for an unknown tag.
    pub fn parse(s: &str) -> Result<Self, StoreError> {
        match s {
            "ACTIVE" => Ok(Self::Active),
            "SUSPENDED" => Ok(Self::Suspended),
            "CLOSED" => Ok(Self::Closed),
            other => Err(StoreError::Database(format!("invalid account status: {other}"))),
        }
    }
}

/// A stored account row.
///
/// The balance is an exact decimal with two fractional digits and is never
/// negative; the account number is unique among active rows. The customer
/// reference is by id only; the account does not own the customer's
/// lifecycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    /// Generated id
    pub id: i64,
    /// Unique account number
    pub account_number: String,
    /// Account kind
    pub account_type: AccountType,
    /// Lifecycle status
    pub status: AccountStatus,
    /// Current balance
    pub balance: Decimal,
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

impl From<Account> for GetAccount {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            account_number: account.account_number,
            account_type: account.account_type.as_str().to_string(),
            status: account.status.as_str().to_string(),
            balance: account.balance,
            customer_id: account.customer_id,
        }
    }
}

/// Attributes for an account about to be inserted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewAccount {
    /// Unique account number
    pub account_number: String,
    /// Account kind
    pub account_type: AccountType,
    /// Lifecycle status
    pub status: AccountStatus,
    /// Opening balance
    pub balance: Decimal,
    /// Owning customer id
    pub customer_id: i64,
}

/// Provisioning request: account attributes plus the full payload for the
/// customer to be created first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveAccount {
    /// Unique account number
    pub account_number: String,
    /// Account kind
    pub account_type: AccountType,
    /// Lifecycle status
    pub status: AccountStatus,
    /// Opening balance, zero or more
    pub balance: Decimal,
    /// Customer to create and link
    pub customer: SaveCustomer,
}

/// Combined view returned by a successful provisioning: the stored account
/// plus the customer detail from the creation response (not re-fetched).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullAccountInfo {
    /// The stored account
    pub account: GetAccount,
    /// The customer it is linked to
    pub customer: GetCustomerDetail,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn type_and_status_roundtrip() {
        for ty in [AccountType::Savings, AccountType::Checking, AccountType::FixedTerm] {
            assert_eq!(AccountType::parse(ty.as_str()).unwrap(), ty);
        }
        for status in [AccountStatus::Active, AccountStatus::Suspended, AccountStatus::Closed] {
            assert_eq!(AccountStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(AccountType::parse("GOLD").is_err());
    }

    #[test]
    fn account_type_uses_wire_tags() {
        let json = serde_json::to_value(AccountType::FixedTerm).unwrap();
        assert_eq!(json, "FIXED_TERM");
    }
}
