//! In-memory store implementations mirroring the Postgres semantics:
//! active-row visibility, version-conditional mutations, email and
//! account-number uniqueness, deposit idempotency.

use crate::lock;
use chrono::Utc;
use corebank_account::model::{Account, NewAccount};
use corebank_account::store::{AccountStore, DepositOutcome};
use corebank_commons::store::StoreError;
use corebank_credit::model::{Credit, NewCredit};
use corebank_credit::store::CreditStore;
use corebank_customer::model::{Customer, NewCustomer, UpdateCustomer};
use corebank_customer::store::CustomerStore;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// In-memory [`CustomerStore`].
#[derive(Clone, Default)]
pub struct InMemoryCustomerStore {
    inner: Arc<Mutex<CustomerRows>>,
}

#[derive(Default)]
struct CustomerRows {
    rows: HashMap<i64, Customer>,
    next_id: i64,
    fail_next_insert: Option<StoreError>,
}

impl InMemoryCustomerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `insert` fail with `error`.
    pub fn fail_next_insert(&self, error: StoreError) {
        lock(&self.inner).fail_next_insert = Some(error);
    }

    /// Returns every row, active or not.
    #[must_use]
    pub fn rows(&self) -> Vec<Customer> {
        lock(&self.inner).rows.values().cloned().collect()
    }
}

impl CustomerStore for InMemoryCustomerStore {
    async fn insert(&self, new: NewCustomer) -> Result<Customer, StoreError> {
        let mut inner = lock(&self.inner);
        if let Some(error) = inner.fail_next_insert.take() {
            return Err(error);
        }
        // Email is unique across all rows, deleted ones included.
        if inner.rows.values().any(|c| c.email == new.email) {
            return Err(StoreError::DuplicateKey("customers_email_key".to_string()));
        }

        inner.next_id += 1;
        let now = Utc::now();
        let customer = Customer {
            id: inner.next_id,
            name: new.name,
            last_name: new.last_name,
            email: new.email,
            mobile: new.mobile,
            address: new.address,
            is_active: true,
            version: 0,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        inner.rows.insert(customer.id, customer.clone());
        Ok(customer)
    }

    async fn find_active_by_id(&self, id: i64) -> Result<Option<Customer>, StoreError> {
        Ok(lock(&self.inner)
            .rows
            .get(&id)
            .filter(|c| c.is_active)
            .cloned())
    }

    async fn find_active_by_email(&self, email: &str) -> Result<Option<Customer>, StoreError> {
        Ok(lock(&self.inner)
            .rows
            .values()
            .find(|c| c.is_active && c.email == email)
            .cloned())
    }

    async fn update(
        &self,
        id: i64,
        version: i64,
        changes: UpdateCustomer,
    ) -> Result<Customer, StoreError> {
        let mut inner = lock(&self.inner);
        let Some(customer) = inner
            .rows
            .get_mut(&id)
            .filter(|c| c.is_active && c.version == version)
        else {
            return Err(StoreError::VersionConflict);
        };

        if let Some(name) = changes.name {
            customer.name = name;
        }
        if let Some(last_name) = changes.last_name {
            customer.last_name = last_name;
        }
        if let Some(mobile) = changes.mobile {
            customer.mobile = mobile;
        }
        customer.version += 1;
        customer.updated_at = Utc::now();
        Ok(customer.clone())
    }

    async fn mark_deleted(&self, id: i64, version: i64) -> Result<(), StoreError> {
        let mut inner = lock(&self.inner);
        let Some(customer) = inner
            .rows
            .get_mut(&id)
            .filter(|c| c.is_active && c.version == version)
        else {
            return Err(StoreError::VersionConflict);
        };

        customer.is_active = false;
        customer.version += 1;
        let now = Utc::now();
        customer.updated_at = now;
        customer.deleted_at = Some(now);
        Ok(())
    }
}

/// In-memory [`AccountStore`].
#[derive(Clone, Default)]
pub struct InMemoryAccountStore {
    inner: Arc<Mutex<AccountRows>>,
}

#[derive(Default)]
struct AccountRows {
    rows: HashMap<i64, Account>,
    deposit_keys: HashSet<String>,
    next_id: i64,
    fail_next_insert: Option<StoreError>,
}

impl InMemoryAccountStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `insert` fail with `error`.
    pub fn fail_next_insert(&self, error: StoreError) {
        lock(&self.inner).fail_next_insert = Some(error);
    }

    /// Returns every row, active or not.
    #[must_use]
    pub fn rows(&self) -> Vec<Account> {
        lock(&self.inner).rows.values().cloned().collect()
    }
}

impl AccountStore for InMemoryAccountStore {
    async fn insert(&self, new: NewAccount) -> Result<Account, StoreError> {
        let mut inner = lock(&self.inner);
        if let Some(error) = inner.fail_next_insert.take() {
            return Err(error);
        }
        // Numbers are unique among active rows only.
        if inner
            .rows
            .values()
            .any(|a| a.is_active && a.account_number == new.account_number)
        {
            return Err(StoreError::DuplicateKey(
                "uq_accounts_number_active".to_string(),
            ));
        }

        inner.next_id += 1;
        let now = Utc::now();
        let account = Account {
            id: inner.next_id,
            account_number: new.account_number,
            account_type: new.account_type,
            status: new.status,
            balance: new.balance,
            customer_id: new.customer_id,
            is_active: true,
            version: 0,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        inner.rows.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_active_by_number(
        &self,
        account_number: &str,
    ) -> Result<Option<Account>, StoreError> {
        Ok(lock(&self.inner)
            .rows
            .values()
            .find(|a| a.is_active && a.account_number == account_number)
            .cloned())
    }

    async fn deposit(
        &self,
        account_number: &str,
        amount: Decimal,
        idempotency_key: &str,
    ) -> Result<DepositOutcome, StoreError> {
        let mut inner = lock(&self.inner);

        if inner.deposit_keys.contains(idempotency_key) {
            let account = inner
                .rows
                .values()
                .find(|a| a.is_active && a.account_number == account_number)
                .cloned()
                .ok_or(StoreError::RowNotFound)?;
            return Ok(DepositOutcome {
                account,
                applied: false,
            });
        }

        let Some(account) = inner
            .rows
            .values_mut()
            .find(|a| a.is_active && a.account_number == account_number)
        else {
            // The key is not recorded when no account matched.
            return Err(StoreError::RowNotFound);
        };

        account.balance += amount;
        account.version += 1;
        account.updated_at = Utc::now();
        let applied = account.clone();
        inner.deposit_keys.insert(idempotency_key.to_string());

        Ok(DepositOutcome {
            account: applied,
            applied: true,
        })
    }

    async fn mark_deleted(&self, account_number: &str, version: i64) -> Result<(), StoreError> {
        let mut inner = lock(&self.inner);
        let Some(account) = inner
            .rows
            .values_mut()
            .find(|a| a.is_active && a.account_number == account_number && a.version == version)
        else {
            return Err(StoreError::VersionConflict);
        };

        account.is_active = false;
        account.version += 1;
        let now = Utc::now();
        account.updated_at = now;
        account.deleted_at = Some(now);
        Ok(())
    }
}

/// In-memory [`CreditStore`].
#[derive(Clone, Default)]
pub struct InMemoryCreditStore {
    inner: Arc<Mutex<CreditRows>>,
}

#[derive(Default)]
struct CreditRows {
    rows: HashMap<i64, Credit>,
    next_id: i64,
    fail_next_insert: Option<StoreError>,
}

impl InMemoryCreditStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `insert` fail with `error`.
    pub fn fail_next_insert(&self, error: StoreError) {
        lock(&self.inner).fail_next_insert = Some(error);
    }

    /// Returns every row, active or not.
    #[must_use]
    pub fn rows(&self) -> Vec<Credit> {
        lock(&self.inner).rows.values().cloned().collect()
    }
}

impl CreditStore for InMemoryCreditStore {
    async fn insert(&self, new: NewCredit) -> Result<Credit, StoreError> {
        let mut inner = lock(&self.inner);
        if let Some(error) = inner.fail_next_insert.take() {
            return Err(error);
        }

        inner.next_id += 1;
        let now = Utc::now();
        let credit = Credit {
            id: inner.next_id,
            amount: new.amount,
            term_months: new.term_months,
            interest_rate: new.interest_rate,
            credit_type: new.credit_type,
            account_number: new.account_number,
            customer_id: new.customer_id,
            is_active: true,
            version: 0,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        inner.rows.insert(credit.id, credit.clone());
        Ok(credit)
    }

    async fn find_active_by_id(&self, id: i64) -> Result<Option<Credit>, StoreError> {
        Ok(lock(&self.inner)
            .rows
            .get(&id)
            .filter(|c| c.is_active)
            .cloned())
    }

    async fn mark_deleted(&self, id: i64, version: i64) -> Result<(), StoreError> {
        let mut inner = lock(&self.inner);
        let Some(credit) = inner
            .rows
            .get_mut(&id)
            .filter(|c| c.is_active && c.version == version)
        else {
            return Err(StoreError::VersionConflict);
        };

        credit.is_active = false;
        credit.version += 1;
        let now = Utc::now();
        credit.updated_at = now;
        credit.deleted_at = Some(now);
        Ok(())
    }
}
