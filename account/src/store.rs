//! Account store: trait plus the Postgres implementation.

use crate::model::{Account, AccountStatus, AccountType, NewAccount};
use corebank_commons::store::StoreError;
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::future::Future;

/// Result of a deposit attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DepositOutcome {
    /// The account after the attempt
    pub account: Account,
    /// False when the idempotency key had been seen before and the amount
    /// was therefore not applied again
    pub applied: bool,
}

/// Durable account storage.
///
/// Lookups are restricted to active rows. The deposit is the one place the
/// store itself carries workflow-critical semantics: it must apply the
/// balance change and record the idempotency key atomically, and per-row
/// serialization of concurrent deposits is this layer's guarantee, not the
/// calling workflow's.
pub trait AccountStore: Send + Sync {
    /// Inserts an account and returns the stored row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateKey`] when an active account already
    /// uses the number, or [`StoreError::Database`] on other faults.
    fn insert(&self, new: NewAccount) -> impl Future<Output = Result<Account, StoreError>> + Send;

    /// Finds an active account by number.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on query faults.
    fn find_active_by_number(
        &self,
        account_number: &str,
    ) -> impl Future<Output = Result<Option<Account>, StoreError>> + Send;

    /// Adds `amount` to the active account's balance, deduplicated on
    /// `idempotency_key`: replaying a key returns the current row without
    /// applying the amount again.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::RowNotFound`] when no active account matches
    /// (and the key is not recorded in that case).
    fn deposit(
        &self,
        account_number: &str,
        amount: Decimal,
        idempotency_key: &str,
    ) -> impl Future<Output = Result<DepositOutcome, StoreError>> + Send;

    /// Logically deletes the row if the version still matches.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::VersionConflict`] on a version miss.
    fn mark_deleted(
        &self,
        account_number: &str,
        version: i64,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Postgres-backed account store.
pub struct PgAccountStore {
    pool: PgPool,
}

const ACCOUNT_COLUMNS: &str = "id, account_number, account_type, status, balance, customer_id, \
     is_active, version, created_at, updated_at, deleted_at";

impl PgAccountStore {
    /// Creates a store over the given connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the `accounts` and `account_deposits` tables if they do not
    /// exist. The account number is unique among active rows only, so a
    /// number can be reused after a logical delete.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] when the DDL fails.
    pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS accounts (
                id BIGSERIAL PRIMARY KEY,
                account_number TEXT NOT NULL,
                account_type TEXT NOT NULL,
                status TEXT NOT NULL,
                balance NUMERIC(19, 2) NOT NULL CHECK (balance >= 0),
                customer_id BIGINT NOT NULL,
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                version BIGINT NOT NULL DEFAULT 0,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                deleted_at TIMESTAMPTZ
            )
            ",
        )
        .execute(pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        sqlx::query(
            r"
            CREATE UNIQUE INDEX IF NOT EXISTS uq_accounts_number_active
            ON accounts(account_number) WHERE is_active
            ",
        )
        .execute(pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS account_deposits (
                idempotency_key TEXT PRIMARY KEY,
                account_number TEXT NOT NULL,
                amount NUMERIC(19, 2) NOT NULL,
                applied_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            ",
        )
        .execute(pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn row_to_account(row: &PgRow) -> Result<Account, StoreError> {
        let account_type: String = row.get("account_type");
        let status: String = row.get("status");

        Ok(Account {
            id: row.get("id"),
            account_number: row.get("account_number"),
            account_type: AccountType::parse(&account_type)?,
            status: AccountStatus::parse(&status)?,
            balance: row.get("balance"),
            customer_id: row.get("customer_id"),
            is_active: row.get("is_active"),
            version: row.get("version"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
            deleted_at: row.get("deleted_at"),
        })
    }
}

impl AccountStore for PgAccountStore {
    async fn insert(&self, new: NewAccount) -> Result<Account, StoreError> {
        let query = format!(
            r"
            INSERT INTO accounts (account_number, account_type, status, balance, customer_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ACCOUNT_COLUMNS}
            "
        );

        let row = sqlx::query(&query)
            .bind(&new.account_number)
            .bind(new.account_type.as_str())
            .bind(new.status.as_str())
            .bind(new.balance)
            .bind(new.customer_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::from_sqlx(&e))?;

        let account = Self::row_to_account(&row)?;

        tracing::info!(
            account_id = account.id,
            account_number = %account.account_number,
            customer_id = account.customer_id,
            "account stored"
        );
        metrics::counter!("account_store.inserted").increment(1);

        Ok(account)
    }

    async fn find_active_by_number(
        &self,
        account_number: &str,
    ) -> Result<Option<Account>, StoreError> {
        let query = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE account_number = $1 AND is_active"
        );

        let row = sqlx::query(&query)
            .bind(account_number)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::from_sqlx(&e))?;

        row.as_ref().map(Self::row_to_account).transpose()
    }

    async fn deposit(
        &self,
        account_number: &str,
        amount: Decimal,
        idempotency_key: &str,
    ) -> Result<DepositOutcome, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let recorded = sqlx::query(
            r"
            INSERT INTO account_deposits (idempotency_key, account_number, amount)
            VALUES ($1, $2, $3)
            ON CONFLICT (idempotency_key) DO NOTHING
            ",
        )
        .bind(idempotency_key)
        .bind(account_number)
        .bind(amount)
        .execute(&mut *tx)
        .await
        .map_err(|e| StoreError::from_sqlx(&e))?;

        if recorded.rows_affected() == 0 {
            // Replay of a key we have already applied: answer with the
            // current row, do not move money again.
            let query = format!(
                "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE account_number = $1 AND is_active"
            );
            let row = sqlx::query(&query)
                .bind(account_number)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| StoreError::from_sqlx(&e))?
                .ok_or(StoreError::RowNotFound)?;

            tx.commit()
                .await
                .map_err(|e| StoreError::Database(e.to_string()))?;

            tracing::info!(
                account_number,
                idempotency_key,
                "duplicate deposit ignored"
            );
            metrics::counter!("account_store.deposit_replays").increment(1);

            return Ok(DepositOutcome {
                account: Self::row_to_account(&row)?,
                applied: false,
            });
        }

        let query = format!(
            r"
            UPDATE accounts
            SET balance = balance + $1,
                version = version + 1,
                updated_at = now()
            WHERE account_number = $2 AND is_active
            RETURNING {ACCOUNT_COLUMNS}
            "
        );

        let row = sqlx::query(&query)
            .bind(amount)
            .bind(account_number)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| StoreError::from_sqlx(&e))?;

        let Some(row) = row else {
            // No active account: roll back so the key is not burned.
            tx.rollback()
                .await
                .map_err(|e| StoreError::Database(e.to_string()))?;
            return Err(StoreError::RowNotFound);
        };

        let account = Self::row_to_account(&row)?;

        tx.commit()
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        tracing::info!(
            account_number,
            %amount,
            balance = %account.balance,
            "deposit applied"
        );
        metrics::counter!("account_store.deposits").increment(1);

        Ok(DepositOutcome {
            account,
            applied: true,
        })
    }

    async fn mark_deleted(&self, account_number: &str, version: i64) -> Result<(), StoreError> {
        let result = sqlx::query(
            r"
            UPDATE accounts
            SET deleted_at = now(),
                is_active = FALSE,
                version = version + 1,
                updated_at = now()
            WHERE account_number = $1 AND is_active AND version = $2
            ",
        )
        .bind(account_number)
        .bind(version)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::from_sqlx(&e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::VersionConflict);
        }

        tracing::info!(account_number, "account logically deleted");
        metrics::counter!("account_store.deleted").increment(1);

        Ok(())
    }
}
