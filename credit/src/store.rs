//! Credit store: trait plus the Postgres implementation.

use crate::model::{Credit, CreditType, NewCredit};
use corebank_commons::store::StoreError;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::future::Future;

/// Durable credit storage. Lookups are restricted to active rows.
pub trait CreditStore: Send + Sync {
    /// Inserts a credit and returns the stored row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on insert faults.
    fn insert(&self, new: NewCredit) -> impl Future<Output = Result<Credit, StoreError>> + Send;

    /// Finds an active credit by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on query faults.
    fn find_active_by_id(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Option<Credit>, StoreError>> + Send;

    /// Logically deletes the row if the version still matches.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::VersionConflict`] on a version miss.
    fn mark_deleted(
        &self,
        id: i64,
        version: i64,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Postgres-backed credit store.
pub struct PgCreditStore {
    pool: PgPool,
}

const CREDIT_COLUMNS: &str = "id, amount, term_months, interest_rate, credit_type, \
     account_number, customer_id, is_active, version, created_at, updated_at, deleted_at";

impl PgCreditStore {
    /// Creates a store over the given connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the `credits` table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] when the DDL fails.
    pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS credits (
                id BIGSERIAL PRIMARY KEY,
                amount NUMERIC(19, 2) NOT NULL CHECK (amount > 0),
                term_months INT NOT NULL CHECK (term_months BETWEEN 1 AND 600),
                interest_rate NUMERIC(5, 4) NOT NULL CHECK (interest_rate > 0),
                credit_type TEXT NOT NULL,
                account_number TEXT NOT NULL,
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

        Ok(())
    }

    fn row_to_credit(row: &PgRow) -> Result<Credit, StoreError> {
        let credit_type: String = row.get("credit_type");

        Ok(Credit {
            id: row.get("id"),
            amount: row.get("amount"),
            term_months: row.get("term_months"),
            interest_rate: row.get("interest_rate"),
            credit_type: CreditType::parse(&credit_type)?,
            account_number: row.get("account_number"),
            customer_id: row.get("customer_id"),
            is_active: row.get("is_active"),
            version: row.get("version"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
            deleted_at: row.get("deleted_at"),
        })
    }
}

impl CreditStore for PgCreditStore {
    async fn insert(&self, new: NewCredit) -> Result<Credit, StoreError> {
        let query = format!(
            r"
            INSERT INTO credits (amount, term_months, interest_rate, credit_type,
                                 account_number, customer_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {CREDIT_COLUMNS}
            "
        );

        let row = sqlx::query(&query)
            .bind(new.amount)
            .bind(new.term_months)
            .bind(new.interest_rate)
            .bind(new.credit_type.as_str())
            .bind(&new.account_number)
            .bind(new.customer_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::from_sqlx(&e))?;

        let credit = Self::row_to_credit(&row)?;

        tracing::info!(
            credit_id = credit.id,
            account_number = %credit.account_number,
            customer_id = credit.customer_id,
            "credit stored"
        );
        metrics::counter!("credit_store.inserted").increment(1);

        Ok(credit)
    }

    async fn find_active_by_id(&self, id: i64) -> Result<Option<Credit>, StoreError> {
        let query = format!("SELECT {CREDIT_COLUMNS} FROM credits WHERE id = $1 AND is_active");

        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::from_sqlx(&e))?;

        row.as_ref().map(Self::row_to_credit).transpose()
    }

    async fn mark_deleted(&self, id: i64, version: i64) -> Result<(), StoreError> {
        let result = sqlx::query(
            r"
            UPDATE credits
            SET deleted_at = now(),
                is_active = FALSE,
                version = version + 1,
                updated_at = now()
            WHERE id = $1 AND is_active AND version = $2
            ",
        )
        .bind(id)
        .bind(version)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::from_sqlx(&e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::VersionConflict);
        }

        tracing::info!(credit_id = id, "credit logically deleted");
        metrics::counter!("credit_store.deleted").increment(1);

        Ok(())
    }
}
