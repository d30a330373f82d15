//! Customer store: trait plus the Postgres implementation.

use crate::model::{Address, Customer, NewCustomer, UpdateCustomer};
use corebank_commons::store::StoreError;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use std::future::Future;

/// Durable customer storage.
///
/// Lookups are restricted to active rows; logically deleted customers are
/// invisible through this interface. Mutations take the version observed at
/// lookup and fail with [`StoreError::VersionConflict`] when it no longer
/// matches.
pub trait CustomerStore: Send + Sync {
    /// Inserts a customer and returns the stored row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateKey`] when the email is taken, or
    /// [`StoreError::Database`] on other faults.
    fn insert(
        &self,
        new: NewCustomer,
    ) -> impl Future<Output = Result<Customer, StoreError>> + Send;

    /// Finds an active customer by id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on query faults.
    fn find_active_by_id(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<Option<Customer>, StoreError>> + Send;

    /// Finds an active customer by email.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] on query faults.
    fn find_active_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<Customer>, StoreError>> + Send;

    /// Applies a partial update if the version still matches.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::VersionConflict`] on a version miss.
    fn update(
        &self,
        id: i64,
        version: i64,
        changes: UpdateCustomer,
    ) -> impl Future<Output = Result<Customer, StoreError>> + Send;

    /// Logically deletes the row if the version still matches: sets the
    /// deletion timestamp and clears the active flag.
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

/// Postgres-backed customer store.
pub struct PgCustomerStore {
    pool: PgPool,
}

const CUSTOMER_COLUMNS: &str = "id, name, last_name, email, mobile, \
     country, state, city, postal_code, street, street_number, apartment, floor, additional_info, \
     is_active, version, created_at, updated_at, deleted_at";

impl PgCustomerStore {
    /// Creates a store over the given connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the `customers` table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] when the DDL fails.
    pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS customers (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                mobile TEXT NOT NULL,
                country TEXT NOT NULL,
                state TEXT NOT NULL,
                city TEXT NOT NULL,
                postal_code TEXT NOT NULL,
                street TEXT NOT NULL,
                street_number TEXT NOT NULL,
                apartment TEXT,
                floor TEXT,
                additional_info TEXT,
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

    fn row_to_customer(row: &PgRow) -> Customer {
        Customer {
            id: row.get("id"),
            name: row.get("name"),
            last_name: row.get("last_name"),
            email: row.get("email"),
            mobile: row.get("mobile"),
            address: Address {
                country: row.get("country"),
                state: row.get("state"),
                city: row.get("city"),
                postal_code: row.get("postal_code"),
                street: row.get("street"),
                street_number: row.get("street_number"),
                apartment: row.get("apartment"),
                floor: row.get("floor"),
                additional_info: row.get("additional_info"),
            },
            is_active: row.get("is_active"),
            version: row.get("version"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
            deleted_at: row.get("deleted_at"),
        }
    }
}

impl CustomerStore for PgCustomerStore {
    async fn insert(&self, new: NewCustomer) -> Result<Customer, StoreError> {
        let query = format!(
            r"
            INSERT INTO customers (
                name, last_name, email, mobile,
                country, state, city, postal_code, street, street_number,
                apartment, floor, additional_info
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {CUSTOMER_COLUMNS}
            "
        );

        let row = sqlx::query(&query)
            .bind(&new.name)
            .bind(&new.last_name)
            .bind(&new.email)
            .bind(&new.mobile)
            .bind(&new.address.country)
            .bind(&new.address.state)
            .bind(&new.address.city)
            .bind(&new.address.postal_code)
            .bind(&new.address.street)
            .bind(&new.address.street_number)
            .bind(&new.address.apartment)
            .bind(&new.address.floor)
            .bind(&new.address.additional_info)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::from_sqlx(&e))?;

        let customer = Self::row_to_customer(&row);

        tracing::info!(customer_id = customer.id, email = %customer.email, "customer stored");
        metrics::counter!("customer_store.inserted").increment(1);

        Ok(customer)
    }

    async fn find_active_by_id(&self, id: i64) -> Result<Option<Customer>, StoreError> {
        let query = format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = $1 AND is_active"
        );

        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::from_sqlx(&e))?;

        Ok(row.as_ref().map(Self::row_to_customer))
    }

    async fn find_active_by_email(&self, email: &str) -> Result<Option<Customer>, StoreError> {
        let query = format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE email = $1 AND is_active"
        );

        let row = sqlx::query(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::from_sqlx(&e))?;

        Ok(row.as_ref().map(Self::row_to_customer))
    }

    async fn update(
        &self,
        id: i64,
        version: i64,
        changes: UpdateCustomer,
    ) -> Result<Customer, StoreError> {
        let query = format!(
            r"
            UPDATE customers
            SET name = COALESCE($1, name),
                last_name = COALESCE($2, last_name),
                mobile = COALESCE($3, mobile),
                version = version + 1,
                updated_at = now()
            WHERE id = $4 AND is_active AND version = $5
            RETURNING {CUSTOMER_COLUMNS}
            "
        );

        let row = sqlx::query(&query)
            .bind(&changes.name)
            .bind(&changes.last_name)
            .bind(&changes.mobile)
            .bind(id)
            .bind(version)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::from_sqlx(&e))?;

        row.as_ref()
            .map(Self::row_to_customer)
            .ok_or(StoreError::VersionConflict)
    }

    async fn mark_deleted(&self, id: i64, version: i64) -> Result<(), StoreError> {
        let result = sqlx::query(
            r"
            UPDATE customers
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

        tracing::info!(customer_id = id, "customer logically deleted");
        metrics::counter!("customer_store.deleted").increment(1);

        Ok(())
    }
}
