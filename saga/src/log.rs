//! The saga log: durable record of every workflow execution.

use crate::record::{SagaKind, SagaRecord, SagaState};
use chrono::{Duration, Utc};
use corebank_commons::store::StoreError;
use sqlx::{PgPool, Row};
use std::future::Future;
use uuid::Uuid;

/// Durable log of workflow executions.
///
/// `begin` runs before any side effect, so callers fail their workflow when
/// it errors. Transitions after that are advisory; use
/// [`transition_quietly`] from workflow code.
pub trait SagaLog: Send + Sync {
    /// Creates a record in [`SagaState::Started`] and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the record cannot be written.
    fn begin(
        &self,
        kind: SagaKind,
        payload: serde_json::Value,
    ) -> impl Future<Output = Result<Uuid, StoreError>> + Send;

    /// Moves an existing record to `state`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the update fails or the record is absent.
    fn transition(
        &self,
        id: Uuid,
        state: SagaState,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Returns records stuck in a dirty state for longer than `older_than`,
    /// oldest first, at most `limit` of them.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the scan fails.
    fn find_stalled(
        &self,
        older_than: Duration,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<SagaRecord>, StoreError>> + Send;
}

/// Records a transition, logging instead of failing when the log is
/// unavailable. Saga bookkeeping must never break the business path once a
/// side effect may exist.
pub async fn transition_quietly<L: SagaLog>(log: &L, id: Uuid, state: SagaState) {
    if let Err(error) = log.transition(id, state).await {
        tracing::warn!(
            saga_id = %id,
            state = state.as_str(),
            error = %error,
            "saga transition not recorded"
        );
        metrics::counter!("saga.transition_failures").increment(1);
    }
}

/// Postgres-backed saga log.
pub struct PgSagaLog {
    pool: PgPool,
}

impl PgSagaLog {
    /// Creates a log over the given connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the `sagas` table and its scan index if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] when the DDL fails.
    pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS sagas (
                id UUID PRIMARY KEY,
                kind TEXT NOT NULL,
                state TEXT NOT NULL,
                payload JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            ",
        )
        .execute(pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_sagas_state_updated ON sagas(state, updated_at)")
            .execute(pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }
}

impl SagaLog for PgSagaLog {
    async fn begin(
        &self,
        kind: SagaKind,
        payload: serde_json::Value,
    ) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();

        sqlx::query(
            r"
            INSERT INTO sagas (id, kind, state, payload)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(id)
        .bind(kind.as_str())
        .bind(SagaState::Started.as_str())
        .bind(&payload)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::from_sqlx(&e))?;

        tracing::debug!(saga_id = %id, kind = kind.as_str(), "saga started");

        Ok(id)
    }

    async fn transition(&self, id: Uuid, state: SagaState) -> Result<(), StoreError> {
        let result = sqlx::query(
            r"
            UPDATE sagas
            SET state = $1, updated_at = now()
            WHERE id = $2
            ",
        )
        .bind(state.as_str())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::from_sqlx(&e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::RowNotFound);
        }

        tracing::debug!(saga_id = %id, state = state.as_str(), "saga transitioned");

        Ok(())
    }

    async fn find_stalled(
        &self,
        older_than: Duration,
        limit: usize,
    ) -> Result<Vec<SagaRecord>, StoreError> {
        let cutoff = Utc::now() - older_than;

        #[allow(clippy::cast_possible_wrap)]
        let rows = sqlx::query(
            r"
            SELECT id, kind, state, payload, created_at, updated_at
            FROM sagas
            WHERE state NOT IN ('remote_call_failed', 'persisted', 'event_published', 'compensated')
              AND updated_at < $1
            ORDER BY updated_at ASC
            LIMIT $2
            ",
        )
        .bind(cutoff)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::from_sqlx(&e))?;

        rows.iter()
            .map(|row| {
                let kind: String = row.get("kind");
                let state: String = row.get("state");
                Ok(SagaRecord {
                    id: row.get("id"),
                    kind: SagaKind::parse(&kind)?,
                    state: SagaState::parse(&state)?,
                    payload: row.get("payload"),
                    created_at: row.get("created_at"),
                    updated_at: row.get("updated_at"),
                })
            })
            .collect()
    }
}
