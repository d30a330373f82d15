//! In-memory saga log.

use crate::lock;
use chrono::{Duration, Utc};
use corebank_commons::store::StoreError;
use corebank_saga::{SagaKind, SagaLog, SagaRecord, SagaState};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// [`SagaLog`] over a shared map, with the state history of every record
/// kept for assertions.
#[derive(Clone, Default)]
pub struct InMemorySagaLog {
    inner: Arc<Mutex<HashMap<Uuid, SagaRecord>>>,
    history: Arc<Mutex<HashMap<Uuid, Vec<SagaState>>>>,
    fail_begin: Arc<AtomicBool>,
}

impl InMemorySagaLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `begin` fail.
    pub fn fail_begin(&self) {
        self.fail_begin.store(true, Ordering::SeqCst);
    }

    /// Inserts a record as-is, timestamps included. Lets tests plant
    /// stalled records in the past.
    pub fn seed(&self, record: SagaRecord) {
        lock(&self.inner).insert(record.id, record.clone());
        lock(&self.history)
            .entry(record.id)
            .or_default()
            .push(record.state);
    }

    /// Returns a record by id.
    #[must_use]
    pub fn record(&self, id: Uuid) -> Option<SagaRecord> {
        lock(&self.inner).get(&id).cloned()
    }

    /// Returns every record.
    #[must_use]
    pub fn records(&self) -> Vec<SagaRecord> {
        lock(&self.inner).values().cloned().collect()
    }

    /// Returns the states a record has passed through, `Started` first.
    #[must_use]
    pub fn states(&self, id: Uuid) -> Vec<SagaState> {
        lock(&self.history).get(&id).cloned().unwrap_or_default()
    }
}

impl SagaLog for InMemorySagaLog {
    async fn begin(
        &self,
        kind: SagaKind,
        payload: serde_json::Value,
    ) -> Result<Uuid, StoreError> {
        if self.fail_begin.load(Ordering::SeqCst) {
            return Err(StoreError::Database("injected begin failure".to_string()));
        }

        let id = Uuid::new_v4();
        let now = Utc::now();
        let record = SagaRecord {
            id,
            kind,
            state: SagaState::Started,
            payload,
            created_at: now,
            updated_at: now,
        };
        self.seed(record);
        Ok(id)
    }

    async fn transition(&self, id: Uuid, state: SagaState) -> Result<(), StoreError> {
        let mut inner = lock(&self.inner);
        let record = inner.get_mut(&id).ok_or(StoreError::RowNotFound)?;
        record.state = state;
        record.updated_at = Utc::now();
        lock(&self.history).entry(id).or_default().push(state);
        Ok(())
    }

    async fn find_stalled(
        &self,
        older_than: Duration,
        limit: usize,
    ) -> Result<Vec<SagaRecord>, StoreError> {
        let cutoff = Utc::now() - older_than;
        let mut stalled: Vec<SagaRecord> = lock(&self.inner)
            .values()
            .filter(|r| !r.state.is_clean_terminal() && r.updated_at < cutoff)
            .cloned()
            .collect();
        stalled.sort_by_key(|r| r.updated_at);
        stalled.truncate(limit);
        Ok(stalled)
    }
}
