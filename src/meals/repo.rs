use std::sync::Arc;

use anyhow::Context;
use serde_json::{Map, Value};
use time::{OffsetDateTime, UtcOffset};
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use super::dto::NewMeal;
use super::repo_types::MealRecord;
use super::services::{build_record, merge_patch};
use crate::storage::KvStore;

pub const HISTORY_KEY: &str = "meal-history";

#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error("meal not found")]
    NotFound,
    #[error("invalid update: {0}")]
    Invalid(#[from] serde_json::Error),
    #[error("date cannot be shown as a calendar day")]
    DateOutOfRange,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// The meal list, newest first, kept as one JSON array under [`HISTORY_KEY`].
#[derive(Clone)]
pub struct HistoryRepo {
    store: Arc<dyn KvStore>,
    write_lock: Arc<Mutex<()>>,
}

impl HistoryRepo {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Missing or unreadable history reads as empty.
    pub async fn list(&self) -> anyhow::Result<Vec<MealRecord>> {
        let Some(raw) = self.store.get(HISTORY_KEY).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str::<Vec<MealRecord>>(&raw) {
            Ok(records) => Ok(records),
            Err(e) => {
                warn!(error = %e, "stored meal history is not valid JSON; treating as empty");
                Ok(Vec::new())
            }
        }
    }

    async fn persist(&self, records: &[MealRecord]) -> anyhow::Result<()> {
        let raw = serde_json::to_string(records).context("serialize meal history")?;
        self.store.put(HISTORY_KEY, raw).await
    }

    pub async fn get(&self, id: Uuid) -> anyhow::Result<Option<MealRecord>> {
        Ok(self.list().await?.into_iter().find(|r| r.id == id))
    }

    pub async fn save(&self, new: NewMeal, date: OffsetDateTime) -> anyhow::Result<MealRecord> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.list().await?;
        let record = build_record(new, Uuid::new_v4(), date);
        records.insert(0, record.clone());
        self.persist(&records).await?;
        debug!(id = %record.id, total = records.len(), "meal saved");
        Ok(record)
    }

    /// Removes the single record with `id`; the rest keep their order.
    pub async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        Ok(self.delete_many(&[id]).await? > 0)
    }

    pub async fn delete_many(&self, ids: &[Uuid]) -> anyhow::Result<usize> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.list().await?;
        let before = records.len();
        records.retain(|r| !ids.contains(&r.id));
        let removed = before - records.len();
        if removed > 0 {
            self.persist(&records).await?;
        }
        debug!(requested = ids.len(), removed, "meals deleted");
        Ok(removed)
    }

    /// Merges `patch` into the record. A merged date with no calendar day in
    /// `offset` is rejected so day-based views keep working.
    pub async fn update(
        &self,
        id: Uuid,
        patch: &Map<String, Value>,
        offset: UtcOffset,
    ) -> Result<MealRecord, UpdateError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.list().await?;
        let slot = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(UpdateError::NotFound)?;
        let merged = merge_patch(slot, patch)?;
        if merged.local_date(offset).is_none() {
            return Err(UpdateError::DateOutOfRange);
        }
        *slot = merged.clone();
        self.persist(&records).await?;
        Ok(merged)
    }

    pub async fn clear(&self) -> anyhow::Result<()> {
        let _guard = self.write_lock.lock().await;
        self.store.remove(HISTORY_KEY).await
    }
}
