use std::sync::Arc;

use anyhow::Context;
use tracing::warn;

use super::repo_types::UserProfile;
use crate::storage::KvStore;

pub const PROFILE_KEY: &str = "user-profile";

#[derive(Clone)]
pub struct ProfileRepo {
    store: Arc<dyn KvStore>,
}

impl ProfileRepo {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self) -> anyhow::Result<Option<UserProfile>> {
        let Some(raw) = self.store.get(PROFILE_KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(p) => Ok(Some(p)),
            Err(e) => {
                warn!(error = %e, "stored profile is not valid JSON; ignoring");
                Ok(None)
            }
        }
    }

    pub async fn save(&self, profile: &UserProfile) -> anyhow::Result<()> {
        let raw = serde_json::to_string(profile).context("serialize profile")?;
        self.store.put(PROFILE_KEY, raw).await
    }

    /// Daily calorie goal: the saved target, else `default`.
    pub async fn daily_target(&self, default: f64) -> anyhow::Result<f64> {
        Ok(self
            .get()
            .await?
            .map(|p| p.target_calories)
            .filter(|t| *t > 0.0)
            .unwrap_or(default))
    }
}
