use crate::advice::gemini::{Analyzer, GeminiAnalyzer};
use crate::config::AppConfig;
use crate::meals::repo::HistoryRepo;
use crate::profile::repo::ProfileRepo;
use crate::storage::{FileStore, KvStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub history: HistoryRepo,
    pub profiles: ProfileRepo,
    pub analyzer: Arc<dyn Analyzer>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store = Arc::new(FileStore::new(&config.data_dir).await?) as Arc<dyn KvStore>;
        if config.gemini.api_key.is_none() {
            tracing::warn!("GEMINI_API_KEY is not set; /advice will fail until it is");
        }
        let analyzer = Arc::new(GeminiAnalyzer::new(config.gemini.clone())) as Arc<dyn Analyzer>;

        Ok(Self::from_parts(config, store, analyzer))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        store: Arc<dyn KvStore>,
        analyzer: Arc<dyn Analyzer>,
    ) -> Self {
        Self {
            config,
            history: HistoryRepo::new(store.clone()),
            profiles: ProfileRepo::new(store),
            analyzer,
        }
    }

    /// In-memory store and a canned model reply.
    #[cfg(test)]
    pub fn fake() -> Self {
        Self::fake_with_reply(Some(fake::CANNED_REPLY.into()))
    }

    /// `None` behaves like a missing API key.
    #[cfg(test)]
    pub fn fake_with_reply(reply: Option<String>) -> Self {
        use crate::storage::MemoryStore;

        let config = Arc::new(AppConfig::for_tests());
        let store = Arc::new(MemoryStore::default()) as Arc<dyn KvStore>;
        let analyzer = Arc::new(fake::FakeAnalyzer { reply }) as Arc<dyn Analyzer>;
        Self::from_parts(config, store, analyzer)
    }
}
