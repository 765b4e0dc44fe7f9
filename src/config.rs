use anyhow::Context;
use serde::Deserialize;
use time::UtcOffset;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    /// Absent key is not a startup error; the advice endpoint reports it per request.
    pub api_key: Option<String>,
    pub default_model: String,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: String,
    pub gemini: GeminiConfig,
    pub utc_offset: UtcOffset,
    pub default_target_calories: f64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".into());
        let gemini = GeminiConfig {
            api_key: std::env::var("GEMINI_API_KEY")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            default_model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.into()),
            api_base: std::env::var("GEMINI_API_BASE")
                .unwrap_or_else(|_| DEFAULT_GEMINI_API_BASE.into()),
        };
        let offset_minutes = std::env::var("UTC_OFFSET_MINUTES")
            .ok()
            .and_then(|v| v.parse::<i32>().ok())
            .unwrap_or(0);
        let utc_offset = UtcOffset::from_whole_seconds(offset_minutes * 60)
            .context("UTC_OFFSET_MINUTES out of range")?;
        let default_target_calories = std::env::var("DEFAULT_TARGET_CALORIES")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(2000.0);
        Ok(Self {
            data_dir,
            gemini,
            utc_offset,
            default_target_calories,
        })
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            data_dir: "unused".into(),
            gemini: GeminiConfig {
                api_key: Some("test-key".into()),
                default_model: DEFAULT_GEMINI_MODEL.into(),
                api_base: "http://127.0.0.1:9".into(),
            },
            utc_offset: UtcOffset::UTC,
            default_target_calories: 2000.0,
        }
    }
}
