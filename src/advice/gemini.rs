//! Google Gemini `generateContent` client.
//!
//! One request per analysis: no retry, no streaming, no explicit timeout.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::dto::ModelInfo;
use crate::config::GeminiConfig;
use crate::error::ApiError;

/// Photo attached to a prompt, already validated base64.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

/// The generative model behind `/advice`.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// False when no credential is available; nothing is sent in that case.
    fn is_configured(&self) -> bool;

    /// Raw text produced by `model` for `prompt`.
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        image: Option<&InlineImage>,
    ) -> Result<String, ApiError>;

    /// Models that support content generation.
    async fn list_models(&self) -> Result<Vec<ModelInfo>, ApiError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: Blob<'a>,
    },
}

#[derive(Debug, Serialize)]
struct Blob<'a> {
    #[serde(rename = "mimeType")]
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ModelsPage {
    #[serde(default)]
    models: Vec<RemoteModel>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoteModel {
    name: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

pub struct GeminiAnalyzer {
    config: GeminiConfig,
    client: Client,
}

impl GeminiAnalyzer {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    fn api_key(&self) -> Result<&str, ApiError> {
        self.config.api_key.as_deref().ok_or(ApiError::MissingApiKey)
    }

    fn upstream_error(status: reqwest::StatusCode, body: &str) -> ApiError {
        let message = serde_json::from_str::<GenerateResponse>(body)
            .ok()
            .and_then(|r| r.error)
            .map_or_else(|| body.to_string(), |e| e.message);
        ApiError::Analysis(format!("Gemini API error ({status}): {message}"))
    }
}

fn build_request<'a>(prompt: &'a str, image: Option<&'a InlineImage>) -> GenerateRequest<'a> {
    let mut parts = vec![Part::Text { text: prompt }];
    if let Some(img) = image {
        parts.push(Part::Inline {
            inline_data: Blob {
                mime_type: &img.mime_type,
                data: &img.data,
            },
        });
    }
    GenerateRequest {
        contents: vec![Content { parts }],
    }
}

/// Concatenated text of the first candidate.
fn response_text(resp: GenerateResponse) -> Result<String, ApiError> {
    if let Some(e) = resp.error {
        return Err(ApiError::Analysis(format!("Gemini API error: {}", e.message)));
    }
    let candidate = resp
        .candidates
        .and_then(|c| c.into_iter().next())
        .ok_or_else(|| ApiError::Analysis("no candidates in Gemini response".into()))?;
    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".into());
        return Err(ApiError::Analysis(format!(
            "empty Gemini response (finish reason: {reason})"
        )));
    }
    Ok(text)
}

fn generation_models(page: ModelsPage) -> Vec<ModelInfo> {
    page.models
        .into_iter()
        .filter(|m| m.supported_generation_methods.iter().any(|g| g == "generateContent"))
        .map(|m| ModelInfo {
            name: m.name.trim_start_matches("models/").to_string(),
            display_name: m.display_name,
        })
        .collect()
}

#[async_trait]
impl Analyzer for GeminiAnalyzer {
    fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    #[instrument(skip(self, prompt, image), fields(has_image = image.is_some()))]
    async fn generate(
        &self,
        model: &str,
        prompt: &str,
        image: Option<&InlineImage>,
    ) -> Result<String, ApiError> {
        let key = self.api_key()?;
        let url = format!("{}/models/{}:generateContent", self.config.api_base, model);
        debug!("sending request to Gemini");

        let response = self
            .client
            .post(&url)
            .query(&[("key", key)])
            .json(&build_request(prompt, image))
            .send()
            .await
            .map_err(|e| ApiError::Analysis(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Analysis(format!("failed to read response: {e}")))?;
        if !status.is_success() {
            error!(%status, "Gemini API error");
            return Err(Self::upstream_error(status, &body));
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| ApiError::Analysis(format!("failed to parse Gemini response: {e}")))?;
        response_text(parsed)
    }

    #[instrument(skip(self))]
    async fn list_models(&self) -> Result<Vec<ModelInfo>, ApiError> {
        let key = self.api_key()?;
        let url = format!("{}/models", self.config.api_base);
        let response = self
            .client
            .get(&url)
            .query(&[("key", key)])
            .send()
            .await
            .map_err(|e| ApiError::Analysis(format!("HTTP request failed: {e}")))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Analysis(format!("failed to read response: {e}")))?;
        if !status.is_success() {
            error!(%status, "Gemini model listing failed");
            return Err(Self::upstream_error(status, &body));
        }
        let page: ModelsPage = serde_json::from_str(&body)
            .map_err(|e| ApiError::Analysis(format!("failed to parse model list: {e}")))?;
        Ok(generation_models(page))
    }
}
