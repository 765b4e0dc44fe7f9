use base64::{engine::general_purpose::STANDARD, Engine};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use tracing::{info, warn};

use super::dto::{AdviceRequest, MealAnalysis};
use super::gemini::{Analyzer, InlineImage};
use super::prompt::build_prompt;
use crate::error::ApiError;

const FALLBACK_MIME: &str = "image/jpeg";

lazy_static! {
    static ref DATA_URL: Regex = Regex::new(r"^data:([^;,]*)(?:;[^,]*)?,").unwrap();
    static ref CODE_FENCE: Regex = Regex::new(r"```(?:json)?").unwrap();
}

/// Accepts a data URL or bare base64 and checks the payload decodes.
pub fn decode_image(raw: &str) -> Result<InlineImage, ApiError> {
    let raw = raw.trim();
    let (mime, payload) = match DATA_URL.captures(raw) {
        Some(caps) => {
            let declared = caps.get(1).map_or("", |m| m.as_str());
            let header_len = caps.get(0).map_or(0, |m| m.end());
            let mime = if declared.starts_with("image/") {
                declared
            } else {
                FALLBACK_MIME
            };
            (mime, &raw[header_len..])
        }
        None => (FALLBACK_MIME, raw),
    };
    let payload: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
    if payload.is_empty() {
        return Err(ApiError::BadRequest("image is empty".into()));
    }
    STANDARD
        .decode(&payload)
        .map_err(|e| ApiError::BadRequest(format!("image is not valid base64: {e}")))?;
    Ok(InlineImage {
        mime_type: mime.to_string(),
        data: payload,
    })
}

/// Model text to analysis items. Markdown fences are ignored and a lone
/// object is treated as a one-element list.
pub fn parse_model_output(text: &str) -> Result<Vec<MealAnalysis>, ApiError> {
    let cleaned = CODE_FENCE.replace_all(text, "");
    let value: Value = serde_json::from_str(cleaned.trim())
        .map_err(|e| ApiError::Analysis(e.to_string()))?;
    let value = match value {
        Value::Array(_) => value,
        obj @ Value::Object(_) => Value::Array(vec![obj]),
        other => {
            return Err(ApiError::Analysis(format!(
                "expected a JSON array, got {}",
                kind(&other)
            )))
        }
    };
    serde_json::from_value(value).map_err(|e| ApiError::Analysis(e.to_string()))
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

pub async fn analyze_meal(
    analyzer: &dyn Analyzer,
    default_model: &str,
    req: AdviceRequest,
) -> Result<Vec<MealAnalysis>, ApiError> {
    if !analyzer.is_configured() {
        return Err(ApiError::MissingApiKey);
    }
    let image = match req.image.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(decode_image(raw)?),
        _ => None,
    };
    if req.text.trim().is_empty() && image.is_none() {
        return Err(ApiError::BadRequest("text or image is required".into()));
    }

    let model = req
        .model_name
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or(default_model);
    let prompt = build_prompt(req.meal_type, &req.text);

    let raw = analyzer.generate(model, &prompt, image.as_ref()).await?;
    let items = parse_model_output(&raw).map_err(|e| {
        warn!(model, error = %e, "unparseable model output");
        e
    })?;
    info!(model, items = items.len(), "meal analysed");
    Ok(items)
}
