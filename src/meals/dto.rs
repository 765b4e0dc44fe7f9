use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::advice::dto::MealAnalysis;
use crate::meals::repo_types::{Impact, MealType, Nutrition, RiskLevel};

/// Body of `POST /meals`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMeal {
    pub input: String,
    #[serde(default)]
    pub result: String,
    #[serde(rename = "mealType")]
    pub meal_type: MealType,
    #[serde(default)]
    pub risk: Option<RiskLevel>,
    #[serde(flatten)]
    pub nutrition: Nutrition,
    #[serde(default)]
    pub cholesterol_impact: Option<Impact>,
    #[serde(default)]
    pub neutral_fat_impact: Option<Impact>,
    /// `YYYY-MM-DD`; pinned to local noon. Defaults to now.
    #[serde(default)]
    pub date: Option<String>,
}

/// Body of `POST /meals/from-analysis`.
#[derive(Debug, Deserialize)]
pub struct SaveAnalysisRequest {
    pub item: MealAnalysis,
    #[serde(rename = "mealType")]
    pub meal_type: MealType,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
    pub risk: Option<RiskLevel>,
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteRequest {
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct BulkDeleteResponse {
    pub deleted: usize,
}
