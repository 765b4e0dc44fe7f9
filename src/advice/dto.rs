use serde::{Deserialize, Serialize};

use crate::meals::repo_types::{Impact, MealType, Nutrition, RiskLevel};

/// Body of `POST /advice`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdviceRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub meal_type: Option<MealType>,
    /// Data URL or bare base64 of a meal photo.
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NutritionTip {
    pub nutrient: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub advice: String,
}

/// One food item as assessed by the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MealAnalysis {
    pub name: String,
    pub risk: RiskLevel,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub alternatives: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(flatten)]
    pub nutrition: Nutrition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cholesterol_impact: Option<Impact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neutral_fat_impact: Option<Impact>,
    #[serde(default)]
    pub nutrition_tips: Vec<NutritionTip>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overall_advice: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AdviceResponse {
    pub result: Vec<MealAnalysis>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub name: String,
    pub display_name: String,
}

#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
}
