use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, UtcOffset};
use uuid::Uuid;

/// Meal slot the record was eaten in. Ordered by time of day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MealType {
    #[serde(alias = "breakfast")]
    Breakfast,
    #[serde(alias = "lunch")]
    Lunch,
    #[serde(alias = "dinner")]
    Dinner,
    #[serde(alias = "snack")]
    Snack,
}

impl MealType {
    pub fn label(self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }
}

/// Coarse label assigned by the model, never computed locally.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RiskLevel {
    #[serde(alias = "high")]
    High,
    #[serde(alias = "medium")]
    Medium,
    #[serde(alias = "low")]
    Low,
}

impl RiskLevel {
    pub fn severity(self) -> u8 {
        match self {
            RiskLevel::Low => 1,
            RiskLevel::Medium => 2,
            RiskLevel::High => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ImpactLevel {
    #[serde(alias = "high")]
    High,
    #[serde(alias = "medium")]
    Medium,
    #[serde(alias = "low")]
    Low,
    #[serde(alias = "none")]
    None,
}

/// Effect on a blood lipid marker, with the model's short reasoning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Impact {
    pub level: ImpactLevel,
    #[serde(default)]
    pub reason: String,
}

impl Impact {
    pub fn none() -> Self {
        Self {
            level: ImpactLevel::None,
            reason: String::new(),
        }
    }
}

/// Per-meal nutrition. Absent values count as zero everywhere.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Nutrition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbohydrates: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturated_fat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dietary_fiber: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sodium: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calcium: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iron: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vitamin_c: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vitamin_d: Option<f64>,
}

pub const PROTEIN_KCAL_PER_G: f64 = 4.0;
pub const FAT_KCAL_PER_G: f64 = 9.0;
pub const CARB_KCAL_PER_G: f64 = 4.0;

pub(crate) fn or_zero(v: Option<f64>) -> f64 {
    v.unwrap_or(0.0)
}

impl Nutrition {
    pub fn macro_calories(&self) -> f64 {
        or_zero(self.protein) * PROTEIN_KCAL_PER_G
            + or_zero(self.fat) * FAT_KCAL_PER_G
            + or_zero(self.carbohydrates) * CARB_KCAL_PER_G
    }
}

/// A saved meal. Immutable apart from whole-record merge and deletion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MealRecord {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub input: String,
    #[serde(default)]
    pub result: String,
    #[serde(rename = "mealType")]
    pub meal_type: MealType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk: Option<RiskLevel>,
    #[serde(flatten)]
    pub nutrition: Nutrition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cholesterol_impact: Option<Impact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neutral_fat_impact: Option<Impact>,
}

impl MealRecord {
    pub fn calories(&self) -> f64 {
        or_zero(self.nutrition.calories)
    }

    pub fn macro_calories(&self) -> f64 {
        self.nutrition.macro_calories()
    }

    /// Calendar day of the record as seen from `offset`. `None` when the
    /// shifted timestamp leaves the supported year range.
    pub fn local_date(&self, offset: UtcOffset) -> Option<Date> {
        self.date.checked_to_offset(offset).map(|d| d.date())
    }
}
