use serde::{Deserialize, Serialize};

use super::repo_types::{ActivityLevel, Gender, UserProfile};

/// Body of `PUT /profile`. Without `targetCalories` the computed TDEE is stored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInput {
    pub age: u32,
    pub gender: Gender,
    pub height: f64,
    pub weight: f64,
    pub activity_level: ActivityLevel,
    #[serde(default)]
    pub target_calories: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub profile: Option<UserProfile>,
    pub bmr: Option<f64>,
    pub tdee: Option<f64>,
    pub has_custom_target: bool,
    /// Target the analytics compare against: the profile's, or the default.
    pub daily_target: f64,
}

impl ProfileResponse {
    pub fn new(profile: Option<UserProfile>, default_target: f64) -> Self {
        match profile {
            Some(p) => Self {
                bmr: Some(p.bmr().round()),
                tdee: Some(p.tdee()),
                has_custom_target: p.has_custom_target(),
                daily_target: p.target_calories,
                profile: Some(p),
            },
            None => Self {
                profile: None,
                bmr: None,
                tdee: None,
                has_custom_target: false,
                daily_target: default_target,
            },
        }
    }
}
