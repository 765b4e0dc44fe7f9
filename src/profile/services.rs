use super::dto::ProfileInput;
use super::repo_types::{ActivityLevel, Gender, UserProfile};

/// Mifflin-St Jeor basal metabolic rate, kcal/day.
pub fn calculate_bmr(gender: Gender, weight_kg: f64, height_cm: f64, age: u32) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age);
    match gender {
        Gender::Male => base + 5.0,
        Gender::Female => base - 161.0,
    }
}

pub fn calculate_tdee(bmr: f64, activity: ActivityLevel) -> f64 {
    (bmr * activity.factor()).round()
}

impl UserProfile {
    pub fn bmr(&self) -> f64 {
        calculate_bmr(self.gender, self.weight, self.height, self.age)
    }

    pub fn tdee(&self) -> f64 {
        calculate_tdee(self.bmr(), self.activity_level)
    }

    /// True when the stored target is a user goal rather than the computed TDEE.
    pub fn has_custom_target(&self) -> bool {
        (self.target_calories - self.tdee()).abs() > f64::EPSILON
    }
}

pub fn validate(input: &ProfileInput) -> Result<(), String> {
    if !(1..=120).contains(&input.age) {
        return Err("age must be between 1 and 120".into());
    }
    if !(input.height.is_finite() && input.height > 0.0) {
        return Err("height must be a positive number of centimetres".into());
    }
    if !(input.weight.is_finite() && input.weight > 0.0) {
        return Err("weight must be a positive number of kilograms".into());
    }
    if let Some(t) = input.target_calories {
        if !(t.is_finite() && t > 0.0) {
            return Err("targetCalories must be positive".into());
        }
    }
    Ok(())
}

/// Builds the stored profile; without a custom target the TDEE is used.
pub fn build_profile(input: ProfileInput) -> UserProfile {
    let tdee = calculate_tdee(
        calculate_bmr(input.gender, input.weight, input.height, input.age),
        input.activity_level,
    );
    UserProfile {
        age: input.age,
        gender: input.gender,
        height: input.height,
        weight: input.weight,
        activity_level: input.activity_level,
        target_calories: input.target_calories.unwrap_or(tdee),
    }
}
