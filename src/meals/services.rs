use serde_json::{Map, Value};
use time::{macros::format_description, macros::time, Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};
use uuid::Uuid;

use crate::advice::dto::MealAnalysis;
use crate::meals::dto::NewMeal;
use crate::meals::repo_types::{Impact, MealRecord, MealType, RiskLevel};

#[derive(Debug, thiserror::Error)]
pub enum DateError {
    #[error("date must be YYYY-MM-DD")]
    Format(#[from] time::error::Parse),
    #[error("date is outside the supported range")]
    OutOfRange,
}

/// Timestamp for a new record: a `YYYY-MM-DD` day is pinned to noon in `offset`
/// so it cannot slip into a neighbouring day; no day means `now`.
pub fn resolve_date(
    custom: Option<&str>,
    offset: UtcOffset,
    now: OffsetDateTime,
) -> Result<OffsetDateTime, DateError> {
    match custom.map(str::trim).filter(|s| !s.is_empty()) {
        Some(day) => {
            let date = Date::parse(day, format_description!("[year]-[month]-[day]"))?;
            PrimitiveDateTime::new(date, time!(12:00))
                .assume_offset(offset)
                .checked_to_offset(UtcOffset::UTC)
                .ok_or(DateError::OutOfRange)
        }
        None => Ok(now),
    }
}

pub fn build_record(new: NewMeal, id: Uuid, date: OffsetDateTime) -> MealRecord {
    MealRecord {
        id,
        date,
        input: new.input.trim().to_string(),
        result: new.result,
        meal_type: new.meal_type,
        risk: new.risk,
        nutrition: new.nutrition,
        cholesterol_impact: new.cholesterol_impact,
        neutral_fat_impact: new.neutral_fat_impact,
    }
}

fn risk_word(risk: RiskLevel) -> &'static str {
    match risk {
        RiskLevel::High => "High",
        RiskLevel::Medium => "Medium",
        RiskLevel::Low => "Low",
    }
}

/// Text stored in `result` when an analysis item is saved.
pub fn summary_text(item: &MealAnalysis) -> String {
    format!(
        "Risk: {}\nReason: {}\nAlternatives: {}\nFrequency: {}",
        risk_word(item.risk),
        item.reason,
        item.alternatives,
        item.frequency
    )
}

/// Converts one analysis item into a creation payload. Missing impacts are
/// stored as explicit `None` levels.
pub fn new_meal_from_analysis(item: MealAnalysis, meal_type: MealType, date: Option<String>) -> NewMeal {
    let result = summary_text(&item);
    NewMeal {
        input: item.name,
        result,
        meal_type,
        risk: Some(item.risk),
        nutrition: item.nutrition,
        cholesterol_impact: Some(item.cholesterol_impact.unwrap_or_else(Impact::none)),
        neutral_fat_impact: Some(item.neutral_fat_impact.unwrap_or_else(Impact::none)),
        date,
    }
}

/// Day as `YYYY/M/D`, the form users type when searching by date.
pub fn search_date_label(date: Date) -> String {
    format!("{}/{}/{}", date.year(), u8::from(date.month()), date.day())
}

/// Case-insensitive substring search over description, summary and day.
pub fn matches_query(record: &MealRecord, query: &str, offset: UtcOffset) -> bool {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return true;
    }
    record.input.to_lowercase().contains(&q)
        || record.result.to_lowercase().contains(&q)
        || record
            .local_date(offset)
            .is_some_and(|d| search_date_label(d).contains(&q))
}

/// Shallow merge of `patch` over `record`. The id is never overwritten.
pub fn merge_patch(record: &MealRecord, patch: &Map<String, Value>) -> Result<MealRecord, serde_json::Error> {
    let mut value = serde_json::to_value(record)?;
    if let Value::Object(ref mut obj) = value {
        for (k, v) in patch {
            if k == "id" {
                continue;
            }
            obj.insert(k.clone(), v.clone());
        }
    }
    serde_json::from_value(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meals::repo_types::{ImpactLevel, Nutrition};
    use serde_json::json;
    use time::macros::{datetime, offset};

    fn analysis() -> MealAnalysis {
        serde_json::from_value(json!({
            "name": "Fried chicken",
            "risk": "High",
            "reason": "Deep fried",
            "alternatives": "Grilled chicken",
            "frequency": "Once a week",
            "calories": 450,
            "protein": 25,
            "fat": 30,
            "carbohydrates": 15,
            "saturated_fat": 8,
            "dietary_fiber": 1
        }))
        .unwrap()
    }

    fn record() -> MealRecord {
        MealRecord {
            id: Uuid::new_v4(),
            date: datetime!(2025-03-04 12:00 UTC),
            input: "Salmon, rice".into(),
            result: "Risk: Low".into(),
            meal_type: MealType::Dinner,
            risk: Some(RiskLevel::Low),
            nutrition: Nutrition {
                calories: Some(600.0),
                ..Nutrition::default()
            },
            cholesterol_impact: None,
            neutral_fat_impact: None,
        }
    }

    #[test]
    fn custom_day_is_pinned_to_local_noon() {
        let now = datetime!(2025-01-01 00:00 UTC);
        let d = resolve_date(Some("2025-03-04"), offset!(+9), now).unwrap();
        assert_eq!(d, datetime!(2025-03-04 03:00 UTC));
        assert_eq!(d.to_offset(offset!(+9)).date(), time::macros::date!(2025-03-04));
    }

    #[test]
    fn no_custom_day_uses_now() {
        let now = datetime!(2025-01-01 08:30 UTC);
        assert_eq!(resolve_date(None, UtcOffset::UTC, now).unwrap(), now);
        assert_eq!(resolve_date(Some("  "), UtcOffset::UTC, now).unwrap(), now);
    }

    #[test]
    fn malformed_custom_day_is_rejected() {
        let now = datetime!(2025-01-01 00:00 UTC);
        assert!(matches!(
            resolve_date(Some("04/03/2025"), UtcOffset::UTC, now),
            Err(DateError::Format(_))
        ));
    }

    #[test]
    fn last_supported_day_west_of_utc_is_out_of_range() {
        let now = datetime!(2025-01-01 00:00 UTC);
        assert!(matches!(
            resolve_date(Some("9999-12-31"), offset!(-13), now),
            Err(DateError::OutOfRange)
        ));
    }

    #[test]
    fn unrepresentable_local_day_never_matches_search() {
        let mut r = record();
        r.date = datetime!(9999-12-31 23:00 UTC);
        assert_eq!(r.local_date(offset!(+9)), None);
        assert!(!matches_query(&r, "9999", offset!(+9)));
        assert!(matches_query(&r, "salmon", offset!(+9)));
    }

    #[test]
    fn analysis_becomes_meal_with_summary_and_default_impacts() {
        let new = new_meal_from_analysis(analysis(), MealType::Lunch, None);
        assert_eq!(new.input, "Fried chicken");
        assert_eq!(new.risk, Some(RiskLevel::High));
        assert_eq!(
            new.result,
            "Risk: High\nReason: Deep fried\nAlternatives: Grilled chicken\nFrequency: Once a week"
        );
        assert_eq!(new.nutrition.fat, Some(30.0));
        assert_eq!(new.cholesterol_impact.unwrap().level, ImpactLevel::None);
    }

    #[test]
    fn query_matches_input_result_and_date() {
        let r = record();
        assert!(matches_query(&r, "salmon", UtcOffset::UTC));
        assert!(matches_query(&r, "RISK", UtcOffset::UTC));
        assert!(matches_query(&r, "2025/3/4", UtcOffset::UTC));
        assert!(matches_query(&r, "", UtcOffset::UTC));
        assert!(!matches_query(&r, "pizza", UtcOffset::UTC));
    }

    #[test]
    fn merge_keeps_id_and_overrides_fields() {
        let r = record();
        let patch = json!({ "id": Uuid::new_v4(), "input": "Tuna", "calories": 320 });
        let merged = merge_patch(&r, patch.as_object().unwrap()).unwrap();
        assert_eq!(merged.id, r.id);
        assert_eq!(merged.input, "Tuna");
        assert_eq!(merged.nutrition.calories, Some(320.0));
        assert_eq!(merged.meal_type, MealType::Dinner);
    }

    #[test]
    fn merge_rejects_invalid_values() {
        let r = record();
        let patch = json!({ "mealType": "Brunch" });
        assert!(merge_patch(&r, patch.as_object().unwrap()).is_err());
    }
}
