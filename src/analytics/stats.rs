//! Derived statistics over the meal list.
//!
//! Everything here is a pure function of the records passed in. Missing
//! nutrition values count as zero; a zero denominator yields zero.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use time::{Date, Duration, OffsetDateTime, UtcOffset};

use crate::meals::repo_types::{
    or_zero, MealRecord, RiskLevel, CARB_KCAL_PER_G, FAT_KCAL_PER_G, PROTEIN_KCAL_PER_G,
};

pub const WEEK_DAYS: i64 = 7;

/// Recommended share of macro calories, in percent.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct ReferenceBand {
    pub min: f64,
    pub max: f64,
}

pub const PROTEIN_BAND: ReferenceBand = ReferenceBand { min: 13.0, max: 20.0 };
pub const FAT_BAND: ReferenceBand = ReferenceBand { min: 20.0, max: 30.0 };
pub const CARB_BAND: ReferenceBand = ReferenceBand { min: 50.0, max: 65.0 };

/// Day over/under thresholds as fractions of the daily target.
pub const DAY_OVER_FACTOR: f64 = 1.2;
pub const DAY_UNDER_FACTOR: f64 = 0.7;
/// Week over/under thresholds as percentages of the weekly target.
pub const WEEK_OVER_PERCENT: f64 = 110.0;
pub const WEEK_UNDER_PERCENT: f64 = 80.0;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BandStatus {
    Low,
    Ok,
    High,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CalorieStatus {
    NoData,
    Under,
    Ok,
    Over,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct NutritionTotals {
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbohydrates: f64,
    pub saturated_fat: f64,
    pub dietary_fiber: f64,
    pub sodium: f64,
    pub calcium: f64,
    pub iron: f64,
    pub vitamin_c: f64,
    pub vitamin_d: f64,
}

impl NutritionTotals {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a MealRecord>) -> Self {
        records.into_iter().fold(Self::default(), |mut t, r| {
            let n = &r.nutrition;
            t.calories += or_zero(n.calories);
            t.protein += or_zero(n.protein);
            t.fat += or_zero(n.fat);
            t.carbohydrates += or_zero(n.carbohydrates);
            t.saturated_fat += or_zero(n.saturated_fat);
            t.dietary_fiber += or_zero(n.dietary_fiber);
            t.sodium += or_zero(n.sodium);
            t.calcium += or_zero(n.calcium);
            t.iron += or_zero(n.iron);
            t.vitamin_c += or_zero(n.vitamin_c);
            t.vitamin_d += or_zero(n.vitamin_d);
            t
        })
    }
}

/// PFC balance: share of macro calories from protein, fat and carbohydrate.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PfcBalance {
    pub total_macro_calories: f64,
    pub protein_ratio: f64,
    pub fat_ratio: f64,
    pub carb_ratio: f64,
}

impl PfcBalance {
    pub fn from_grams(protein: f64, fat: f64, carbohydrates: f64) -> Self {
        let p = protein * PROTEIN_KCAL_PER_G;
        let f = fat * FAT_KCAL_PER_G;
        let c = carbohydrates * CARB_KCAL_PER_G;
        let total = p + f + c;
        let ratio = |part: f64| if total > 0.0 { part / total * 100.0 } else { 0.0 };
        Self {
            total_macro_calories: total,
            protein_ratio: ratio(p),
            fat_ratio: ratio(f),
            carb_ratio: ratio(c),
        }
    }

    pub fn from_totals(t: &NutritionTotals) -> Self {
        Self::from_grams(t.protein, t.fat, t.carbohydrates)
    }
}

pub fn classify_ratio(value: f64, band: ReferenceBand) -> BandStatus {
    if value < band.min {
        BandStatus::Low
    } else if value > band.max {
        BandStatus::High
    } else {
        BandStatus::Ok
    }
}

pub fn classify_day(calories: f64, daily_target: f64) -> CalorieStatus {
    if calories == 0.0 {
        CalorieStatus::NoData
    } else if calories > daily_target * DAY_OVER_FACTOR {
        CalorieStatus::Over
    } else if calories < daily_target * DAY_UNDER_FACTOR {
        CalorieStatus::Under
    } else {
        CalorieStatus::Ok
    }
}

/// Share of the weekly goal (`daily_target * 7`) eaten, in percent.
pub fn weekly_target_percentage(total_calories: f64, daily_target: f64) -> f64 {
    let weekly = daily_target * WEEK_DAYS as f64;
    if weekly > 0.0 {
        total_calories / weekly * 100.0
    } else {
        0.0
    }
}

pub fn classify_week(percentage: f64) -> CalorieStatus {
    if percentage > WEEK_OVER_PERCENT {
        CalorieStatus::Over
    } else if percentage < WEEK_UNDER_PERCENT {
        CalorieStatus::Under
    } else {
        CalorieStatus::Ok
    }
}

/// The `n` days ending with `today`, oldest first.
pub fn last_n_days(today: Date, n: i64) -> Vec<Date> {
    (0..n)
        .rev()
        .filter_map(|back| today.checked_sub(Duration::days(back)))
        .collect()
}

pub fn daily_calories(records: &[MealRecord], days: &[Date], offset: UtcOffset) -> Vec<f64> {
    days.iter()
        .map(|day| {
            records
                .iter()
                .filter(|r| r.local_date(offset) == Some(*day))
                .map(MealRecord::calories)
                .sum::<f64>()
        })
        .collect()
}

pub fn records_since(records: &[MealRecord], cutoff: OffsetDateTime) -> Vec<&MealRecord> {
    records.iter().filter(|r| r.date >= cutoff).collect()
}

/// Exact label match; unrated records never match.
pub fn filter_by_risk(records: &[MealRecord], risk: RiskLevel) -> Vec<&MealRecord> {
    records.iter().filter(|r| r.risk == Some(risk)).collect()
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct RiskCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub unrated: usize,
    pub total: usize,
}

impl RiskCounts {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a MealRecord>) -> Self {
        records.into_iter().fold(Self::default(), |mut c, r| {
            match r.risk {
                Some(RiskLevel::High) => c.high += 1,
                Some(RiskLevel::Medium) => c.medium += 1,
                Some(RiskLevel::Low) => c.low += 1,
                None => c.unrated += 1,
            }
            c.total += 1;
            c
        })
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HighRiskInsight {
    pub count: usize,
    pub top_items: Vec<String>,
}

pub const INSIGHT_TOP_ITEMS: usize = 3;

lazy_static! {
    static ref ITEM_SEPARATOR: Regex = Regex::new(r"[,、]").unwrap();
}

/// First dish named in a free-text description.
pub fn primary_item(input: &str) -> &str {
    ITEM_SEPARATOR
        .split(input)
        .next()
        .unwrap_or(input)
        .trim()
}

/// High-risk meals since `cutoff` and the dishes that show up most often.
/// Equal counts keep the order in which dishes were first seen.
pub fn high_risk_insight(records: &[MealRecord], cutoff: OffsetDateTime) -> HighRiskInsight {
    let recent: Vec<&MealRecord> = records
        .iter()
        .filter(|r| r.date >= cutoff && r.risk == Some(RiskLevel::High))
        .collect();

    let mut counts: Vec<(&str, usize)> = Vec::new();
    for r in &recent {
        let name = primary_item(&r.input);
        match counts.iter_mut().find(|(n, _)| *n == name) {
            Some((_, c)) => *c += 1,
            None => counts.push((name, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    HighRiskInsight {
        count: recent.len(),
        top_items: counts
            .into_iter()
            .take(INSIGHT_TOP_ITEMS)
            .map(|(n, _)| n.to_string())
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meals::repo_types::{MealType, Nutrition};
    use time::macros::{date, datetime};
    use uuid::Uuid;

    fn rec(at: OffsetDateTime, input: &str, risk: Option<RiskLevel>, p: f64, f: f64, c: f64, kcal: f64) -> MealRecord {
        MealRecord {
            id: Uuid::new_v4(),
            date: at,
            input: input.into(),
            result: String::new(),
            meal_type: MealType::Lunch,
            risk,
            nutrition: Nutrition {
                calories: Some(kcal),
                protein: Some(p),
                fat: Some(f),
                carbohydrates: Some(c),
                ..Nutrition::default()
            },
            cholesterol_impact: None,
            neutral_fat_impact: None,
        }
    }

    fn sample() -> Vec<MealRecord> {
        vec![
            rec(datetime!(2025-06-10 12:00 UTC), "Ramen, gyoza", Some(RiskLevel::High), 25.0, 20.0, 90.0, 650.0),
            rec(datetime!(2025-06-09 19:00 UTC), "Salad", Some(RiskLevel::Low), 5.0, 8.0, 12.0, 140.0),
            rec(datetime!(2025-06-09 08:00 UTC), "Ramen", Some(RiskLevel::High), 22.0, 18.0, 85.0, 600.0),
            rec(datetime!(2025-06-08 12:00 UTC), "Karaage、rice", Some(RiskLevel::High), 30.0, 28.0, 70.0, 700.0),
            rec(datetime!(2025-06-01 12:00 UTC), "Cake", Some(RiskLevel::Medium), 4.0, 20.0, 40.0, 360.0),
            rec(datetime!(2025-06-07 12:00 UTC), "Tea", None, 0.0, 0.0, 0.0, 0.0),
        ]
    }

    #[test]
    fn macro_total_matches_sum_of_records() {
        let records = sample();
        let totals = NutritionTotals::from_records(&records);
        let pfc = PfcBalance::from_totals(&totals);
        let expected: f64 = records.iter().map(MealRecord::macro_calories).sum();
        assert!((pfc.total_macro_calories - expected).abs() < 1e-9);
    }

    #[test]
    fn ratios_sum_to_hundred() {
        let pfc = PfcBalance::from_grams(80.0, 60.0, 250.0);
        let sum = pfc.protein_ratio + pfc.fat_ratio + pfc.carb_ratio;
        assert!((sum - 100.0).abs() < 1e-9);
        // 320 + 540 + 1000
        assert_eq!(pfc.total_macro_calories, 1860.0);
    }

    #[test]
    fn ratios_are_zero_without_macros() {
        let pfc = PfcBalance::from_grams(0.0, 0.0, 0.0);
        assert_eq!(pfc.total_macro_calories, 0.0);
        assert_eq!((pfc.protein_ratio, pfc.fat_ratio, pfc.carb_ratio), (0.0, 0.0, 0.0));
    }

    #[test]
    fn missing_nutrition_counts_as_zero() {
        let mut r = rec(datetime!(2025-06-10 12:00 UTC), "x", None, 0.0, 0.0, 0.0, 0.0);
        r.nutrition = Nutrition::default();
        let totals = NutritionTotals::from_records([&r]);
        assert_eq!(totals, NutritionTotals::default());
    }

    #[test]
    fn ratio_bands() {
        assert_eq!(classify_ratio(12.9, PROTEIN_BAND), BandStatus::Low);
        assert_eq!(classify_ratio(13.0, PROTEIN_BAND), BandStatus::Ok);
        assert_eq!(classify_ratio(20.0, PROTEIN_BAND), BandStatus::Ok);
        assert_eq!(classify_ratio(31.0, FAT_BAND), BandStatus::High);
        assert_eq!(classify_ratio(49.0, CARB_BAND), BandStatus::Low);
    }

    #[test]
    fn day_thresholds() {
        assert_eq!(classify_day(0.0, 2000.0), CalorieStatus::NoData);
        assert_eq!(classify_day(2401.0, 2000.0), CalorieStatus::Over);
        assert_eq!(classify_day(2400.0, 2000.0), CalorieStatus::Ok);
        assert_eq!(classify_day(1399.0, 2000.0), CalorieStatus::Under);
        assert_eq!(classify_day(1400.0, 2000.0), CalorieStatus::Ok);
    }

    #[test]
    fn week_thresholds() {
        assert_eq!(weekly_target_percentage(14000.0, 2000.0), 100.0);
        assert_eq!(weekly_target_percentage(100.0, 0.0), 0.0);
        assert_eq!(classify_week(111.0), CalorieStatus::Over);
        assert_eq!(classify_week(79.0), CalorieStatus::Under);
        assert_eq!(classify_week(95.0), CalorieStatus::Ok);
    }

    #[test]
    fn last_days_end_today() {
        let days = last_n_days(date!(2025-03-02), 3);
        assert_eq!(days, vec![date!(2025-02-28), date!(2025-03-01), date!(2025-03-02)]);
    }

    #[test]
    fn calories_grouped_per_day() {
        let records = sample();
        let days = last_n_days(date!(2025-06-10), 3);
        let per_day = daily_calories(&records, &days, UtcOffset::UTC);
        assert_eq!(per_day, vec![700.0, 740.0, 650.0]);
    }

    #[test]
    fn risk_filter_is_exact() {
        let records = sample();
        let high = filter_by_risk(&records, RiskLevel::High);
        assert_eq!(high.len(), 3);
        assert!(high.iter().all(|r| r.risk == Some(RiskLevel::High)));
        assert_eq!(filter_by_risk(&records, RiskLevel::Medium).len(), 1);
    }

    #[test]
    fn risk_counts_cover_unrated() {
        let c = RiskCounts::from_records(&sample());
        assert_eq!(c, RiskCounts { high: 3, medium: 1, low: 1, unrated: 1, total: 6 });
    }

    #[test]
    fn insight_ranks_dishes_in_window() {
        let records = sample();
        let insight = high_risk_insight(&records, datetime!(2025-06-03 12:00 UTC));
        assert_eq!(insight.count, 3);
        assert_eq!(insight.top_items, vec!["Ramen".to_string(), "Karaage".to_string()]);

        let none = high_risk_insight(&records, datetime!(2025-06-11 00:00 UTC));
        assert_eq!(none.count, 0);
        assert!(none.top_items.is_empty());
    }

    #[test]
    fn primary_item_splits_on_both_commas() {
        assert_eq!(primary_item("Karaage、rice"), "Karaage");
        assert_eq!(primary_item("Toast, jam"), "Toast");
        assert_eq!(primary_item("Udon"), "Udon");
    }
}
