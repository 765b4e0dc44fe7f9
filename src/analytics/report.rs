use serde::Serialize;
use time::{Date, Duration, OffsetDateTime, UtcOffset};

use super::stats::{
    classify_day, classify_ratio, classify_week, daily_calories, last_n_days, records_since,
    weekly_target_percentage, BandStatus, CalorieStatus, NutritionTotals, PfcBalance,
    ReferenceBand, CARB_BAND, FAT_BAND, PROTEIN_BAND, WEEK_DAYS,
};
use crate::meals::repo_types::MealRecord;

/// `YYYY-MM-DD`
pub fn day_key(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayCalories {
    pub date: String,
    pub calories: f64,
    pub status: CalorieStatus,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RatioReport {
    pub percent: f64,
    pub status: BandStatus,
    pub band: ReferenceBand,
}

impl RatioReport {
    fn new(percent: f64, band: ReferenceBand) -> Self {
        Self {
            percent,
            status: classify_ratio(percent, band),
            band,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PfcReport {
    pub total_macro_calories: f64,
    pub protein: RatioReport,
    pub fat: RatioReport,
    pub carbohydrate: RatioReport,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyReport {
    pub days: Vec<DayCalories>,
    pub totals: NutritionTotals,
    pub pfc: PfcReport,
    pub daily_target: f64,
    pub target_percentage: f64,
    pub target_status: CalorieStatus,
    pub record_count: usize,
    pub daily_average: f64,
}

/// Seven-day view ending at `now`. The per-day chart covers the last seven
/// calendar days; totals cover every record from `now - 7 days` on.
pub fn weekly_report(
    records: &[MealRecord],
    now: OffsetDateTime,
    offset: UtcOffset,
    daily_target: f64,
) -> WeeklyReport {
    let today = now.to_offset(offset).date();
    let days = last_n_days(today, WEEK_DAYS);
    let per_day = daily_calories(records, &days, offset);

    let week = records_since(records, now - Duration::days(WEEK_DAYS));
    let totals = NutritionTotals::from_records(week.iter().copied());
    let balance = PfcBalance::from_totals(&totals);
    let target_percentage = weekly_target_percentage(totals.calories, daily_target);

    WeeklyReport {
        days: days
            .iter()
            .zip(per_day)
            .map(|(d, calories)| DayCalories {
                date: day_key(*d),
                calories,
                status: classify_day(calories, daily_target),
            })
            .collect(),
        pfc: PfcReport {
            total_macro_calories: balance.total_macro_calories,
            protein: RatioReport::new(balance.protein_ratio, PROTEIN_BAND),
            fat: RatioReport::new(balance.fat_ratio, FAT_BAND),
            carbohydrate: RatioReport::new(balance.carb_ratio, CARB_BAND),
        },
        daily_target,
        target_percentage,
        target_status: classify_week(target_percentage),
        record_count: week.len(),
        daily_average: (totals.calories / WEEK_DAYS as f64).round(),
        totals,
    }
}
