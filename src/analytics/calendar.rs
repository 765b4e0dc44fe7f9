use std::collections::BTreeMap;

use serde::Serialize;
use time::{Date, Month, UtcOffset};

use super::report::day_key;
use crate::meals::repo_types::{MealRecord, MealType, RiskLevel};

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: String,
    pub record_count: usize,
    pub calories: f64,
    pub meal_types: Vec<MealType>,
    pub worst_risk: Option<RiskLevel>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayGroup {
    pub date: String,
    pub records: Vec<MealRecord>,
}

fn summarize(date: Date, records: &[&MealRecord]) -> CalendarDay {
    let mut meal_types: Vec<MealType> = records.iter().map(|r| r.meal_type).collect();
    meal_types.sort();
    meal_types.dedup();
    CalendarDay {
        date: day_key(date),
        record_count: records.len(),
        calories: records.iter().map(|r| r.calories()).sum(),
        meal_types,
        worst_risk: records
            .iter()
            .filter_map(|r| r.risk)
            .max_by_key(|r| r.severity()),
    }
}

fn by_day(records: &[MealRecord], offset: UtcOffset) -> BTreeMap<Date, Vec<&MealRecord>> {
    let mut days: BTreeMap<Date, Vec<&MealRecord>> = BTreeMap::new();
    for r in records {
        if let Some(day) = r.local_date(offset) {
            days.entry(day).or_default().push(r);
        }
    }
    days
}

/// One entry per day of the month, empty days included.
pub fn calendar_month(
    records: &[MealRecord],
    year: i32,
    month: Month,
    offset: UtcOffset,
) -> Result<Vec<CalendarDay>, time::error::ComponentRange> {
    let grouped = by_day(records, offset);
    (1..=month.length(year))
        .map(|d| {
            let date = Date::from_calendar_date(year, month, d)?;
            let day_records = grouped.get(&date).map(Vec::as_slice).unwrap_or(&[]);
            Ok(summarize(date, day_records))
        })
        .collect()
}

/// Records bucketed by calendar day, newest day first. Within a day the
/// stored (newest-first) order is kept.
pub fn group_by_day(records: &[MealRecord], offset: UtcOffset) -> Vec<DayGroup> {
    by_day(records, offset)
        .into_iter()
        .rev()
        .map(|(date, recs)| DayGroup {
            date: day_key(date),
            records: recs.into_iter().cloned().collect(),
        })
        .collect()
}
