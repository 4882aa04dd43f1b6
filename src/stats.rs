use crate::models::{ChartPoint, DailyRecord, PeriodRecord, WeeklyRecord};
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The Monday on or before the given date (ISO week start).
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Groups daily records into one record per distinct ISO week, summing
/// visits and conversions per variation key. Output is sorted ascending
/// by week-start date; summation is order-independent. Records whose
/// date does not parse are skipped (the loader rejects such datasets,
/// so this only matters for direct library callers).
pub fn aggregate_by_week(days: &[DailyRecord]) -> Vec<WeeklyRecord> {
    let mut weeks: BTreeMap<String, WeeklyRecord> = BTreeMap::new();

    for day in days {
        let Ok(date) = NaiveDate::parse_from_str(&day.date, DATE_FORMAT) else {
            warn!("skipping record with unparseable date: {}", day.date);
            continue;
        };
        let start = week_start(date).format(DATE_FORMAT).to_string();
        let week = weeks.entry(start.clone()).or_insert_with(|| WeeklyRecord {
            week_start: start,
            ..WeeklyRecord::default()
        });

        for (key, count) in &day.visits {
            let entry = week.visits.entry(key.clone()).or_insert(0);
            *entry = entry.saturating_add(*count);
        }
        for (key, count) in &day.conversions {
            let entry = week.conversions.entry(key.clone()).or_insert(0);
            *entry = entry.saturating_add(*count);
        }
    }

    weeks.into_values().collect()
}

/// Conversions over visits as a percentage. Zero visits yields a zero
/// rate rather than dividing; a period with zero visits is shown as 0%,
/// not hidden.
pub fn calculate_conversion_rate(conversions: u64, visits: u64) -> f64 {
    if visits == 0 {
        return 0.0;
    }
    conversions as f64 / visits as f64 * 100.0
}

/// Turns period records into chart points for the requested variation
/// keys. A key appears on a point only when the period has both a
/// visits and a conversions entry for it; otherwise the series simply
/// has no point at that x-value.
pub fn transform_to_chart_data(
    records: &[PeriodRecord],
    selected: &BTreeSet<String>,
) -> Vec<ChartPoint> {
    records
        .iter()
        .map(|record| {
            let mut rates = BTreeMap::new();
            for key in selected {
                let visits = record.visits().get(key);
                let conversions = record.conversions().get(key);
                if let (Some(&visits), Some(&conversions)) = (visits, conversions) {
                    rates.insert(key.clone(), calculate_conversion_rate(conversions, visits));
                }
            }
            ChartPoint {
                date: record.label().to_string(),
                rates,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(entries: &[(&str, u64)]) -> BTreeMap<String, u64> {
        entries
            .iter()
            .map(|(key, count)| (key.to_string(), *count))
            .collect()
    }

    fn day(date: &str, visits: &[(&str, u64)], conversions: &[(&str, u64)]) -> DailyRecord {
        DailyRecord {
            date: date.to_string(),
            visits: counts(visits),
            conversions: counts(conversions),
        }
    }

    fn selection(keys: &[&str]) -> BTreeSet<String> {
        keys.iter().map(|key| key.to_string()).collect()
    }

    #[test]
    fn week_start_is_monday_on_or_before() {
        let monday = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let thursday = NaiveDate::from_ymd_opt(2024, 1, 4).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        assert_eq!(week_start(monday), monday);
        assert_eq!(week_start(thursday), monday);
        assert_eq!(week_start(sunday), monday);
    }

    #[test]
    fn aggregate_empty_input_is_empty() {
        assert!(aggregate_by_week(&[]).is_empty());
    }

    #[test]
    fn aggregate_sums_monday_through_sunday_into_one_week() {
        let days = vec![
            day("2024-01-01", &[("0", 100)], &[("0", 10)]),
            day("2024-01-07", &[("0", 50)], &[("0", 5)]),
        ];

        let weeks = aggregate_by_week(&days);
        assert_eq!(weeks.len(), 1);
        assert_eq!(weeks[0].week_start, "2024-01-01");
        assert_eq!(weeks[0].visits["0"], 150);
        assert_eq!(weeks[0].conversions["0"], 15);
    }

    #[test]
    fn aggregate_splits_weeks_at_monday() {
        let days = vec![
            day("2024-01-07", &[("0", 10)], &[("0", 1)]),
            day("2024-01-08", &[("0", 20)], &[("0", 2)]),
        ];

        let weeks = aggregate_by_week(&days);
        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[0].week_start, "2024-01-01");
        assert_eq!(weeks[1].week_start, "2024-01-08");
    }

    #[test]
    fn aggregate_output_is_sorted_regardless_of_input_order() {
        let days = vec![
            day("2024-02-13", &[("0", 1)], &[]),
            day("2024-01-02", &[("0", 1)], &[]),
            day("2024-01-31", &[("0", 1)], &[]),
        ];

        let weeks = aggregate_by_week(&days);
        let starts: Vec<&str> = weeks.iter().map(|week| week.week_start.as_str()).collect();
        assert_eq!(starts, vec!["2024-01-01", "2024-01-29", "2024-02-12"]);
    }

    #[test]
    fn aggregate_preserves_per_variation_totals() {
        let days = vec![
            day("2024-01-03", &[("0", 120), ("10001", 80)], &[("0", 12), ("10001", 4)]),
            day("2024-01-09", &[("0", 60), ("10001", 40)], &[("0", 3), ("10001", 2)]),
            day("2024-01-10", &[("0", 20)], &[("0", 1)]),
        ];

        let weeks = aggregate_by_week(&days);
        let total = |pick: fn(&WeeklyRecord) -> &BTreeMap<String, u64>, key: &str| -> u64 {
            weeks
                .iter()
                .map(|week| pick(week).get(key).copied().unwrap_or(0))
                .sum()
        };

        assert_eq!(total(|week| &week.visits, "0"), 200);
        assert_eq!(total(|week| &week.visits, "10001"), 120);
        assert_eq!(total(|week| &week.conversions, "0"), 16);
        assert_eq!(total(|week| &week.conversions, "10001"), 6);
    }

    #[test]
    fn aggregate_skips_unparseable_dates() {
        let days = vec![
            day("not-a-date", &[("0", 10)], &[("0", 1)]),
            day("2024-01-01", &[("0", 5)], &[("0", 1)]),
        ];

        let weeks = aggregate_by_week(&days);
        assert_eq!(weeks.len(), 1);
        assert_eq!(weeks[0].visits["0"], 5);
    }

    #[test]
    fn conversion_rate_zero_visits_is_zero() {
        assert_eq!(calculate_conversion_rate(0, 0), 0.0);
        assert_eq!(calculate_conversion_rate(0, 100), 0.0);
        assert_eq!(calculate_conversion_rate(5, 0), 0.0);
    }

    #[test]
    fn conversion_rate_is_percentage() {
        assert_eq!(calculate_conversion_rate(25, 100), 25.0);
        assert_eq!(calculate_conversion_rate(1, 2), 50.0);
        assert!((calculate_conversion_rate(1, 3) - 33.333333).abs() < 0.0001);
    }

    #[test]
    fn transform_emits_one_point_per_period() {
        let records = vec![
            PeriodRecord::Daily(day("2024-01-01", &[("0", 100)], &[("0", 25)])),
            PeriodRecord::Daily(day("2024-01-02", &[("0", 200)], &[("0", 50)])),
        ];

        let points = transform_to_chart_data(&records, &selection(&["0"]));
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, "2024-01-01");
        assert_eq!(points[0].rates["0"], 25.0);
        assert_eq!(points[1].rates["0"], 25.0);
    }

    #[test]
    fn transform_omits_keys_with_missing_entries() {
        let records = vec![PeriodRecord::Daily(day(
            "2024-01-01",
            &[("0", 100), ("10001", 50)],
            &[("0", 10)],
        ))];

        let points = transform_to_chart_data(&records, &selection(&["0", "10001"]));
        assert_eq!(points[0].rates["0"], 10.0);
        assert!(!points[0].rates.contains_key("10001"));
    }

    #[test]
    fn transform_shows_zero_visit_periods_as_zero_rate() {
        let records = vec![PeriodRecord::Daily(day(
            "2024-01-01",
            &[("0", 0)],
            &[("0", 0)],
        ))];

        let points = transform_to_chart_data(&records, &selection(&["0"]));
        assert_eq!(points[0].rates.get("0"), Some(&0.0));
    }

    #[test]
    fn transform_ignores_unselected_keys() {
        let records = vec![PeriodRecord::Daily(day(
            "2024-01-01",
            &[("0", 100), ("10001", 50)],
            &[("0", 10), ("10001", 5)],
        ))];

        let points = transform_to_chart_data(&records, &selection(&["10001"]));
        assert_eq!(points[0].rates.len(), 1);
        assert_eq!(points[0].rates["10001"], 10.0);
    }

    #[test]
    fn transform_is_idempotent() {
        let records = vec![
            PeriodRecord::Daily(day("2024-01-01", &[("0", 100)], &[("0", 30)])),
            PeriodRecord::Weekly(WeeklyRecord {
                week_start: "2024-01-08".to_string(),
                visits: counts(&[("0", 400)]),
                conversions: counts(&[("0", 100)]),
            }),
        ];
        let selected = selection(&["0"]);

        let first = transform_to_chart_data(&records, &selected);
        let second = transform_to_chart_data(&records, &selected);
        assert_eq!(first, second);
    }

    #[test]
    fn weekly_pipeline_rates_use_summed_counts() {
        let days = vec![
            day("2024-01-01", &[("0", 100)], &[("0", 10)]),
            day("2024-01-02", &[("0", 100)], &[("0", 30)]),
        ];

        let records: Vec<PeriodRecord> = aggregate_by_week(&days)
            .into_iter()
            .map(PeriodRecord::Weekly)
            .collect();
        let points = transform_to_chart_data(&records, &selection(&["0"]));

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].date, "2024-01-01");
        assert_eq!(points[0].rates["0"], 20.0);
    }
}
