use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One arm of an A/B test. Arms without an explicit id share the
/// sentinel key "0" (the control arm in exported datasets).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
}

impl Variation {
    pub fn key(&self) -> String {
        match self.id {
            Some(id) => id.to_string(),
            None => "0".to_string(),
        }
    }
}

/// Counts for a single calendar day, keyed by variation key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: String,
    pub visits: BTreeMap<String, u64>,
    pub conversions: BTreeMap<String, u64>,
}

/// Counts summed over one ISO week (Monday through Sunday).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeeklyRecord {
    #[serde(rename = "weekStart")]
    pub week_start: String,
    pub visits: BTreeMap<String, u64>,
    pub conversions: BTreeMap<String, u64>,
}

/// The dataset file: `{ "variations": [...], "data": [...] }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub variations: Vec<Variation>,
    pub data: Vec<DailyRecord>,
}

impl Dataset {
    pub fn variation_keys(&self) -> Vec<String> {
        self.variations.iter().map(Variation::key).collect()
    }

    pub fn variation_name(&self, key: &str) -> Option<&str> {
        self.variations
            .iter()
            .find(|variation| variation.key() == key)
            .map(|variation| variation.name.as_str())
    }
}

/// A record at either granularity. Daily and weekly records carry the
/// same count maps and differ only in how the period is labelled.
#[derive(Debug, Clone)]
pub enum PeriodRecord {
    Daily(DailyRecord),
    Weekly(WeeklyRecord),
}

impl PeriodRecord {
    /// The x-axis label: the day for daily records, the Monday of the
    /// week for weekly ones.
    pub fn label(&self) -> &str {
        match self {
            PeriodRecord::Daily(day) => &day.date,
            PeriodRecord::Weekly(week) => &week.week_start,
        }
    }

    pub fn visits(&self) -> &BTreeMap<String, u64> {
        match self {
            PeriodRecord::Daily(day) => &day.visits,
            PeriodRecord::Weekly(week) => &week.visits,
        }
    }

    pub fn conversions(&self) -> &BTreeMap<String, u64> {
        match self {
            PeriodRecord::Daily(day) => &day.conversions,
            PeriodRecord::Weekly(week) => &week.conversions,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    Day,
    Week,
}

impl TimeRange {
    pub fn parse(value: &str) -> Option<TimeRange> {
        match value {
            "day" => Some(TimeRange::Day),
            "week" => Some(TimeRange::Week),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Day => "day",
            TimeRange::Week => "week",
        }
    }
}

/// One chart point: a period label plus a conversion rate per variation
/// key. Keys with no data for the period are absent, not zero; the
/// flattened map keeps the wire shape `{ "date": ..., "<key>": rate }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: String,
    #[serde(flatten)]
    pub rates: BTreeMap<String, f64>,
}

/// Display metadata for one line series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesMeta {
    pub key: String,
    pub name: String,
    pub color: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChartResponse {
    pub range: String,
    pub series: Vec<SeriesMeta>,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub visits: u64,
    pub conversions: u64,
    pub rate: f64,
}

const DEFAULT_COLOR: &str = "#8884d8";

/// Fixed palette keyed by variation key, matching the exported chart
/// colors; unknown keys fall back to the control color.
pub fn variation_color(key: &str) -> &'static str {
    match key {
        "0" => DEFAULT_COLOR,
        "10001" => "#82ca9d",
        "10002" => "#ffc658",
        "10003" => "#ff7c7c",
        _ => DEFAULT_COLOR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variation_key_defaults_to_zero_sentinel() {
        let control = Variation {
            id: None,
            name: "Original".to_string(),
        };
        let arm = Variation {
            id: Some(10001),
            name: "Variation 1".to_string(),
        };
        assert_eq!(control.key(), "0");
        assert_eq!(arm.key(), "10001");
    }

    #[test]
    fn chart_point_serializes_rates_at_top_level() {
        let mut rates = BTreeMap::new();
        rates.insert("0".to_string(), 25.0);
        rates.insert("10001".to_string(), 12.5);
        let point = ChartPoint {
            date: "2024-01-01".to_string(),
            rates,
        };

        let value = serde_json::to_value(&point).unwrap();
        assert_eq!(value["date"], "2024-01-01");
        assert_eq!(value["0"], 25.0);
        assert_eq!(value["10001"], 12.5);
        assert!(value.get("rates").is_none());
    }

    #[test]
    fn chart_point_roundtrips_sparse_keys() {
        let json = r#"{"date":"2024-01-02","0":50.0}"#;
        let point: ChartPoint = serde_json::from_str(json).unwrap();
        assert_eq!(point.date, "2024-01-02");
        assert_eq!(point.rates.get("0"), Some(&50.0));
        assert!(!point.rates.contains_key("10001"));
    }

    #[test]
    fn period_record_label_picks_date_or_week_start() {
        let daily = PeriodRecord::Daily(DailyRecord {
            date: "2024-01-03".to_string(),
            visits: BTreeMap::new(),
            conversions: BTreeMap::new(),
        });
        let weekly = PeriodRecord::Weekly(WeeklyRecord {
            week_start: "2024-01-01".to_string(),
            ..WeeklyRecord::default()
        });
        assert_eq!(daily.label(), "2024-01-03");
        assert_eq!(weekly.label(), "2024-01-01");
    }

    #[test]
    fn time_range_parses_known_values_only() {
        assert_eq!(TimeRange::parse("day"), Some(TimeRange::Day));
        assert_eq!(TimeRange::parse("week"), Some(TimeRange::Week));
        assert_eq!(TimeRange::parse("month"), None);
        assert_eq!(TimeRange::parse(""), None);
    }
}
