use crate::errors::AppError;
use crate::models::{
    ChartResponse, Dataset, PeriodRecord, SeriesMeta, SummaryResponse, TimeRange, variation_color,
};
use crate::state::AppState;
use crate::stats::{aggregate_by_week, calculate_conversion_rate, transform_to_chart_data};
use crate::ui::render_index;
use axum::{
    Json,
    extract::{Query, State},
    response::Html,
};
use serde::Deserialize;
use std::collections::BTreeSet;

#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    pub variation: Option<String>,
    pub range: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub variation: Option<String>,
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_index(&state.dataset))
}

/// The raw dataset, at the same path the browser originally fetched it
/// from when it was statically hosted.
pub async fn get_dataset(State(state): State<AppState>) -> Json<Dataset> {
    Json(state.dataset.as_ref().clone())
}

pub async fn get_variations(State(state): State<AppState>) -> Json<Vec<SeriesMeta>> {
    let all: BTreeSet<String> = state.dataset.variation_keys().into_iter().collect();
    Json(series_for(&state.dataset, &all))
}

pub async fn get_chart(
    State(state): State<AppState>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<ChartResponse>, AppError> {
    let range = parse_range(query.range.as_deref())?;
    let selected = resolve_selection(&state.dataset, query.variation.as_deref())?;

    let records: Vec<PeriodRecord> = match range {
        TimeRange::Day => state
            .dataset
            .data
            .iter()
            .cloned()
            .map(PeriodRecord::Daily)
            .collect(),
        TimeRange::Week => aggregate_by_week(&state.dataset.data)
            .into_iter()
            .map(PeriodRecord::Weekly)
            .collect(),
    };

    let points = transform_to_chart_data(&records, &selected);
    let series = series_for(&state.dataset, &selected);

    Ok(Json(ChartResponse {
        range: range.as_str().to_string(),
        series,
        points,
    }))
}

/// Totals across every daily record for the selection, with the
/// overall conversion rate.
pub async fn get_summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<SummaryResponse>, AppError> {
    let selected = resolve_selection(&state.dataset, query.variation.as_deref())?;

    let mut visits = 0u64;
    let mut conversions = 0u64;
    for day in &state.dataset.data {
        for key in &selected {
            visits = visits.saturating_add(day.visits.get(key).copied().unwrap_or(0));
            conversions = conversions.saturating_add(day.conversions.get(key).copied().unwrap_or(0));
        }
    }

    Ok(Json(SummaryResponse {
        visits,
        conversions,
        rate: calculate_conversion_rate(conversions, visits),
    }))
}

fn parse_range(value: Option<&str>) -> Result<TimeRange, AppError> {
    match value {
        None => Ok(TimeRange::Day),
        Some(raw) => {
            TimeRange::parse(raw).ok_or_else(|| AppError::bad_request("range must be 'day' or 'week'"))
        }
    }
}

/// Maps the `variation` query parameter to the set of keys to plot:
/// absent or "all" selects every variation, anything else must be an
/// existing variation key.
fn resolve_selection(dataset: &Dataset, variation: Option<&str>) -> Result<BTreeSet<String>, AppError> {
    let keys = dataset.variation_keys();
    match variation {
        None | Some("all") => Ok(keys.into_iter().collect()),
        Some(key) if keys.iter().any(|candidate| candidate == key) => {
            Ok(BTreeSet::from([key.to_string()]))
        }
        Some(key) => Err(AppError::bad_request(format!("unknown variation: {key}"))),
    }
}

/// Series metadata in dataset order, restricted to the selection.
fn series_for(dataset: &Dataset, selected: &BTreeSet<String>) -> Vec<SeriesMeta> {
    dataset
        .variations
        .iter()
        .filter(|variation| selected.contains(&variation.key()))
        .map(|variation| {
            let key = variation.key();
            SeriesMeta {
                color: variation_color(&key).to_string(),
                name: variation.name.clone(),
                key,
            }
        })
        .collect()
}
