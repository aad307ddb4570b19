use crate::errors::AppError;
use crate::fetcher::fetch_year_counts;
use crate::layout::{YearLayout, layout_year};
use crate::models::{CellResponse, YearHeatmapResponse};
use crate::orchestrate::{HeatmapRequest, run_update};
use crate::state::AppState;
use crate::themes::Theme;
use crate::ui::{PageContext, render_page};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    Json,
};
use chrono::{Datelike, Local};
use serde::Deserialize;

const INVALID_DOMAIN_MESSAGE: &str = "请输入有效的域名地址，例如：https://memos.lzsay.com";

#[derive(Debug, Deserialize)]
pub struct HeatmapQuery {
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub theme: Option<String>,
    pub domain: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct YearQuery {
    pub year: Option<i32>,
    pub theme: Option<String>,
    pub domain: Option<String>,
}

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<HeatmapQuery>,
) -> Result<Html<String>, AppError> {
    let current_year = Local::now().year();
    let start_year = query.start_year.unwrap_or(current_year);
    let end_year = query.end_year.unwrap_or(current_year);
    let theme = parse_theme(query.theme.as_deref())?;
    let domain = validate_domain(query.domain.as_deref(), &state.default_domain)?;

    let request = HeatmapRequest {
        years: year_range(start_year, end_year),
        domain: domain.clone(),
        theme,
    };
    let layouts = run_update(&state, &request)
        .await
        .ok_or_else(AppError::superseded)?;

    let ctx = PageContext {
        current_year,
        start_year,
        end_year,
        theme,
        domain: &domain,
    };
    Ok(Html(render_page(&ctx, &layouts)))
}

pub async fn year_heatmap(
    State(state): State<AppState>,
    Query(query): Query<YearQuery>,
) -> Result<Json<YearHeatmapResponse>, AppError> {
    let year = query.year.unwrap_or_else(|| Local::now().year());
    let theme = parse_theme(query.theme.as_deref())?;
    let domain = validate_domain(query.domain.as_deref(), &state.default_domain)?;

    let counts = fetch_year_counts(&state, year, &domain).await;
    let layout = layout_year(&counts, year, theme);
    Ok(Json(to_response(&layout, theme)))
}

pub async fn clear_cache(State(state): State<AppState>) -> StatusCode {
    state.clear_cache().await;
    StatusCode::NO_CONTENT
}

fn to_response(layout: &YearLayout, theme: Theme) -> YearHeatmapResponse {
    YearHeatmapResponse {
        year: layout.year,
        theme: theme.name(),
        total_posts: layout.total_posts,
        total_weeks: layout.total_weeks,
        cells: layout
            .cells
            .iter()
            .map(|cell| CellResponse {
                date: cell.date.clone(),
                week_index: cell.week_index,
                weekday: cell.weekday,
                count: cell.count,
                color: layout.scale.color_of(cell.count),
            })
            .collect(),
        month_labels: layout.month_labels.clone(),
    }
}

fn parse_theme(name: Option<&str>) -> Result<Theme, AppError> {
    match name {
        None => Ok(Theme::default()),
        Some(name) => {
            Theme::parse(name).ok_or_else(|| AppError::bad_request(format!("unknown theme: {name}")))
        }
    }
}

/// The domain must parse as a URL before any fetch happens; a bad domain
/// aborts the whole update with no partial state change.
fn validate_domain(domain: Option<&str>, default: &str) -> Result<String, AppError> {
    let candidate = match domain {
        Some(value) if !value.trim().is_empty() => value.trim(),
        _ => default,
    };
    match reqwest::Url::parse(candidate) {
        Ok(_) => Ok(candidate.to_string()),
        Err(_) => Err(AppError::bad_request(INVALID_DOMAIN_MESSAGE)),
    }
}

/// Years to render, newest first, whichever way round the range was given.
fn year_range(start_year: i32, end_year: i32) -> Vec<i32> {
    let low = start_year.min(end_year);
    let high = start_year.max(end_year);
    (low..=high).rev().collect()
}
