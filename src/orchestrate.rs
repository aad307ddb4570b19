use crate::fetcher::fetch_year_counts;
use crate::layout::{YearLayout, layout_year};
use crate::state::AppState;
use crate::themes::Theme;

/// One heatmap update: which years to render (any order), against which
/// domain, with which theme.
#[derive(Debug, Clone)]
pub struct HeatmapRequest {
    pub years: Vec<i32>,
    pub domain: String,
    pub theme: Theme,
}

/// Runs a full update: fetch then layout for each year, newest first, one
/// at a time. Returns `None` if another update was claimed while this one
/// was in flight; the stale result is discarded rather than applied.
pub async fn run_update(state: &AppState, request: &HeatmapRequest) -> Option<Vec<YearLayout>> {
    let generation = state.begin_update();

    let mut years = request.years.clone();
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();

    let mut layouts = Vec::with_capacity(years.len());
    for year in years {
        let counts = fetch_year_counts(state, year, &request.domain).await;
        layouts.push(layout_year(&counts, year, request.theme));
    }

    finish_update(state, generation, layouts)
}

fn finish_update(
    state: &AppState,
    generation: u64,
    layouts: Vec<YearLayout>,
) -> Option<Vec<YearLayout>> {
    if state.is_current(generation) {
        Some(layouts)
    } else {
        None
    }
}
