use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Post counts keyed by ISO `YYYY-MM-DD` date string. Sparse: only dates
/// with at least one post appear, and every key falls inside one year.
pub type DailyCounts = BTreeMap<String, u64>;

/// One record from the remote memos API. Everything but the creation
/// timestamp is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoRecord {
    #[serde(rename = "createdTs")]
    pub created_ts: i64,
}

/// Grid geometry for one calendar day. `week_index` is the horizontal
/// column (Sunday-started weeks since Jan 1), `weekday` the row (0 = Sun).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub date: String,
    pub week_index: u32,
    pub weekday: u32,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthLabel {
    /// 1-based calendar month.
    pub month: u32,
    /// Week index of the month's first day.
    pub week_index: u32,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CellResponse {
    pub date: String,
    pub week_index: u32,
    pub weekday: u32,
    pub count: u64,
    pub color: &'static str,
}

#[derive(Debug, Serialize)]
pub struct YearHeatmapResponse {
    pub year: i32,
    pub theme: &'static str,
    pub total_posts: u64,
    pub total_weeks: u32,
    pub cells: Vec<CellResponse>,
    pub month_labels: Vec<MonthLabel>,
}
