use crate::models::{Cell, DailyCounts, MonthLabel};
use crate::themes::Theme;
use chrono::{Datelike, NaiveDate};

const MONTH_ABBR: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Quantized color scale: `len(ramp) + 1` buckets over `[0, max(1, max_count)]`,
/// bucket 0 mapped to the theme's empty color.
#[derive(Debug, Clone, Copy)]
pub struct ColorScale {
    theme: Theme,
    max_count: u64,
}

impl ColorScale {
    pub fn new(theme: Theme, max_count: u64) -> Self {
        Self { theme, max_count }
    }

    pub fn bucket_of(&self, count: u64) -> usize {
        let spec = self.theme.spec();
        let buckets = (spec.ramp.len() + 1) as u64;
        // max(1, ..) keeps the domain non-degenerate when every count is zero.
        let max = self.max_count.max(1);
        ((count.saturating_mul(buckets)) / max).min(buckets - 1) as usize
    }

    pub fn color_of(&self, count: u64) -> &'static str {
        let spec = self.theme.spec();
        match self.bucket_of(count) {
            0 => spec.empty,
            bucket => spec.ramp[bucket - 1],
        }
    }
}

/// Renderable layout for one year: every calendar day as a grid cell plus
/// month label positions and the color scale for the year's counts.
#[derive(Debug, Clone)]
pub struct YearLayout {
    pub year: i32,
    pub cells: Vec<Cell>,
    pub month_labels: Vec<MonthLabel>,
    /// Number of week columns (week index of Dec 31, plus one).
    pub total_weeks: u32,
    pub total_posts: u64,
    pub scale: ColorScale,
}

/// Computes the week-by-weekday grid for `year`. Enumerates every day from
/// Jan 1 to Dec 31 in order; days absent from `counts` get a count of 0.
pub fn layout_year(counts: &DailyCounts, year: i32, theme: Theme) -> YearLayout {
    let year_start = jan_first(year);
    let year_end = jan_first(year + 1);

    let mut cells = Vec::with_capacity(366);
    for date in year_start.iter_days().take_while(|d| *d < year_end) {
        let key = date.format("%Y-%m-%d").to_string();
        let count = counts.get(&key).copied().unwrap_or(0);
        cells.push(Cell {
            date: key,
            week_index: week_index(year_start, date),
            weekday: date.weekday().num_days_from_sunday(),
            count,
        });
    }

    let month_labels = (1..=12)
        .map(|month| {
            let first = first_of_month(year, month);
            MonthLabel {
                month,
                week_index: week_index(year_start, first),
                label: MONTH_ABBR[month as usize - 1],
            }
        })
        .collect();

    let max_count = counts.values().copied().max().unwrap_or(0);
    let total_posts = counts.values().sum();
    let dec_31 = year_end.pred_opt().unwrap_or(year_start);
    let total_weeks = week_index(year_start, dec_31) + 1;

    YearLayout {
        year,
        cells,
        month_labels,
        total_weeks,
        total_posts,
        scale: ColorScale::new(theme, max_count),
    }
}

/// Number of Sunday boundaries crossed between Jan 1 and `date`, i.e. the
/// cell's column in a Sunday-started week grid.
fn week_index(year_start: NaiveDate, date: NaiveDate) -> u32 {
    let days = (date - year_start).num_days();
    let offset = year_start.weekday().num_days_from_sunday() as i64;
    ((days + offset) / 7) as u32
}

fn jan_first(year: i32) -> NaiveDate {
    // Jan 1 exists for every year chrono can represent.
    NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or_default()
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or_default()
}
