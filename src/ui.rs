use crate::layout::YearLayout;
use crate::themes::Theme;
use std::fmt::Write;

const CELL_SIZE: u32 = 12;
const CELL_PADDING: u32 = 2;
const WEEK_WIDTH: u32 = CELL_SIZE + CELL_PADDING;
const MARGIN_LEFT: u32 = 40;
const MARGIN_RIGHT: u32 = 20;
const MARGIN_TOP: u32 = 50;
const MARGIN_BOTTOM: u32 = 10;

/// Oldest year offered by the range selectors.
pub const SELECTOR_START_YEAR: i32 = 2020;

pub struct PageContext<'a> {
    pub current_year: i32,
    pub start_year: i32,
    pub end_year: i32,
    pub theme: Theme,
    pub domain: &'a str,
}

pub fn render_page(ctx: &PageContext<'_>, layouts: &[YearLayout]) -> String {
    let blocks: String = layouts.iter().map(render_year_block).collect();
    PAGE_HTML
        .replace("{{START_OPTIONS}}", &year_options(ctx.current_year, ctx.start_year))
        .replace("{{END_OPTIONS}}", &year_options(ctx.current_year, ctx.end_year))
        .replace("{{THEME_OPTIONS}}", &theme_options(ctx.theme))
        .replace("{{DOMAIN}}", &escape_html(ctx.domain))
        .replace("{{BLOCKS}}", &blocks)
}

pub fn render_year_block(layout: &YearLayout) -> String {
    let width = (layout.total_weeks + 1) * WEEK_WIDTH + MARGIN_LEFT + MARGIN_RIGHT;
    let height = 7 * WEEK_WIDTH + MARGIN_TOP + MARGIN_BOTTOM;

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg width="{width}" height="{height}" role="img"><g transform="translate({MARGIN_LEFT},{MARGIN_TOP})">"#
    );

    for label in &layout.month_labels {
        let x = label.week_index * WEEK_WIDTH;
        let _ = write!(
            svg,
            r#"<text class="month-label" x="{x}" y="-8">{}</text>"#,
            label.label
        );
    }

    for cell in &layout.cells {
        let x = cell.week_index * WEEK_WIDTH;
        let y = cell.weekday * WEEK_WIDTH;
        let fill = layout.scale.color_of(cell.count);
        let _ = write!(
            svg,
            r#"<rect x="{x}" y="{y}" width="{CELL_SIZE}" height="{CELL_SIZE}" rx="2" ry="2" fill="{fill}"><title>日期: {date}&#10;发布数: {count}</title></rect>"#,
            date = cell.date,
            count = cell.count,
        );
    }

    svg.push_str("</g></svg>");

    format!(
        r#"<div class="year-container"><div class="year-stats">{year}: {total} 条发布</div>{svg}</div>"#,
        year = layout.year,
        total = layout.total_posts,
    )
}

fn year_options(current_year: i32, selected: i32) -> String {
    let mut options = String::new();
    for year in (SELECTOR_START_YEAR..=current_year.max(SELECTOR_START_YEAR)).rev() {
        let flag = if year == selected { " selected" } else { "" };
        let _ = write!(options, r#"<option value="{year}"{flag}>{year}年</option>"#);
    }
    options
}

fn theme_options(selected: Theme) -> String {
    let mut options = String::new();
    for theme in Theme::ALL {
        let name = theme.name();
        let flag = if theme == selected { " selected" } else { "" };
        let mut label = name.to_string();
        label[..1].make_ascii_uppercase();
        let _ = write!(options, r#"<option value="{name}"{flag}>{label}</option>"#);
    }
    options
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="zh-CN">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Memos 热力图</title>
  <style>
    :root {
      --ink: #24292f;
      --muted: #57606a;
      --border: rgba(27, 31, 36, 0.15);
      --card: #ffffff;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: #f6f8fa;
      color: var(--ink);
      font-family: -apple-system, "Segoe UI", "Helvetica Neue", Arial, sans-serif;
      padding: 32px 18px 48px;
      display: grid;
      justify-items: center;
      gap: 24px;
    }

    header h1 {
      margin: 0;
      font-size: 1.6rem;
    }

    header p {
      margin: 6px 0 0;
      color: var(--muted);
      font-size: 0.95rem;
    }

    form.controls {
      display: flex;
      flex-wrap: wrap;
      align-items: end;
      gap: 12px;
      background: var(--card);
      border: 1px solid var(--border);
      border-radius: 12px;
      padding: 16px 20px;
    }

    form.controls label {
      display: grid;
      gap: 4px;
      font-size: 0.85rem;
      color: var(--muted);
    }

    select,
    input[type="text"] {
      padding: 6px 10px;
      border: 1px solid var(--border);
      border-radius: 6px;
      font-size: 0.95rem;
      background: white;
      color: var(--ink);
    }

    input[type="text"] {
      min-width: 260px;
    }

    button {
      padding: 7px 16px;
      border: none;
      border-radius: 6px;
      background: #2da44e;
      color: white;
      font-size: 0.95rem;
      font-weight: 600;
      cursor: pointer;
    }

    #heatmap {
      display: grid;
      gap: 20px;
    }

    .year-container {
      background: var(--card);
      border: 1px solid var(--border);
      border-radius: 12px;
      padding: 12px 16px;
      overflow-x: auto;
    }

    .year-stats {
      font-weight: 600;
      margin-bottom: 4px;
    }

    .month-label {
      font-size: 12px;
      fill: #24292f;
    }
  </style>
</head>
<body>
  <header>
    <h1>Memos 热力图</h1>
    <p>按年份查看每日发布数量。</p>
  </header>

  <form class="controls" method="get" action="/">
    <label>起始年份
      <select name="start_year">{{START_OPTIONS}}</select>
    </label>
    <label>结束年份
      <select name="end_year">{{END_OPTIONS}}</select>
    </label>
    <label>主题
      <select name="theme">{{THEME_OPTIONS}}</select>
    </label>
    <label>域名
      <input type="text" name="domain" value="{{DOMAIN}}" placeholder="https://memos.lzsay.com" />
    </label>
    <button type="submit">生成</button>
  </form>

  <div id="heatmap">{{BLOCKS}}</div>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::layout_year;
    use crate::models::DailyCounts;

    #[test]
    fn year_block_has_one_rect_per_day_and_a_summary() {
        let mut counts = DailyCounts::new();
        counts.insert("2023-03-01".to_string(), 5);
        let layout = layout_year(&counts, 2023, Theme::Github);
        let block = render_year_block(&layout);

        assert_eq!(block.matches("<rect ").count(), 365);
        assert!(block.contains("2023: 5 条发布"));
        assert!(block.contains("日期: 2023-03-01"));
        assert!(block.contains("发布数: 5"));
        assert!(block.contains(">Jan<"));
        assert!(block.contains(">Dec<"));
    }

    #[test]
    fn page_marks_current_selection() {
        let ctx = PageContext {
            current_year: 2024,
            start_year: 2023,
            end_year: 2024,
            theme: Theme::Winter,
            domain: "https://memos.test",
        };
        let page = render_page(&ctx, &[]);
        assert!(page.contains(r#"<option value="2023" selected>2023年</option>"#));
        assert!(page.contains(r#"<option value="winter" selected>Winter</option>"#));
        assert!(page.contains(r#"value="https://memos.test""#));
    }

    #[test]
    fn domain_is_html_escaped() {
        assert_eq!(
            escape_html(r#"https://a.test/?q="<x>"&y"#),
            "https://a.test/?q=&quot;&lt;x&gt;&quot;&amp;y"
        );
    }
}
