//! Rendering of a [`Dashboard`] for the terminal and for map front-ends.

use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::app::{Dashboard, DataStatus, UNAVAILABLE_MESSAGE};
use crate::domain::{JoinedRow, TradeTotals};

const TABLE_HEADERS: [&str; 6] = [
    "Country Name",
    "Category",
    "Tariff Rate (%)",
    "US Trade Balance ($B)",
    "Exports",
    "Imports",
];

pub fn map_title(year: i32) -> String {
    format!("US Tariffs vs Trade Balance ({year})")
}

/// `19.3` -> `19.3%`
pub fn format_rate(pct: f64) -> String {
    format!("{pct:.1}%")
}

/// `1234.5` -> `$1,234.50B`
pub fn format_billions(value: f64) -> String {
    format!("${}B", group_thousands(value.abs(), 2, sign_prefix(value, false)))
}

/// `10.5` -> `$+10.50B`, `-20.0` -> `$-20.00B`
pub fn format_signed_billions(value: f64) -> String {
    format!("${}B", group_thousands(value.abs(), 2, sign_prefix(value, true)))
}

fn sign_prefix(value: f64, always: bool) -> &'static str {
    if value < 0.0 && value.abs() >= 0.005 {
        "-"
    } else if always {
        "+"
    } else {
        ""
    }
}

fn group_thousands(magnitude: f64, decimals: usize, sign: &str) -> String {
    let fixed = format!("{magnitude:.decimals$}");
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);
    grouped.push_str(sign);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

/// Map hover text for a balance, e.g. `+$10.50` / `-$20.00`.
fn hover_balance(value: f64) -> String {
    let sign = if value < 0.0 && value.abs() >= 0.005 { "-" } else { "+" };
    format!("{sign}${:.2}", value.abs())
}

/// Fixed-width text table, or the unavailable notice when there is no data.
pub fn render_table(dashboard: &Dashboard) -> String {
    if !dashboard.is_available() {
        return format!("{UNAVAILABLE_MESSAGE}\n");
    }

    let cells: Vec<[String; 6]> = dashboard.rows.iter().map(table_cells).collect();
    let mut widths = TABLE_HEADERS.map(str::len);
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    out.push_str(&map_title(dashboard.year));
    out.push('\n');
    if let Some(stamp) = dashboard.fetched_at.and_then(format_timestamp) {
        out.push_str(&format!("Fetched at {stamp}\n"));
    }
    out.push('\n');

    push_line(&mut out, &TABLE_HEADERS.map(String::from), &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');
    for row in &cells {
        push_line(&mut out, row, &widths);
    }

    let totals = dashboard.totals();
    out.push('\n');
    out.push_str(&render_totals(&totals));
    out
}

fn table_cells(row: &JoinedRow) -> [String; 6] {
    [
        row.country_name.clone(),
        row.category.to_string(),
        format_rate(row.tariff_rate_pct),
        format_signed_billions(row.balance_usd_b),
        format_billions(row.exports_usd_b),
        format_billions(row.imports_usd_b),
    ]
}

fn push_line(out: &mut String, cells: &[String; 6], widths: &[usize; 6]) {
    let line = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(i, (cell, &width))| {
            // Text columns left-aligned, figures right-aligned.
            if i < 2 {
                format!("{cell:<width$}")
            } else {
                format!("{cell:>width$}")
            }
        })
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

fn render_totals(totals: &TradeTotals) -> String {
    format!(
        "Total exports {}, imports {}, balance {} ({} of {} countries with trade data)\n",
        format_billions(totals.exports_usd_b),
        format_billions(totals.imports_usd_b),
        format_signed_billions(totals.balance_usd_b),
        totals.matched,
        totals.rows
    )
}

fn format_timestamp(at: std::time::SystemTime) -> Option<String> {
    OffsetDateTime::from(at).format(&Rfc3339).ok()
}

/// Choropleth description consumed by a map front-end.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MapFigure {
    pub title: String,
    pub color_scale: &'static str,
    pub projection: &'static str,
    pub color_label: &'static str,
    pub tick_suffix: &'static str,
    pub points: Vec<MapPoint>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MapPoint {
    pub iso3: String,
    pub country: String,
    /// Colour value: the tariff rate.
    pub value: f64,
    pub hover: MapHover,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MapHover {
    pub category: String,
    pub tariff_rate: String,
    pub balance: String,
    pub exports: String,
    pub imports: String,
}

pub fn map_figure(dashboard: &Dashboard) -> MapFigure {
    MapFigure {
        title: map_title(dashboard.year),
        color_scale: "Reds",
        projection: "natural earth",
        color_label: "Tariff Rate",
        tick_suffix: "%",
        points: dashboard
            .rows
            .iter()
            .map(|row| MapPoint {
                iso3: row.iso3.clone(),
                country: row.country_name.clone(),
                value: row.tariff_rate_pct,
                hover: MapHover {
                    category: row.category.to_string(),
                    tariff_rate: format!("{:.1}", row.tariff_rate_pct),
                    balance: hover_balance(row.balance_usd_b),
                    exports: format!("${:.1}", row.exports_usd_b),
                    imports: format!("${:.1}", row.imports_usd_b),
                },
            })
            .collect(),
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    year: i32,
    available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fetched_at: Option<String>,
    rows: &'a [JoinedRow],
    totals: TradeTotals,
}

pub fn render_json(dashboard: &Dashboard) -> Result<String, serde_json::Error> {
    let report = JsonReport {
        year: dashboard.year,
        available: dashboard.is_available(),
        message: (!dashboard.is_available()).then_some(UNAVAILABLE_MESSAGE),
        fetched_at: dashboard.fetched_at.and_then(format_timestamp),
        rows: &dashboard.rows,
        totals: dashboard.totals(),
    };
    serde_json::to_string_pretty(&report)
}

pub fn render_map(dashboard: &Dashboard) -> Result<String, serde_json::Error> {
    if !dashboard.is_available() {
        return render_json(dashboard);
    }
    serde_json::to_string_pretty(&map_figure(dashboard))
}

/// One-line status for logs and watch mode.
pub fn status_line(dashboard: &Dashboard) -> String {
    match &dashboard.status {
        DataStatus::Available => format!(
            "{} rows for {} ({:?})",
            dashboard.rows.len(),
            dashboard.year,
            dashboard.cache_status
        ),
        DataStatus::Empty => format!("no trade rows published for {}", dashboard.year),
        DataStatus::Unavailable(reason) => format!("unavailable for {}: {reason}", dashboard.year),
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use serde_json::Value;

    use super::*;
    use crate::domain::{join_policies, PolicyCategory, TariffCatalog, TariffEntry, TradeRecord};
    use crate::infra::CacheStatus;

    fn dashboard(rows: Vec<JoinedRow>) -> Dashboard {
        Dashboard {
            year: 2024,
            status: DataStatus::Available,
            rows,
            fetched_at: Some(SystemTime::UNIX_EPOCH + Duration::from_secs(1_735_689_600)),
            cache_status: Some(CacheStatus::Fresh),
        }
    }

    fn china_rows() -> Vec<JoinedRow> {
        let tariffs = vec![
            TariffEntry::new("China", 19.3, PolicyCategory::TradeWar, "CHN"),
            TariffEntry::new("Japan", 0.0, PolicyCategory::FtaPartner, "JPN"),
        ];
        let records = vec![TradeRecord {
            country_code: "5700".into(),
            country_name_raw: "CHINA".into(),
            exports_usd_b: 143.5,
            imports_usd_b: 1426.9,
        }];
        join_policies(&tariffs, &records)
    }

    #[test]
    fn formats_figures() {
        assert_eq!(format_rate(19.3), "19.3%");
        assert_eq!(format_rate(0.0), "0.0%");
        assert_eq!(format_billions(1234.5), "$1,234.50B");
        assert_eq!(format_billions(0.0), "$0.00B");
        assert_eq!(format_billions(999.999), "$1,000.00B");
        assert_eq!(format_signed_billions(10.5), "$+10.50B");
        assert_eq!(format_signed_billions(-20.0), "$-20.00B");
        assert_eq!(format_signed_billions(-1283.4), "$-1,283.40B");
        assert_eq!(format_signed_billions(0.0), "$+0.00B");
        assert_eq!(format_signed_billions(-0.001), "$+0.00B");
        assert_eq!(format_billions(1_234_567.0), "$1,234,567.00B");
    }

    #[test]
    fn table_lists_every_row_with_headers() {
        let text = render_table(&dashboard(china_rows()));
        assert!(text.starts_with("US Tariffs vs Trade Balance (2024)\n"));
        assert!(text.contains("Fetched at 2025-01-01T00:00:00Z"));
        assert!(text.contains("Country Name"));
        assert!(text.contains("US Trade Balance ($B)"));

        let china = text.lines().find(|l| l.starts_with("China")).unwrap();
        assert!(china.contains("Trade War"));
        assert!(china.contains("19.3%"));
        assert!(china.contains("$-1,283.40B"));
        assert!(china.contains("$143.50B"));
        assert!(china.contains("$1,426.90B"));

        let japan = text.lines().find(|l| l.starts_with("Japan")).unwrap();
        assert!(japan.contains("$+0.00B"));
        assert!(text.contains("(1 of 2 countries with trade data)"));
    }

    #[test]
    fn unavailable_dashboard_renders_notice_only() {
        let unavailable = Dashboard {
            year: 2024,
            status: DataStatus::Unavailable("timeout".into()),
            rows: Vec::new(),
            fetched_at: None,
            cache_status: None,
        };
        assert_eq!(render_table(&unavailable), format!("{UNAVAILABLE_MESSAGE}\n"));

        let json: Value = serde_json::from_str(&render_map(&unavailable).unwrap()).unwrap();
        assert_eq!(json["available"], false);
        assert_eq!(json["message"], UNAVAILABLE_MESSAGE);
        assert_eq!(json["rows"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn map_figure_uses_iso3_and_tariff_rate() {
        let figure = map_figure(&dashboard(china_rows()));
        assert_eq!(figure.title, "US Tariffs vs Trade Balance (2024)");
        assert_eq!(figure.color_scale, "Reds");
        assert_eq!(figure.points.len(), 2);

        let china = &figure.points[0];
        assert_eq!(china.iso3, "CHN");
        assert_eq!(china.value, 19.3);
        assert_eq!(china.hover.tariff_rate, "19.3");
        assert_eq!(china.hover.balance, "-$1283.40");
        assert_eq!(china.hover.exports, "$143.5");
        assert_eq!(figure.points[1].hover.balance, "+$0.00");
    }

    #[test]
    fn json_report_carries_rows_and_totals() {
        let rows = join_policies(TariffCatalog::builtin().entries(), &[]);
        let json: Value = serde_json::from_str(&render_json(&dashboard(rows)).unwrap()).unwrap();
        assert_eq!(json["year"], 2024);
        assert_eq!(json["available"], true);
        assert!(json.get("message").is_none());
        assert_eq!(json["rows"].as_array().unwrap().len(), 13);
        assert_eq!(json["rows"][0]["country_name"], "Canada");
        assert_eq!(json["rows"][0]["category"], "FTA Partner");
        assert_eq!(json["totals"]["matched"], 0);
    }

    #[test]
    fn status_lines() {
        let mut board = dashboard(Vec::new());
        board.status = DataStatus::Empty;
        assert_eq!(status_line(&board), "no trade rows published for 2024");
        board.status = DataStatus::Unavailable("boom".into());
        assert_eq!(status_line(&board), "unavailable for 2024: boom");
    }
}
