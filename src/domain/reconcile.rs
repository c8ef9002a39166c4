use std::collections::BTreeMap;

use tracing::debug;

use super::entities::{CountryCode, TradeRecord};

/// Conversion from raw dollars to the billions used everywhere downstream.
pub const USD_PER_BILLION: f64 = 1_000_000_000.0;

/// One country's annual value for a single trade direction, in raw USD.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowRow {
    pub country_code: CountryCode,
    pub country_name: String,
    pub value_usd: f64,
}

impl FlowRow {
    pub fn new(country_code: impl Into<String>, country_name: impl Into<String>, value_usd: f64) -> Self {
        Self {
            country_code: country_code.into(),
            country_name: country_name.into(),
            value_usd,
        }
    }
}

#[derive(Default)]
struct Side {
    name: Option<String>,
    usd_b: Option<f64>,
}

impl Side {
    /// Monthly rows for one country repeat its code with a year-to-date
    /// value, so the largest value is the annual total.
    fn absorb(&mut self, row: FlowRow, direction: &str) {
        let value = row.value_usd / USD_PER_BILLION;
        match self.usd_b {
            Some(current) => {
                debug!(
                    code = %row.country_code,
                    direction,
                    "repeated country code; keeping the larger year-to-date value"
                );
                self.usd_b = Some(current.max(value));
            }
            None => self.usd_b = Some(value),
        }
        if self.name.is_none() {
            self.name = non_empty(row.country_name);
        }
    }
}

#[derive(Default)]
struct Merged {
    exports: Side,
    imports: Side,
}

/// Outer-merge export and import rows on country code.
///
/// A country present on one side only gets zero for the other. The export
/// side's name wins when both sides carry one. A code repeated within one
/// side keeps its largest value. Output is sorted by code.
pub fn merge_flows(exports: Vec<FlowRow>, imports: Vec<FlowRow>) -> Vec<TradeRecord> {
    let mut by_code: BTreeMap<CountryCode, Merged> = BTreeMap::new();

    for row in exports {
        let merged = by_code.entry(row.country_code.clone()).or_default();
        merged.exports.absorb(row, "exports");
    }
    for row in imports {
        let merged = by_code.entry(row.country_code.clone()).or_default();
        merged.imports.absorb(row, "imports");
    }

    by_code
        .into_iter()
        .map(|(country_code, merged)| TradeRecord {
            country_code,
            country_name_raw: merged
                .exports
                .name
                .or(merged.imports.name)
                .unwrap_or_default(),
            exports_usd_b: merged.exports.usd_b.unwrap_or(0.0),
            imports_usd_b: merged.imports.usd_b.unwrap_or(0.0),
        })
        .collect()
}

fn non_empty(name: String) -> Option<String> {
    if name.trim().is_empty() {
        None
    } else {
        Some(name)
    }
}
