use std::collections::HashMap;

use serde::Serialize;

use super::entities::{JoinedRow, TariffEntry, TradeRecord};

/// Left-join trade figures onto tariff entries by normalized country name.
///
/// Every entry yields exactly one row, in input order. Entries without a
/// matching trade record get zero exports, imports and balance. If several
/// records normalize to the same name, the first one is used.
pub fn join_policies(tariffs: &[TariffEntry], records: &[TradeRecord]) -> Vec<JoinedRow> {
    let mut by_name: HashMap<String, &TradeRecord> = HashMap::with_capacity(records.len());
    for record in records {
        by_name.entry(record.country_name()).or_insert(record);
    }

    tariffs
        .iter()
        .map(|entry| {
            let (exports, imports, balance) = by_name
                .get(&entry.country_name)
                .map(|r| (r.exports_usd_b, r.imports_usd_b, r.balance_usd_b()))
                .unwrap_or((0.0, 0.0, 0.0));
            JoinedRow {
                country_name: entry.country_name.clone(),
                category: entry.category,
                tariff_rate_pct: entry.tariff_rate_pct,
                iso3: entry.iso3.clone(),
                exports_usd_b: exports,
                imports_usd_b: imports,
                balance_usd_b: balance,
            }
        })
        .collect()
}

/// Aggregates over a joined table.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TradeTotals {
    pub exports_usd_b: f64,
    pub imports_usd_b: f64,
    pub balance_usd_b: f64,
    /// Rows that matched a trade record with non-zero flows.
    pub matched: usize,
    pub rows: usize,
}

pub fn totals(rows: &[JoinedRow]) -> TradeTotals {
    rows.iter().fold(
        TradeTotals {
            rows: rows.len(),
            ..TradeTotals::default()
        },
        |mut acc, row| {
            acc.exports_usd_b += row.exports_usd_b;
            acc.imports_usd_b += row.imports_usd_b;
            acc.balance_usd_b += row.balance_usd_b;
            if row.has_trade() {
                acc.matched += 1;
            }
            acc
        },
    )
}
