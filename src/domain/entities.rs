use std::fmt;

use serde::{Deserialize, Serialize};

/// Census country code (`CTY_CODE`), the merge key between the two trade flows.
pub type CountryCode = String;

/// Annual US trade with one partner country, in billions of USD.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub country_code: CountryCode,
    /// Name as published by the source (upper case).
    pub country_name_raw: String,
    pub exports_usd_b: f64,
    pub imports_usd_b: f64,
}

impl TradeRecord {
    /// Exports minus imports. Negative means a US trade deficit.
    pub fn balance_usd_b(&self) -> f64 {
        self.exports_usd_b - self.imports_usd_b
    }

    /// Display name after normalization, used as the join key.
    pub fn country_name(&self) -> String {
        super::names::normalize(&self.country_name_raw)
    }
}

/// Tariff policy bucket a country falls into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyCategory {
    #[serde(rename = "FTA Partner", alias = "FTAPartner")]
    FtaPartner,
    #[serde(rename = "Normal Trade", alias = "NormalTrade")]
    NormalTrade,
    #[serde(rename = "Trade War", alias = "TradeWar")]
    TradeWar,
    Sanctioned,
}

impl PolicyCategory {
    pub fn label(&self) -> &'static str {
        match self {
            PolicyCategory::FtaPartner => "FTA Partner",
            PolicyCategory::NormalTrade => "Normal Trade",
            PolicyCategory::TradeWar => "Trade War",
            PolicyCategory::Sanctioned => "Sanctioned",
        }
    }
}

impl fmt::Display for PolicyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Hand-curated tariff policy for one country.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TariffEntry {
    pub country_name: String,
    pub tariff_rate_pct: f64,
    pub category: PolicyCategory,
    /// ISO 3166-1 alpha-3 code used to place the country on the map.
    pub iso3: String,
}

impl TariffEntry {
    pub fn new(
        country_name: impl Into<String>,
        tariff_rate_pct: f64,
        category: PolicyCategory,
        iso3: impl Into<String>,
    ) -> Self {
        Self {
            country_name: country_name.into(),
            tariff_rate_pct,
            category,
            iso3: iso3.into(),
        }
    }
}

/// A tariff entry enriched with the matching trade figures.
///
/// Trade fields are zero when the country had no trade record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JoinedRow {
    pub country_name: String,
    pub category: PolicyCategory,
    pub tariff_rate_pct: f64,
    pub iso3: String,
    pub exports_usd_b: f64,
    pub imports_usd_b: f64,
    pub balance_usd_b: f64,
}

impl JoinedRow {
    pub fn has_trade(&self) -> bool {
        self.exports_usd_b != 0.0 || self.imports_usd_b != 0.0
    }
}
