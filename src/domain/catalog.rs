use std::collections::HashSet;

use thiserror::Error;

use super::entities::{PolicyCategory, TariffEntry};

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("duplicate country in tariff catalog: {0}")]
    DuplicateCountry(String),
    #[error("invalid tariff rate {rate} for {country}")]
    InvalidRate { country: String, rate: f64 },
    #[error("invalid ISO alpha-3 code {iso3:?} for {country}")]
    InvalidIso3 { country: String, iso3: String },
    #[error("empty country name in tariff catalog")]
    EmptyName,
}

/// Ordered, validated set of tariff entries. Order drives the output order of
/// the policy join.
#[derive(Clone, Debug, PartialEq)]
pub struct TariffCatalog {
    entries: Vec<TariffEntry>,
}

impl TariffCatalog {
    pub fn new(entries: Vec<TariffEntry>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if entry.country_name.trim().is_empty() {
                return Err(CatalogError::EmptyName);
            }
            if !seen.insert(entry.country_name.as_str()) {
                return Err(CatalogError::DuplicateCountry(entry.country_name.clone()));
            }
            if !entry.tariff_rate_pct.is_finite() || entry.tariff_rate_pct < 0.0 {
                return Err(CatalogError::InvalidRate {
                    country: entry.country_name.clone(),
                    rate: entry.tariff_rate_pct,
                });
            }
            if entry.iso3.len() != 3 || !entry.iso3.chars().all(|c| c.is_ascii_uppercase()) {
                return Err(CatalogError::InvalidIso3 {
                    country: entry.country_name.clone(),
                    iso3: entry.iso3.clone(),
                });
            }
        }
        Ok(Self { entries })
    }

    /// The hand-maintained policy table shipped with the binary.
    pub fn builtin() -> Self {
        use PolicyCategory::*;
        let entries = vec![
            TariffEntry::new("Canada", 0.0, FtaPartner, "CAN"),
            TariffEntry::new("Mexico", 0.0, FtaPartner, "MEX"),
            TariffEntry::new("China", 19.3, TradeWar, "CHN"),
            TariffEntry::new("Germany", 2.4, NormalTrade, "DEU"),
            TariffEntry::new("France", 2.6, NormalTrade, "FRA"),
            TariffEntry::new("United Kingdom", 2.5, NormalTrade, "GBR"),
            TariffEntry::new("India", 3.2, NormalTrade, "IND"),
            TariffEntry::new("Japan", 0.0, FtaPartner, "JPN"),
            TariffEntry::new("South Korea", 0.0, FtaPartner, "KOR"),
            TariffEntry::new("Brazil", 3.5, NormalTrade, "BRA"),
            TariffEntry::new("Vietnam", 2.8, NormalTrade, "VNM"),
            TariffEntry::new("Russia", 35.0, Sanctioned, "RUS"),
            TariffEntry::new("Australia", 0.0, FtaPartner, "AUS"),
        ];
        Self { entries }
    }

    pub fn entries(&self) -> &[TariffEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TariffCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
