use std::time::SystemTime;

use time::OffsetDateTime;
use tracing::{info, warn};

use crate::{
    domain::{join_policies, totals, JoinedRow, TariffCatalog, TradeTotals},
    infra::{CacheStatus, CensusClient},
};

/// Shown in place of the map and table when no trade data could be loaded.
pub const UNAVAILABLE_MESSAGE: &str =
    "Data currently unavailable. The Census API might be down or rate-limited.";

#[derive(Clone, Debug, PartialEq)]
pub enum DataStatus {
    Available,
    /// The API answered but had no rows for the year.
    Empty,
    /// The fetch failed; carries the reason for logs.
    Unavailable(String),
}

/// Everything the presentation layer needs for one render.
#[derive(Clone, Debug)]
pub struct Dashboard {
    pub year: i32,
    pub status: DataStatus,
    /// Joined rows in catalog order. Empty unless `status` is `Available`.
    pub rows: Vec<JoinedRow>,
    pub fetched_at: Option<SystemTime>,
    pub cache_status: Option<CacheStatus>,
}

impl Dashboard {
    pub fn is_available(&self) -> bool {
        self.status == DataStatus::Available
    }

    pub fn totals(&self) -> TradeTotals {
        totals(&self.rows)
    }

    fn without_data(year: i32, status: DataStatus) -> Self {
        Self {
            year,
            status,
            rows: Vec::new(),
            fetched_at: None,
            cache_status: None,
        }
    }
}

/// Last complete calendar year relative to `now`.
pub fn target_year(now: OffsetDateTime) -> i32 {
    now.year() - 1
}

pub fn current_target_year() -> i32 {
    target_year(OffsetDateTime::now_utc())
}

/// Fetch, reconcile and join one year of data.
///
/// Never fails: fetch errors and empty datasets come back as a status with no
/// rows, and the join is skipped.
pub async fn load_dashboard(client: &CensusClient, catalog: &TariffCatalog, year: i32) -> Dashboard {
    let payload = match client.fetch(year).await {
        Ok(payload) => payload,
        Err(err) => {
            warn!(year, "failed to fetch census trade data: {err}");
            return Dashboard::without_data(year, DataStatus::Unavailable(err.to_string()));
        }
    };

    if payload.data.is_empty() {
        info!(year, "census returned no trade rows");
        return Dashboard::without_data(year, DataStatus::Empty);
    }

    let rows = join_policies(catalog.entries(), &payload.data);
    let matched = rows.iter().filter(|row| row.has_trade()).count();
    info!(
        year,
        countries = payload.data.len(),
        rows = rows.len(),
        matched,
        cache = ?payload.status,
        "joined trade data with tariff catalog"
    );

    Dashboard {
        year,
        status: DataStatus::Available,
        rows,
        fetched_at: Some(payload.fetched_at),
        cache_status: Some(payload.status),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;
    use time::macros::datetime;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::infra::ManualClock;

    async fn client_with(exports: ResponseTemplate, imports: ResponseTemplate) -> (MockServer, CensusClient) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/exports/hs"))
            .respond_with(exports)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/imports/hs"))
            .respond_with(imports)
            .mount(&server)
            .await;
        let client = CensusClient::builder()
            .endpoints(
                format!("{}/exports/hs", server.uri()),
                format!("{}/imports/hs", server.uri()),
            )
            .clock(Arc::new(ManualClock::new(
                SystemTime::UNIX_EPOCH + Duration::from_secs(1_730_000_000),
            )))
            .build()
            .unwrap();
        (server, client)
    }

    #[test]
    fn target_year_is_previous_calendar_year() {
        assert_eq!(target_year(datetime!(2025-01-01 00:00 UTC)), 2024);
        assert_eq!(target_year(datetime!(2026-12-31 23:59 UTC)), 2025);
    }

    #[tokio::test]
    async fn joins_fetched_data_onto_catalog() {
        let (_server, client) = client_with(
            ResponseTemplate::new(200).set_body_json(json!([
                ["CTY_CODE", "CTY_NAME", "ALL_VAL_YR"],
                ["5700", "CHINA", "143500000000"],
                ["5800", "KOREA, SOUTH", "65000000000"]
            ])),
            ResponseTemplate::new(200).set_body_json(json!([
                ["CTY_CODE", "CTY_NAME", "GEN_VAL_YR"],
                ["5700", "CHINA", "426900000000"],
                ["4621", "RUSSIAN FEDERATION", "3000000000"]
            ])),
        )
        .await;
        let catalog = TariffCatalog::builtin();

        let dashboard = load_dashboard(&client, &catalog, 2024).await;
        assert!(dashboard.is_available());
        assert_eq!(dashboard.rows.len(), catalog.len());
        assert_eq!(dashboard.cache_status, Some(CacheStatus::Fresh));

        let china = dashboard.rows.iter().find(|r| r.iso3 == "CHN").unwrap();
        assert_eq!(china.balance_usd_b, 143.5 - 426.9);
        let korea = dashboard.rows.iter().find(|r| r.iso3 == "KOR").unwrap();
        assert_eq!(korea.exports_usd_b, 65.0);
        let russia = dashboard.rows.iter().find(|r| r.iso3 == "RUS").unwrap();
        assert_eq!(russia.imports_usd_b, 3.0);

        assert_eq!(dashboard.totals().matched, 3);

        let again = load_dashboard(&client, &catalog, 2024).await;
        assert_eq!(again.cache_status, Some(CacheStatus::Cached));
        assert_eq!(again.rows, dashboard.rows);
    }

    #[tokio::test]
    async fn malformed_payload_degrades_to_unavailable() {
        let (_server, client) = client_with(
            ResponseTemplate::new(200).set_body_string("not a table"),
            ResponseTemplate::new(200).set_body_json(json!([["CTY_CODE", "CTY_NAME", "GEN_VAL_YR"]])),
        )
        .await;
        let catalog = TariffCatalog::builtin();

        let dashboard = load_dashboard(&client, &catalog, 2024).await;
        assert!(matches!(dashboard.status, DataStatus::Unavailable(_)));
        assert!(dashboard.rows.is_empty());
        assert!(dashboard.fetched_at.is_none());

        // The failure stays uncached and joining no records still yields one
        // zero-filled row per entry.
        assert!(client.fetch(2024).await.is_err());
        let rows = join_policies(catalog.entries(), &[]);
        assert_eq!(rows.len(), catalog.len());
        assert!(rows
            .iter()
            .all(|r| r.exports_usd_b == 0.0 && r.imports_usd_b == 0.0 && r.balance_usd_b == 0.0));
    }

    #[tokio::test]
    async fn empty_dataset_is_not_an_error() {
        let (_server, client) = client_with(
            ResponseTemplate::new(200).set_body_json(json!([["CTY_CODE", "CTY_NAME", "ALL_VAL_YR"]])),
            ResponseTemplate::new(204),
        )
        .await;

        let dashboard = load_dashboard(&client, &TariffCatalog::builtin(), 2024).await;
        assert_eq!(dashboard.status, DataStatus::Empty);
        assert!(dashboard.rows.is_empty());
    }

    #[tokio::test]
    async fn server_error_degrades_to_unavailable() {
        let (_server, client) = client_with(
            ResponseTemplate::new(429),
            ResponseTemplate::new(200).set_body_json(json!([["CTY_CODE", "CTY_NAME", "GEN_VAL_YR"]])),
        )
        .await;

        let dashboard = load_dashboard(&client, &TariffCatalog::builtin(), 2024).await;
        assert!(!dashboard.is_available());
        assert!(dashboard.rows.is_empty());
    }
}
