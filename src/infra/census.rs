//! Thin asynchronous client for the Census international trade time series.
//!
//! - Pulls annual exports and imports per partner country for one year.
//! - Merges both directions into [`TradeRecord`]s keyed on country code.
//! - Keeps a per-year in-memory cache (one hour by default).

use std::{sync::Arc, time::Duration};

use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::{merge_flows, FlowRow, TradeRecord};
use crate::infra::cache::{CachedPayload, Clock, SystemClock, TtlCache, DEFAULT_TTL};
use crate::infra::table::{FlowSchema, Table};
use crate::util::version::user_agent;

pub const DEFAULT_EXPORTS_URL: &str =
    "https://api.census.gov/data/timeseries/intltrade/exports/hs";
pub const DEFAULT_IMPORTS_URL: &str =
    "https://api.census.gov/data/timeseries/intltrade/imports/hs";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Anything that stops a year of trade data from loading.
///
/// Callers treat every variant the same way ("data unavailable"); the variants
/// only exist so logs say what went wrong.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {status} from {url}")]
    Status { status: StatusCode, url: String },
    #[error("malformed payload: {0}")]
    Payload(String),
    #[error("response is missing required column {0}")]
    MissingColumn(String),
    #[error("invalid value in column {column}: {value}")]
    InvalidValue { column: String, value: String },
}

#[derive(Clone, Debug)]
pub struct Endpoints {
    pub exports: Url,
    pub imports: Url,
}

impl Endpoints {
    pub fn parse(exports: &str, imports: &str) -> Result<Self, FetchError> {
        Ok(Self {
            exports: Url::parse(exports)?,
            imports: Url::parse(imports)?,
        })
    }
}

#[derive(Clone)]
pub struct CensusClient {
    http: Client,
    endpoints: Endpoints,
    cache: Arc<TtlCache<i32, Vec<TradeRecord>>>,
}

impl CensusClient {
    pub fn builder() -> CensusClientBuilder {
        CensusClientBuilder::default()
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Annual trade with every partner country for `year`.
    ///
    /// Within the cache TTL repeated calls for the same year are answered from
    /// memory. Failures are not cached.
    pub async fn fetch(&self, year: i32) -> Result<CachedPayload<Vec<TradeRecord>>, FetchError> {
        if let Some(payload) = self.cache.get(&year).await {
            debug!(year, countries = payload.data.len(), "serving cached trade data");
            return Ok(payload);
        }

        let (exports, imports) = tokio::try_join!(
            self.fetch_flow(&self.endpoints.exports, FlowSchema::EXPORTS, year),
            self.fetch_flow(&self.endpoints.imports, FlowSchema::IMPORTS, year),
        )?;
        info!(
            year,
            exports = exports.len(),
            imports = imports.len(),
            "fetched census trade flows"
        );

        let records = merge_flows(exports, imports);
        Ok(self.cache.insert(year, records).await)
    }

    async fn fetch_flow(
        &self,
        endpoint: &Url,
        schema: FlowSchema,
        year: i32,
    ) -> Result<Vec<FlowRow>, FetchError> {
        let mut url = endpoint.clone();
        url.query_pairs_mut()
            .append_pair("get", &schema.get_param())
            .append_pair("time", &year.to_string());

        debug!(%url, "requesting census data");

        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        // The API answers 204 when the query matches nothing.
        if status == StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }
        if !status.is_success() {
            warn!(%url, %status, "census request failed");
            return Err(FetchError::Status {
                status,
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        let value: Value = serde_json::from_slice(&body)
            .map_err(|err| FetchError::Payload(format!("invalid JSON: {err}")))?;
        let table = Table::from_json(value)?;
        schema.parse(&table)
    }
}

pub struct CensusClientBuilder {
    exports_url: String,
    imports_url: String,
    ttl: Duration,
    timeout: Duration,
    clock: Arc<dyn Clock>,
}

impl Default for CensusClientBuilder {
    fn default() -> Self {
        Self {
            exports_url: DEFAULT_EXPORTS_URL.to_string(),
            imports_url: DEFAULT_IMPORTS_URL.to_string(),
            ttl: DEFAULT_TTL,
            timeout: DEFAULT_TIMEOUT,
            clock: Arc::new(SystemClock),
        }
    }
}

impl CensusClientBuilder {
    pub fn endpoints(mut self, exports: impl Into<String>, imports: impl Into<String>) -> Self {
        self.exports_url = exports.into();
        self.imports_url = imports.into();
        self
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[cfg(test)]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn build(self) -> Result<CensusClient, FetchError> {
        let endpoints = Endpoints::parse(&self.exports_url, &self.imports_url)?;
        let http = Client::builder()
            .user_agent(user_agent())
            .timeout(self.timeout)
            .build()?;
        Ok(CensusClient {
            http,
            endpoints,
            cache: Arc::new(TtlCache::with_clock(self.ttl, self.clock)),
        })
    }
}
