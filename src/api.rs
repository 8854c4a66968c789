//! Synchronous client for the **World Bank Indicators API (v2)**.
//!
//! One request covers one country, one indicator and one year range, via the
//! `country/{iso3}/indicator/{code}` endpoint. Results come back as
//! [`Observation`] rows sorted by year.
//!
//! ### Notes
//! - Only the first page is requested, with `per_page=2000`; that covers any
//!   single-country annual series. A larger `pages` count is logged, not followed.
//! - There are no retries. A failed request is the caller's to report.
//!
//! Typical usage:
//! ```no_run
//! # use macro_viz::api::{Client, Fetch};
//! # use macro_viz::models::SeriesKey;
//! let client = Client::new()?;
//! let rows = client.fetch_series(&SeriesKey {
//!     iso3: "DEU".into(),
//!     indicator: "SP.POP.TOTL".into(),
//!     start: 2000,
//!     end: 2020,
//! })?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::error::FetchError;
use crate::models::{Entry, Meta, Observation, SeriesKey};
use anyhow::{Context, Result};
use log::{debug, warn};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.worldbank.org/v2";
/// Entries requested in the single page we fetch.
pub const PER_PAGE: u32 = 2000;

/// Anything that can produce one country's series.
///
/// Implemented by the HTTP [`Client`], by the memoizing
/// [`crate::cache::CachedFetcher`], and by test doubles.
pub trait Fetch {
    fn fetch_series(&self, key: &SeriesKey) -> Result<Vec<Observation>, FetchError>;
}

#[derive(Debug, Clone)]
pub struct Client {
    pub base_url: String,
    http: HttpClient,
}

// Allow -, _, . unescaped in codes (common for indicator ids)
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

fn enc(part: &str) -> String {
    percent_encoding::utf8_percent_encode(part.trim(), SAFE).to_string()
}

impl Client {
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Client against another base URL (a mirror, or an unreachable address in tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30)) // total request timeout
            .connect_timeout(Duration::from_secs(10))
            .redirect(Policy::limited(5))
            .user_agent(concat!("macro_viz/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build http client")?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Request URL for one series.
    pub fn series_url(&self, key: &SeriesKey) -> String {
        format!(
            "{}/country/{}/indicator/{}?format=json&per_page={}&date={}:{}",
            self.base_url,
            enc(&key.iso3),
            enc(&key.indicator),
            PER_PAGE,
            key.start,
            key.end
        )
    }
}

impl Fetch for Client {
    fn fetch_series(&self, key: &SeriesKey) -> Result<Vec<Observation>, FetchError> {
        let url = self.series_url(key);
        debug!("GET {}", url);
        let resp = self.http.get(&url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }
        let body = resp.text()?;
        let payload: Value = serde_json::from_str(&body)?;
        normalize(&key.iso3, &key.indicator, &payload)
    }
}

/// Turn a raw API payload into sorted observations for one country.
///
/// The API returns `[Meta, [Entry, ...]]`, `[Meta, null]` when there is no
/// data, or a lone `[{"message": [...]}]` (e.g. an unknown country code).
/// Both of the latter are an empty result, not an error.
pub fn normalize(iso3: &str, indicator: &str, payload: &Value) -> Result<Vec<Observation>, FetchError> {
    let arr = payload
        .as_array()
        .ok_or(FetchError::Shape("not a top-level array"))?;
    let Some(head) = arr.first() else {
        return Ok(Vec::new());
    };

    // No second element: nothing to read. The message is only logged.
    if let Some(msg) = head.get("message") {
        warn!("{} {}: world bank api message: {}", iso3, indicator, msg);
        return Ok(Vec::new());
    }

    if let Ok(meta) = serde_json::from_value::<Meta>(head.clone())
        && meta.pages > 1
    {
        warn!(
            "{} {}: {} rows across {} pages; only the first {} are used",
            iso3, indicator, meta.total, meta.pages, meta.per_page
        );
    }

    let entries: Vec<Entry> = match arr.get(1) {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(v @ Value::Array(_)) => serde_json::from_value(v.clone())?,
        Some(_) => return Err(FetchError::Shape("data element is not an array")),
    };

    let iso3 = iso3.trim().to_uppercase();
    let rows = entries
        .into_iter()
        .filter_map(|e| e.into_observation(&iso3, indicator))
        .collect();
    Ok(sort_by_year(rows))
}

/// Stable ascending sort on `year`. Equal years keep payload order.
pub fn sort_by_year(mut rows: Vec<Observation>) -> Vec<Observation> {
    rows.sort_by_key(|r| r.year);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_layout() {
        let client = Client::with_base_url("http://localhost:1/v2/").unwrap();
        let key = SeriesKey {
            iso3: "DEU".into(),
            indicator: "SP.POP.TOTL".into(),
            start: 2000,
            end: 2005,
        };
        assert_eq!(
            client.series_url(&key),
            "http://localhost:1/v2/country/DEU/indicator/SP.POP.TOTL?format=json&per_page=2000&date=2000:2005"
        );
    }

    #[test]
    fn path_segments_are_encoded() {
        assert_eq!(enc(" D/EU "), "D%2FEU");
        assert_eq!(enc("NY.GDP.MKTP.CD"), "NY.GDP.MKTP.CD");
    }
}
