//! Error taxonomy for a dashboard run.
//!
//! - [`QueryError`]: the inputs were rejected; nothing was fetched.
//! - [`FetchError`]: one country's request failed; the run carries on without it.
//!
//! An empty combined table is not an error type of its own; it is reported as
//! [`crate::pipeline::RunOutcome::Empty`].

use thiserror::Error;

/// Blocking input errors raised while validating a query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("Please enter at least one ISO3 country code (e.g., DEU).")]
    NoCountries,
    #[error("Too many countries selected ({count}). Please keep it ≤ {max}.")]
    TooManyCountries { count: usize, max: usize },
    #[error("Unknown indicator `{0}`. Pick one of the listed indicators.")]
    UnknownIndicator(String),
    #[error("Year {year} is outside the supported range {min}–{max}.")]
    YearOutOfBounds { year: i32, min: i32, max: i32 },
    #[error("Start year {start} is later than end year {end}.")]
    ReversedYears { start: i32, end: i32 },
}

/// Failure of a single per-country request.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("request failed with HTTP {status}")]
    Status { status: u16 },
    #[error("decode json: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("unexpected response shape: {0}")]
    Shape(&'static str),
}
