//! One dashboard run: validate, fetch per country, aggregate.
//!
//! ```text
//! Idle → Validating → Fetching → Aggregating → Rendered
//!            │                        │
//!            └→ RejectedInput         └→ EmptyResult
//! ```
//!
//! Countries are fetched one at a time, in the order given. A failing
//! country becomes a [`Warning`] and is left out; it never stops the others.

use crate::api::Fetch;
use crate::error::QueryError;
use crate::indicators::Indicator;
use crate::models::Observation;
use crate::query::{Query, YearRange};
use crate::storage;
use anyhow::Result;
use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Validating,
    Fetching,
    Aggregating,
    Rendered,
    RejectedInput,
    EmptyResult,
}

/// Tracks the phase of a run and logs each transition.
#[derive(Debug)]
struct Tracker {
    phase: RunPhase,
}

impl Tracker {
    fn at(phase: RunPhase) -> Self {
        Self { phase }
    }

    fn enter(&mut self, next: RunPhase) {
        debug!("run: {:?} -> {:?}", self.phase, next);
        self.phase = next;
    }
}

/// A non-blocking per-country failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub iso3: String,
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: failed to fetch ({})", self.iso3, self.message)
    }
}

/// Per-country tables in fetch order, plus the countries that failed.
#[derive(Debug, Default)]
pub struct Fetched {
    pub frames: Vec<Vec<Observation>>,
    pub warnings: Vec<Warning>,
}

/// The combined table of a successful run.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub query: Query,
    pub table: Vec<Observation>,
    pub warnings: Vec<Warning>,
}

impl Dataset {
    pub fn export_file_name(&self) -> String {
        storage::export_file_name(self.query.indicator.code, self.query.years)
    }

    pub fn to_csv(&self) -> Result<String> {
        storage::to_csv_string(&self.table)
    }

    /// Distinct country codes present in the table.
    pub fn countries(&self) -> BTreeSet<&str> {
        self.table.iter().map(|o| o.iso3.as_str()).collect()
    }
}

#[derive(Debug)]
pub enum RunOutcome {
    Rejected(QueryError),
    Empty { query: Query, warnings: Vec<Warning> },
    Rendered(Dataset),
}

impl RunOutcome {
    pub fn phase(&self) -> RunPhase {
        match self {
            RunOutcome::Rejected(_) => RunPhase::RejectedInput,
            RunOutcome::Empty { .. } => RunPhase::EmptyResult,
            RunOutcome::Rendered(_) => RunPhase::Rendered,
        }
    }

    pub fn warnings(&self) -> &[Warning] {
        match self {
            RunOutcome::Rejected(_) => &[],
            RunOutcome::Empty { warnings, .. } => warnings,
            RunOutcome::Rendered(ds) => &ds.warnings,
        }
    }
}

/// Validate raw inputs: year range first, then the country list.
pub fn validate(
    countries_text: &str,
    indicator: &'static Indicator,
    start_year: i32,
    end_year: i32,
) -> Result<Query, QueryError> {
    let years = YearRange::new(start_year, end_year)?;
    Query::new(countries_text, indicator, years)
}

/// Fetch every country in order, folding failures into warnings.
pub fn fetch_all<F: Fetch + ?Sized>(fetcher: &F, query: &Query) -> Fetched {
    let mut out = Fetched::default();
    for key in query.series_keys() {
        match fetcher.fetch_series(&key) {
            Ok(rows) => {
                debug!("{}: {} rows", key.iso3, rows.len());
                out.frames.push(rows);
            }
            Err(e) => {
                warn!("{}: failed to fetch ({})", key.iso3, e);
                out.warnings.push(Warning {
                    iso3: key.iso3,
                    message: e.to_string(),
                });
            }
        }
    }
    out
}

/// Concatenate per-country tables, preserving their order.
pub fn aggregate(frames: Vec<Vec<Observation>>) -> Vec<Observation> {
    frames.into_iter().flatten().collect()
}

/// Run an already-validated query from `Fetching` onwards.
pub fn run_query<F: Fetch + ?Sized>(fetcher: &F, query: Query) -> RunOutcome {
    let mut tracker = Tracker::at(RunPhase::Validating);
    tracker.enter(RunPhase::Fetching);
    let Fetched { frames, warnings } = fetch_all(fetcher, &query);

    tracker.enter(RunPhase::Aggregating);
    let table = aggregate(frames);
    if table.is_empty() {
        tracker.enter(RunPhase::EmptyResult);
        info!(
            "{} for {:?}: no data ({} failed)",
            query.indicator.code,
            query.countries,
            warnings.len()
        );
        return RunOutcome::Empty { query, warnings };
    }

    tracker.enter(RunPhase::Rendered);
    info!(
        "{} for {:?}: {} rows, {} failed",
        query.indicator.code,
        query.countries,
        table.len(),
        warnings.len()
    );
    RunOutcome::Rendered(Dataset {
        query,
        table,
        warnings,
    })
}

/// A complete run from raw inputs.
pub fn run<F: Fetch + ?Sized>(
    fetcher: &F,
    countries_text: &str,
    indicator: &'static Indicator,
    start_year: i32,
    end_year: i32,
) -> RunOutcome {
    let mut tracker = Tracker::at(RunPhase::Idle);
    tracker.enter(RunPhase::Validating);
    match validate(countries_text, indicator, start_year, end_year) {
        Ok(query) => run_query(fetcher, query),
        Err(e) => {
            tracker.enter(RunPhase::RejectedInput);
            info!("rejected input: {}", e);
            RunOutcome::Rejected(e)
        }
    }
}
