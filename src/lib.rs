//! macro_viz
//!
//! A small World Bank indicator dashboard: pick countries, one indicator and a
//! year range, then get a line chart, the raw table and a CSV export. Pairs
//! with the `macro-viz-gui` window and the headless `macro-viz` binary.
//!
//! ### Features
//! - One request per country, fetched in order; failures become warnings
//! - Explicit in-memory memoization of repeated requests
//! - CSV export with a stable column order
//! - SVG/PNG line charts, or an RGB buffer for on-screen display
//!
//! ### Example
//! ```no_run
//! use macro_viz::{CachedFetcher, Client, Indicator, pipeline};
//!
//! let fetcher = CachedFetcher::new(Client::new()?);
//! let population = Indicator::lookup("Population")?;
//! match pipeline::run(&fetcher, "DEU,BRA", population, 2000, 2020) {
//!     pipeline::RunOutcome::Rendered(ds) => {
//!         macro_viz::storage::save_csv(&ds.table, ds.export_file_name())?;
//!         macro_viz::viz::plot_lines(&ds.table, "pop.svg", 1000, 600, population.name)?;
//!     }
//!     other => eprintln!("{:?}", other),
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod api;
pub mod cache;
pub mod error;
pub mod indicators;
pub mod models;
pub mod pipeline;
pub mod query;
pub mod storage;
pub mod viz;

pub use api::{Client, Fetch};
pub use cache::CachedFetcher;
pub use error::{FetchError, QueryError};
pub use indicators::{INDICATORS, Indicator};
pub use models::{Observation, SeriesKey};
pub use query::{Query, YearRange};
