//! Parsing and validation of the dashboard inputs.

use crate::error::QueryError;
use crate::indicators::Indicator;
use crate::models::SeriesKey;

/// Upper bound on the number of countries in one run.
pub const MAX_COUNTRIES: usize = 15;
/// Inclusive bounds of the year selector.
pub const MIN_YEAR: i32 = 1960;
pub const MAX_YEAR: i32 = 2026;

pub const DEFAULT_COUNTRIES: &str = "DEU,BRA";
pub const DEFAULT_YEARS: YearRange = YearRange { start: 2000, end: 2024 };

/// Closed year interval, passed verbatim to the API as `start:end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Result<Self, QueryError> {
        for year in [start, end] {
            if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
                return Err(QueryError::YearOutOfBounds {
                    year,
                    min: MIN_YEAR,
                    max: MAX_YEAR,
                });
            }
        }
        if start > end {
            return Err(QueryError::ReversedYears { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn to_query_param(&self) -> String {
        format!("{}:{}", self.start, self.end)
    }
}

/// A validated query: ready to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub countries: Vec<String>,
    pub indicator: &'static Indicator,
    pub years: YearRange,
}

impl Query {
    /// Validate raw inputs. Country count is checked after normalization, so
    /// `"deu, DEU"` counts as one country.
    pub fn new(
        countries_text: &str,
        indicator: &'static Indicator,
        years: YearRange,
    ) -> Result<Self, QueryError> {
        let countries = parse_countries(countries_text);
        if countries.is_empty() {
            return Err(QueryError::NoCountries);
        }
        if countries.len() > MAX_COUNTRIES {
            return Err(QueryError::TooManyCountries {
                count: countries.len(),
                max: MAX_COUNTRIES,
            });
        }
        Ok(Self {
            countries,
            indicator,
            years,
        })
    }

    /// One fetch key per country, in the order the countries were supplied.
    pub fn series_keys(&self) -> impl Iterator<Item = SeriesKey> + '_ {
        self.countries.iter().map(|iso3| SeriesKey {
            iso3: iso3.clone(),
            indicator: self.indicator.code.to_string(),
            start: self.years.start,
            end: self.years.end,
        })
    }
}

/// Split a comma-separated list into trimmed, uppercased codes.
/// Empty tokens are dropped and repeats collapse onto their first occurrence.
pub fn parse_countries(s: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for code in s.split(',').map(|x| x.trim().to_uppercase()) {
        if !code.is_empty() && !out.contains(&code) {
            out.push(code);
        }
    }
    out
}
