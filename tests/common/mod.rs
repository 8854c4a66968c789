#![allow(dead_code)]

use macro_viz::api::{self, Fetch};
use macro_viz::models::{Observation, SeriesKey};
use macro_viz::FetchError;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Mutex;

/// What the fake service answers for one country.
pub enum Reply {
    Payload(Value),
    Status(u16),
}

/// In-memory stand-in for the World Bank API. Records every request.
#[derive(Default)]
pub struct FakeService {
    replies: HashMap<String, Reply>,
    pub calls: Mutex<Vec<SeriesKey>>,
}

impl FakeService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, iso3: &str, reply: Reply) -> Self {
        self.replies.insert(iso3.to_string(), reply);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn called_countries(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|k| k.iso3.clone()).collect()
    }
}

impl Fetch for FakeService {
    fn fetch_series(&self, key: &SeriesKey) -> Result<Vec<Observation>, FetchError> {
        self.calls.lock().unwrap().push(key.clone());
        match self.replies.get(&key.iso3) {
            Some(Reply::Payload(v)) => api::normalize(&key.iso3, &key.indicator, v),
            Some(Reply::Status(code)) => Err(FetchError::Status { status: *code }),
            None => Err(FetchError::Status { status: 404 }),
        }
    }
}

/// A `[meta, entries]` payload with one entry per `(year, value)`, newest
/// first as the live API orders them.
pub fn payload(iso3: &str, country: &str, indicator: &str, rows: &[(i32, Option<f64>)]) -> Value {
    let mut entries: Vec<Value> = rows
        .iter()
        .map(|(year, value)| {
            json!({
                "indicator": {"id": indicator, "value": "Population, total"},
                "country": {"id": &iso3[..2], "value": country},
                "countryiso3code": iso3,
                "date": year.to_string(),
                "value": value,
                "unit": "",
                "obs_status": "",
                "decimal": 0
            })
        })
        .collect();
    entries.reverse();
    json!([
        {"page": 1, "pages": 1, "per_page": 2000, "total": entries.len(), "sourceid": "2"},
        entries
    ])
}

/// `[meta, null]`: the service knows the series but has no observations.
pub fn no_data() -> Value {
    json!([{"page": 0, "pages": 0, "per_page": "2000", "total": 0}, null])
}

pub fn years(range: std::ops::RangeInclusive<i32>, base: f64) -> Vec<(i32, Option<f64>)> {
    range.map(|y| (y, Some(base + y as f64))).collect()
}
