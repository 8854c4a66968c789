//! Memoization of per-country fetches.
//!
//! [`CachedFetcher`] wraps any [`Fetch`] and answers repeated [`SeriesKey`]s
//! from memory. Entries never expire; an optional capacity evicts the oldest
//! insertion first. Failures are not stored, so a country that failed once is
//! asked for again on the next run.

use crate::api::Fetch;
use crate::error::FetchError;
use crate::models::{Observation, SeriesKey};
use log::debug;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct State {
    entries: HashMap<SeriesKey, Vec<Observation>>,
    order: VecDeque<SeriesKey>,
    hits: u64,
    misses: u64,
}

/// Hit/miss counters plus the current entry count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

#[derive(Debug)]
pub struct CachedFetcher<F> {
    inner: F,
    capacity: Option<usize>,
    state: Mutex<State>,
}

impl<F: Fetch> CachedFetcher<F> {
    /// Unbounded cache: lives as long as the owner.
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            capacity: None,
            state: Mutex::new(State::default()),
        }
    }

    /// Bounded cache holding at most `capacity` series (minimum 1).
    pub fn with_capacity(inner: F, capacity: usize) -> Self {
        Self {
            capacity: Some(capacity.max(1)),
            ..Self::new(inner)
        }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    pub fn stats(&self) -> CacheStats {
        let st = self.lock();
        CacheStats {
            hits: st.hits,
            misses: st.misses,
            entries: st.entries.len(),
        }
    }

    // Poisoning is ignored; `State` stays consistent across a panicking reader.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<F: Fetch> Fetch for CachedFetcher<F> {
    fn fetch_series(&self, key: &SeriesKey) -> Result<Vec<Observation>, FetchError> {
        {
            let mut st = self.lock();
            if let Some(rows) = st.entries.get(key).cloned() {
                st.hits += 1;
                debug!("cache hit {:?}", key);
                return Ok(rows);
            }
            st.misses += 1;
        }

        // Lock released during the request.
        let rows = self.inner.fetch_series(key)?;

        let mut st = self.lock();
        if !st.entries.contains_key(key) {
            if let Some(cap) = self.capacity {
                while st.entries.len() >= cap {
                    let Some(oldest) = st.order.pop_front() else {
                        break;
                    };
                    st.entries.remove(&oldest);
                    debug!("cache evict {:?}", oldest);
                }
            }
            st.order.push_back(key.clone());
        }
        st.entries.insert(key.clone(), rows.clone());
        Ok(rows)
    }
}
