use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One row of the working table: a (country, indicator, year) data point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Observation {
    /// Uppercase code as supplied by the caller.
    pub iso3: String,
    /// Name reported by the service, or `iso3` when it reported none.
    pub country: String,
    pub indicator: String,
    pub year: i32,
    pub value: Option<f64>,
}

/// Identity of one per-country request; also the memoization key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeriesKey {
    pub iso3: String,
    pub indicator: String,
    pub start: i32,
    pub end: i32,
}

/// Metadata section returned by the API (position 0).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meta {
    pub page: u32,
    pub pages: u32,
    /// Some responses encode `per_page` as a string, others as a number.
    /// Accept both and normalize to `u32`.
    #[serde(deserialize_with = "de_u32_from_string_or_number")]
    pub per_page: u32,
    pub total: u32,
}

/// Serde helper: parse `u32` from either a JSON number or a string.
fn de_u32_from_string_or_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    struct U32Visitor;

    impl<'de> Visitor<'de> for U32Visitor {
        type Value = u32;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a string or integer representing a non-negative number")
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            u32::try_from(v).map_err(E::custom)
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            u32::try_from(v).map_err(|_| E::custom("negative value for u32"))
        }

        fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            s.trim().parse::<u32>().map_err(E::custom)
        }
    }

    deserializer.deserialize_any(U32Visitor)
}

/// `{ "id": ..., "value": ... }` pair used for `country` and `indicator`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodeName {
    pub id: Option<String>,
    pub value: Option<String>,
}

/// Raw entry from the API (position 1 array). Every field is optional; the
/// service omits or nulls them freely.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Entry {
    pub indicator: Option<CodeName>,
    pub country: Option<CodeName>,
    pub date: Option<Value>,
    pub value: Option<Value>,
}

impl Entry {
    /// Calendar year, if `date` is present and parses as an integer.
    pub fn year(&self) -> Option<i32> {
        match self.date.as_ref()? {
            Value::String(s) => s.trim().parse().ok(),
            Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
            _ => None,
        }
    }

    /// Numeric value; numeric strings are accepted, anything else is missing.
    pub fn numeric_value(&self) -> Option<f64> {
        match self.value.as_ref()? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Convert into an [`Observation`] for the requested series, or `None`
    /// when the entry carries no usable year.
    pub fn into_observation(self, iso3: &str, indicator: &str) -> Option<Observation> {
        let year = self.year()?;
        let value = self.numeric_value();
        Some(Observation {
            iso3: iso3.to_string(),
            country: self
                .country
                .and_then(|c| c.value)
                .unwrap_or_else(|| iso3.to_string()),
            indicator: self
                .indicator
                .and_then(|i| i.id)
                .unwrap_or_else(|| indicator.to_string()),
            year,
            value,
        })
    }
}
