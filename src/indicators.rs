//! The fixed set of indicators the dashboard offers.

use crate::error::QueryError;

/// A named indicator and its World Bank series code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Indicator {
    pub name: &'static str,
    pub code: &'static str,
}

/// Display order is the order of the selector; the first entry is the default.
pub static INDICATORS: [Indicator; 8] = [
    Indicator { name: "GDP (current US$)", code: "NY.GDP.MKTP.CD" },
    Indicator { name: "GDP per capita (current US$)", code: "NY.GDP.PCAP.CD" },
    Indicator { name: "Population", code: "SP.POP.TOTL" },
    Indicator { name: "Inflation, consumer prices (annual %)", code: "FP.CPI.TOTL.ZG" },
    Indicator { name: "Unemployment, total (% of labor force)", code: "SL.UEM.TOTL.ZS" },
    Indicator { name: "CO₂ emissions (kt)", code: "EN.ATM.CO2E.KT" },
    Indicator { name: "Exports of goods & services (% of GDP)", code: "NE.EXP.GNFS.ZS" },
    Indicator { name: "Imports of goods & services (% of GDP)", code: "NE.IMP.GNFS.ZS" },
];

impl Indicator {
    /// Look up by display name or by service code, ignoring ASCII case.
    pub fn lookup(s: &str) -> Result<&'static Indicator, QueryError> {
        let needle = s.trim();
        INDICATORS
            .iter()
            .find(|i| i.name.eq_ignore_ascii_case(needle) || i.code.eq_ignore_ascii_case(needle))
            .ok_or_else(|| QueryError::UnknownIndicator(needle.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name_or_code() {
        assert_eq!(Indicator::lookup("population").unwrap().code, "SP.POP.TOTL");
        assert_eq!(Indicator::lookup(" ny.gdp.pcap.cd ").unwrap().name, "GDP per capita (current US$)");
        assert!(matches!(
            Indicator::lookup("GDP growth"),
            Err(QueryError::UnknownIndicator(s)) if s == "GDP growth"
        ));
    }

    #[test]
    fn codes_are_unique() {
        let mut codes: Vec<_> = INDICATORS.iter().map(|i| i.code).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), INDICATORS.len());
    }
}
