use crate::models::Observation;
use crate::query::YearRange;
use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::borrow::Cow;
use std::io::Write;
use std::path::Path;

pub const CSV_HEADER: [&str; 5] = ["iso3", "country", "indicator", "year", "value"];

/// Download name: `macro_viz_{code}_{start}_{end}.csv`.
pub fn export_file_name(indicator_code: &str, years: YearRange) -> String {
    format!(
        "macro_viz_{}_{}_{}.csv",
        indicator_code, years.start, years.end
    )
}

// Spreadsheet apps evaluate cells starting with these as formulas.
fn guard_cell(s: &str) -> Cow<'_, str> {
    if s.starts_with(['=', '+', '-', '@']) {
        Cow::Owned(format!("'{}", s))
    } else {
        Cow::Borrowed(s)
    }
}

/// Write observations as CSV with header. A missing value is an empty cell.
pub fn write_csv<W: Write>(points: &[Observation], out: W) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_writer(out);
    wtr.write_record(CSV_HEADER)?;
    for p in points {
        wtr.serialize((
            guard_cell(&p.iso3),
            guard_cell(&p.country),
            guard_cell(&p.indicator),
            p.year,
            p.value,
        ))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn to_csv_string(points: &[Observation]) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(points, &mut buf)?;
    String::from_utf8(buf).context("csv output is not utf-8")
}

/// Save observations as CSV with header.
pub fn save_csv<P: AsRef<Path>>(points: &[Observation], path: P) -> Result<()> {
    let path = path.as_ref();
    let f = std::fs::File::create(path)
        .with_context(|| format!("create {}", path.display()))?;
    write_csv(points, f)
}
