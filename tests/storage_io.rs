use macro_viz::models::Observation;
use macro_viz::storage;
use std::fs;
use tempfile::tempdir;

fn sample(n: usize) -> Vec<Observation> {
    (0..n)
        .map(|i| Observation {
            iso3: "DEU".into(),
            country: "Germany".into(),
            indicator: "SP.POP.TOTL".into(),
            year: 2000 + i as i32,
            value: Some(100.0 + i as f64),
        })
        .collect()
}

#[test]
fn save_csv_writes_header_and_rows() {
    let rows = sample(3);
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.csv");

    storage::save_csv(&rows, &path).unwrap();
    let txt = fs::read_to_string(&path).unwrap();
    assert!(txt.starts_with("iso3,country,indicator,year,value\n"));
    assert_eq!(txt.lines().count(), 1 + rows.len());

    let mut rdr = csv::Reader::from_path(&path).unwrap();
    let first = rdr.records().next().unwrap().unwrap();
    assert_eq!(&first[0], "DEU");
    assert_eq!(&first[3], "2000");
    assert_eq!(first[4].parse::<f64>().unwrap(), 100.0);
}

#[test]
fn save_csv_reports_missing_directory() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing").join("out.csv");
    let err = storage::save_csv(&sample(1), &path).unwrap_err();
    assert!(err.to_string().contains("out.csv"));
}

#[test]
fn country_names_with_commas_are_quoted() {
    let rows = vec![Observation {
        iso3: "KOR".into(),
        country: "Korea, Rep.".into(),
        indicator: "SP.POP.TOTL".into(),
        year: 2020,
        value: Some(51_800_000.0),
    }];
    let txt = storage::to_csv_string(&rows).unwrap();
    assert!(txt.contains("KOR,\"Korea, Rep.\",SP.POP.TOTL,2020,"));
}

//test that the CSV export won't include executable formulas
//a cell starting with = + - @ is evaluated by spreadsheet applications,
//so text cells get a leading single quote
#[test]
fn csv_cells_are_prefixed_to_avoid_formulas() {
    let rows = vec![Observation {
        iso3: "DEU".into(),
        country: "=HYPERLINK(\"http://evil\")".into(),
        indicator: "@foo".into(),
        year: 2020,
        value: Some(-1.5),
    }];
    let txt = storage::to_csv_string(&rows).unwrap();
    let mut rdr = csv::Reader::from_reader(txt.as_bytes());
    let row = rdr.records().next().unwrap().unwrap();

    assert!(row[1].starts_with('\''), "country not prefixed: {}", &row[1]);
    assert!(row[1].contains("=HYPERLINK"));
    assert_eq!(&row[2], "'@foo");
    // Numeric cells are left alone.
    assert_eq!(&row[4], "-1.5");
}
