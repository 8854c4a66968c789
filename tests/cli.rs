use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

// Nothing listens here; every request fails fast with a connection error.
const DEAD_API: &str = "http://127.0.0.1:9/v2";

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("macro-viz").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("macro-viz"));
}

#[test]
fn lists_the_eight_indicators() {
    let mut cmd = Command::cargo_bin("macro-viz").unwrap();
    cmd.arg("indicators");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("SP.POP.TOTL"))
        .stdout(predicate::str::contains("NE.IMP.GNFS.ZS"))
        .stdout(predicate::function(|s: &str| s.lines().count() == 8));
}

#[test]
fn empty_country_list_is_rejected() {
    let mut cmd = Command::cargo_bin("macro-viz").unwrap();
    cmd.args(["load", "--countries", " , ", "--base-url", DEAD_API]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("at least one ISO3 country code"))
        .stderr(predicate::str::contains("warning:").not());
}

#[test]
fn unknown_indicator_is_rejected() {
    let mut cmd = Command::cargo_bin("macro-viz").unwrap();
    cmd.args(["load", "--indicator", "GDP growth", "--base-url", DEAD_API]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unknown indicator"));
}

#[test]
fn unreachable_service_warns_per_country_then_reports_no_data() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("macro-viz").unwrap();
    cmd.args(["load", "--countries", "DEU,BRA", "--base-url", DEAD_API, "--out-dir"])
        .arg(dir.path());
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("warning: DEU: failed to fetch"))
        .stderr(predicate::str::contains("warning: BRA: failed to fetch"))
        .stderr(predicate::str::contains("No data returned"));
    // Nothing is exported for an empty result.
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

// Live test (opt-in): cargo test --features online
#[cfg(feature = "online")]
#[test]
fn load_online_population() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("macro-viz").unwrap();
    cmd.args([
        "load",
        "--countries",
        "DEU,BRA",
        "--indicator",
        "Population",
        "--from",
        "2000",
        "--to",
        "2005",
        "--out-dir",
    ])
    .arg(dir.path());
    cmd.assert().success().stdout(predicate::str::contains("Germany"));
    assert!(dir.path().join("macro_viz_SP.POP.TOTL_2000_2005.csv").exists());
}
