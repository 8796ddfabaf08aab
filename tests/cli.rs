use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("imf").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("imf"))
        .stdout(predicate::str::contains("dots"));
}

#[test]
fn invalid_query_fails_before_any_request() {
    // unroutable base URL: reaching the network would produce a remote error instead
    let mut cmd = Command::cargo_bin("imf").unwrap();
    cmd.args([
        "--base-url",
        "http://127.0.0.1:9/none",
        "dots",
        "--country",
        "US",
        "--counterparts",
        "CN,US",
        "--start",
        "2000",
        "--end",
        "2003",
    ]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid input"))
        .stderr(predicate::str::contains("country must not be in counterparts"));
}

#[test]
fn bad_frequency_is_a_usage_error() {
    let mut cmd = Command::cargo_bin("imf").unwrap();
    cmd.args([
        "dots", "--country", "US", "--counterparts", "CN", "--start", "2000", "--end", "2003",
        "--freq", "Q",
    ]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("frequency must be M or A"));
}

#[test]
fn unknown_subset_label_is_rejected() {
    let mut cmd = Command::cargo_bin("imf").unwrap();
    cmd.args([
        "--base-url",
        "http://127.0.0.1:9/none",
        "dots",
        "--country",
        "US",
        "--counterparts",
        "CN",
        "--start",
        "2000",
        "--end",
        "2003",
        "--subset",
        "Exports,GDP",
    ]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown variable"));
}

// Live test (opt-in): cargo test --features online
#[cfg(feature = "online")]
#[test]
fn dots_online_greece() {
    let mut cmd = Command::cargo_bin("imf").unwrap();
    cmd.args([
        "dots",
        "--country",
        "GR",
        "--counterparts",
        "US,AU",
        "--start",
        "2015",
        "--end",
        "2018",
        "--stats",
    ]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Exports (US)"));
}
