use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

fn sample_gpx() -> &'static str {
    include_str!("../samples/activity.gpx")
}

#[test]
fn test_stats_command_reports_trip_figures() {
    let dir = tempfile::tempdir().unwrap();
    let gpx_path = dir.path().join("activity.gpx");
    std::fs::write(&gpx_path, sample_gpx()).unwrap();

    let mut cmd = cargo_bin_cmd!("fittrack");
    cmd.arg("stats")
        .arg(&gpx_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Track length: 0.83 km"))
        .stdout(predicate::str::contains("Moving time: 0 Hours 02 Minutes"))
        .stdout(predicate::str::contains("Maximum speed: 20.0 km/h"))
        .stdout(predicate::str::contains("Number of GPS points: 20"))
        .stdout(predicate::str::contains(
            "Minimum altitude: 320.0 m Maximum altitude: 395.0 m",
        ));
}

#[test]
fn test_stats_command_threshold_reclassifies_the_whole_track() {
    let dir = tempfile::tempdir().unwrap();
    let gpx_path = dir.path().join("activity.gpx");
    std::fs::write(&gpx_path, sample_gpx()).unwrap();

    // absurd threshold: every segment counts as stopped
    let mut cmd = cargo_bin_cmd!("fittrack");
    cmd.arg("stats")
        .arg(&gpx_path)
        .arg("--stopped-speed-threshold")
        .arg("1000")
        .assert()
        .success()
        .stdout(predicate::str::contains("Track length: 0.00 km"))
        .stdout(predicate::str::contains("Moving time: 0 Hours 00 Minutes"))
        .stdout(predicate::str::contains("Pause time: 0 Hours 03 Minutes"));
}

#[test]
fn test_stats_command_without_timestamps_fails() {
    let gpx_no_time = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx creator="test" version="1.1" xmlns="http://www.topografix.com/GPX/1/1">
  <trk>
    <trkseg>
      <trkpt lat="50.9180" lon="14.0805"><ele>320.0</ele></trkpt>
      <trkpt lat="50.9185" lon="14.0805"><ele>325.0</ele></trkpt>
    </trkseg>
  </trk>
</gpx>"#;

    let dir = tempfile::tempdir().unwrap();
    let gpx_path = dir.path().join("no-time.gpx");
    std::fs::write(&gpx_path, gpx_no_time).unwrap();

    let mut cmd = cargo_bin_cmd!("fittrack");
    cmd.arg("stats")
        .arg(&gpx_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("timestamped"));
}

#[test]
fn test_stats_command_missing_file_fails() {
    let mut cmd = cargo_bin_cmd!("fittrack");
    cmd.arg("stats")
        .arg("does-not-exist.gpx")
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.gpx"));
}

#[test]
fn test_convert_command_rejects_non_fit_input() {
    let dir = tempfile::tempdir().unwrap();
    let fit_path = dir.path().join("broken.fit");
    std::fs::write(&fit_path, b"certainly not a FIT container").unwrap();

    let mut cmd = cargo_bin_cmd!("fittrack");
    cmd.arg("convert")
        .arg(&fit_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("FIT"));
}

#[test]
fn test_convert_command_missing_file_fails() {
    let mut cmd = cargo_bin_cmd!("fittrack");
    cmd.arg("convert")
        .arg("does-not-exist.fit")
        .assert()
        .failure()
        .stderr(predicate::str::contains("does-not-exist.fit"));
}

#[test]
fn test_convert_directory_without_fit_files_succeeds() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = cargo_bin_cmd!("fittrack");
    cmd.arg("convert")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 0 FIT files"));
}

#[test]
fn test_convert_directory_rejects_explicit_output() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = cargo_bin_cmd!("fittrack");
    cmd.arg("convert")
        .arg(dir.path())
        .arg("--output")
        .arg("out.gpx")
        .assert()
        .failure()
        .stderr(predicate::str::contains("single-file"));
}

#[test]
fn test_map_google_without_key_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let fit_path = dir.path().join("tour.fit");
    std::fs::write(&fit_path, b"junk").unwrap();

    let mut cmd = cargo_bin_cmd!("fittrack");
    cmd.arg("map-google")
        .arg(&fit_path)
        .arg("--api-key-file")
        .arg(dir.path().join("missing-key.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing-key.json"));
}

#[test]
fn test_map_osm_rejects_unknown_color() {
    let dir = tempfile::tempdir().unwrap();
    let fit_path = dir.path().join("tour.fit");
    std::fs::write(&fit_path, b"junk").unwrap();

    let mut cmd = cargo_bin_cmd!("fittrack");
    cmd.arg("map-osm")
        .arg(&fit_path)
        .arg("--color")
        .arg("sparkly")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported color"));
}
