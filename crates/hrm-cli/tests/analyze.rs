use assert_cmd::cargo::cargo_bin_cmd;
use hrm_lib::Metrics;
use std::{error::Error, fs, path::Path, path::PathBuf};

/// 60 Hz, five seconds, one narrow Gaussian pulse per second peaking 27
/// samples into each period.
fn write_pulse_csv(path: &Path, with_junk_row: bool) {
    let mut rows = String::new();
    for i in 0..300 {
        if with_junk_row && i == 150 {
            rows.push_str("one-fifty,not-a-voltage\n");
        }
        let t = i as f64 / 60.0;
        let mut v = 0.0;
        for k in 0..5 {
            let d = (i as f64 - (27.0 + 60.0 * k as f64)) / 2.5;
            v += (-0.5 * d * d).exp();
        }
        rows.push_str(&format!("{},{}\n", t, v));
    }
    fs::write(path, rows).expect("write synthetic recording");
}

fn run_analyze(input: &Path, extra: &[&str]) -> Vec<u8> {
    let mut cmd = cargo_bin_cmd!("hrm");
    cmd.arg("analyze").arg("--input").arg(input).args(extra);
    cmd.assert().success().get_output().stdout.clone()
}

#[test]
fn analyze_reports_metrics_record() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("pulse.csv");
    write_pulse_csv(&input, false);

    let metrics: Metrics = serde_json::from_slice(&run_analyze(&input, &[]))?;
    assert_eq!(metrics.num_beats, 5);
    let expected: Vec<f64> = [27.0, 87.0, 147.0, 207.0, 267.0]
        .iter()
        .map(|i| i / 60.0)
        .collect();
    assert_eq!(metrics.beats, expected);
    assert!(metrics.mean_hr_bpm > 55.0 && metrics.mean_hr_bpm < 65.0);
    assert!((metrics.duration - 299.0 / 60.0).abs() < 1e-9);
    assert!(metrics.voltage_extremes[0] >= 0.0 && metrics.voltage_extremes[0] < 0.01);
    assert!((metrics.voltage_extremes[1] - 1.0).abs() < 0.05);
    Ok(())
}

#[test]
fn malformed_row_does_not_change_the_result() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let clean = dir.path().join("clean.csv");
    let noisy = dir.path().join("noisy.csv");
    write_pulse_csv(&clean, false);
    write_pulse_csv(&noisy, true);

    assert_eq!(run_analyze(&clean, &[]), run_analyze(&noisy, &[]));
    Ok(())
}

#[test]
fn repeated_runs_are_identical() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("pulse.csv");
    write_pulse_csv(&input, false);

    assert_eq!(run_analyze(&input, &[]), run_analyze(&input, &[]));
    Ok(())
}

#[test]
fn correlation_strategy_matches_threshold_here() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("pulse.csv");
    write_pulse_csv(&input, false);

    let threshold: Metrics = serde_json::from_slice(&run_analyze(&input, &[]))?;
    let correlation: Metrics =
        serde_json::from_slice(&run_analyze(&input, &["--strategy", "correlation"]))?;
    assert_eq!(threshold.beats, correlation.beats);
    Ok(())
}

#[test]
fn out_flag_writes_the_record_to_a_file() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("pulse.csv");
    let out = dir.path().join("pulse.json");
    write_pulse_csv(&input, false);

    let stdout = run_analyze(&input, &["--out", out.to_str().expect("utf8 path")]);
    assert!(stdout.is_empty());
    let metrics: Metrics = serde_json::from_str(&fs::read_to_string(&out)?)?;
    assert_eq!(metrics.num_beats, 5);
    Ok(())
}

#[test]
fn find_beats_reports_indices_and_times() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("pulse.csv");
    write_pulse_csv(&input, false);

    let mut cmd = cargo_bin_cmd!("hrm");
    cmd.args(["find-beats", "--input"]).arg(&input);
    let stdout = cmd.assert().success().get_output().stdout.clone();
    let value: serde_json::Value = serde_json::from_slice(&stdout)?;
    assert_eq!(value["indices"], serde_json::json!([27, 87, 147, 207, 267]));
    assert_eq!(value["times"][0], serde_json::json!(0.45));
    Ok(())
}

#[test]
fn missing_input_fails_with_a_message() {
    let mut cmd = cargo_bin_cmd!("hrm");
    cmd.args(["analyze", "--input", "no_such_recording.csv"]);
    cmd.assert().failure();
}

#[test]
fn non_csv_input_is_rejected() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("recording.txt");
    fs::write(&input, "0,0.1\n0.01,0.2\n")?;

    let mut cmd = cargo_bin_cmd!("hrm");
    cmd.arg("analyze").arg("--input").arg(&input);
    let stderr = cmd.assert().failure().get_output().stderr.clone();
    assert!(String::from_utf8_lossy(&stderr).contains("expected a .csv recording"));
    Ok(())
}

#[test]
fn too_short_recording_is_rejected() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("tiny.csv");
    let fixture: PathBuf = workspace_root().join("test_data/ecg_short.csv");
    let rows: String = fs::read_to_string(fixture)?
        .lines()
        .take(5)
        .map(|l| format!("{}\n", l))
        .collect();
    fs::write(&input, rows)?;

    let mut cmd = cargo_bin_cmd!("hrm");
    cmd.arg("analyze").arg("--input").arg(&input);
    let stderr = cmd.assert().failure().get_output().stderr.clone();
    assert!(String::from_utf8_lossy(&stderr).contains("recording too short"));
    Ok(())
}

fn workspace_root() -> PathBuf {
    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
        .to_path_buf()
}
