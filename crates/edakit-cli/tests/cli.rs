use std::{
    path::PathBuf,
    process::{Command, Output},
    time::{SystemTime, UNIX_EPOCH},
};

fn bin_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_edakit"))
}

fn fixture_path(name: &str) -> String {
    // crates/edakit-cli -> workspace root
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../tests/fixtures")
        .join(name)
        .to_string_lossy()
        .into_owned()
}

fn tmp_path(filename: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!(
        "edakit_cli_{}_{nanos}_{filename}",
        std::process::id()
    ))
}

fn run(args: &[&str]) -> Output {
    Command::new(bin_path())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("failed to run {:?} {args:?}: {e}", bin_path()))
}

fn run_ok(args: &[&str]) -> String {
    let out = run(args);
    assert!(
        out.status.success(),
        "{args:?} should succeed, stderr={}",
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8(out.stdout).unwrap()
}

fn run_json(args: &[&str]) -> serde_json::Value {
    let mut args = args.to_vec();
    args.extend(["--format", "json"]);
    let stdout = run_ok(&args);
    serde_json::from_str(&stdout).unwrap_or_else(|e| panic!("invalid JSON ({e}): {stdout}"))
}

fn run_err(args: &[&str]) -> String {
    let out = run(args);
    assert!(!out.status.success(), "{args:?} should fail");
    String::from_utf8(out.stderr).unwrap()
}

#[test]
fn gof_prints_summary() {
    let credit = fixture_path("credit.csv");
    let stdout = run_ok(&["gof", &credit, "--column", "Region"]);
    assert!(
        stdout.contains("X\u{b2}(4, N=164)=1.55, p>0.05"),
        "unexpected stdout: {stdout}"
    );
    assert!(stdout.contains("not rejected"), "unexpected stdout: {stdout}");
    for region in ["East", "North", "South", "Upper", "West"] {
        assert!(stdout.contains(region), "missing {region}: {stdout}");
    }
}

#[test]
fn gof_json_contract() {
    let credit = fixture_path("credit.csv");
    let v = run_json(&["gof", &credit, "--column", "Region"]);

    let result = &v["result"];
    assert_eq!(result["dof"].as_u64(), Some(4));
    assert_eq!(result["n"].as_u64(), Some(164));
    let statistic = result["statistic"].as_f64().unwrap();
    assert!((statistic - 1.548_780_5).abs() < 1e-6);
    let p_value = result["p_value"].as_f64().unwrap();
    assert!(p_value > 0.05 && p_value < 1.0);
    assert_eq!(result["reject"].as_bool(), Some(false));

    let rows = v["frequencies"]["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0]["category"], "East");
    assert_eq!(rows[0]["observed"].as_u64(), Some(32));
}

#[test]
fn gof_with_proportions() {
    let credit = fixture_path("credit.csv");
    let v = run_json(&[
        "gof",
        &credit,
        "--column",
        "Student",
        "--expected-proportions",
        "No=0.9,Yes=0.1",
    ]);
    let rows = v["frequencies"]["rows"].as_array().unwrap();
    let expected = rows
        .iter()
        .map(|row| row["expected"].as_f64().unwrap())
        .collect::<Vec<_>>();
    assert!((expected[0] - 146.7).abs() < 1e-9);
    assert!((expected[1] - 16.3).abs() < 1e-9);
}

#[test]
fn gof_unknown_category_in_model() {
    let credit = fixture_path("credit.csv");
    let stderr = run_err(&[
        "gof",
        &credit,
        "--column",
        "Region",
        "--expected-proportions",
        "East=1,North=1,South=1,Upper=1",
    ]);
    assert!(stderr.contains("West"), "unexpected stderr: {stderr}");
}

#[test]
fn null_model_flags_conflict() {
    let credit = fixture_path("credit.csv");
    let stderr = run_err(&[
        "gof",
        &credit,
        "--column",
        "Gender",
        "--expected-proportions",
        "Female=1,Male=1",
        "--expected-counts",
        "Female=82,Male=82",
    ]);
    assert!(stderr.contains("cannot be used with"), "unexpected stderr: {stderr}");
}

#[test]
fn gof_numeric_column_fails() {
    let credit = fixture_path("credit.csv");
    let stderr = run_err(&["gof", &credit, "--column", "Income"]);
    assert!(stderr.contains("numeric"), "unexpected stderr: {stderr}");
}

#[test]
fn missing_file_fails() {
    let stderr = run_err(&["info", "does/not/exist.csv"]);
    assert!(stderr.contains("Failed to load table"), "unexpected stderr: {stderr}");
    assert!(stderr.contains("cannot read"), "unexpected stderr: {stderr}");
}

#[test]
fn frequency_counts_missing_as_category() {
    let credit = fixture_path("credit.csv");
    let v = run_json(&[
        "frequency",
        &credit,
        "--column",
        "Student",
        "--missing-as",
        "Unknown",
    ]);
    assert_eq!(v["total"].as_u64(), Some(164));
    let categories = v["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["category"].as_str().unwrap().to_owned())
        .collect::<Vec<_>>();
    assert_eq!(categories, ["No", "Unknown", "Yes"]);
}

#[test]
fn missing_as_existing_category_fails() {
    let credit = fixture_path("credit.csv");
    let stderr = run_err(&[
        "frequency",
        &credit,
        "--column",
        "Student",
        "--missing-as",
        "No",
    ]);
    assert!(
        stderr.contains("'No' is already an observed category"),
        "unexpected stderr: {stderr}"
    );
}

#[test]
fn info_reports_shape() {
    let credit = fixture_path("credit.csv");
    let v = run_json(&["info", &credit]);
    assert_eq!(v["overview"]["rows"].as_u64(), Some(164));
    assert_eq!(v["overview"]["variables"].as_u64(), Some(8));
    let columns = v["columns"].as_array().unwrap();
    assert_eq!(columns.len(), 8);
    assert_eq!(columns[0]["name"], "Income");
    assert_eq!(columns[0]["kind"], "numeric");
    assert_eq!(columns[7]["kind"], "categorical");
}

#[test]
fn describe_all_columns() {
    let credit = fixture_path("credit.csv");
    let stdout = run_ok(&["describe", &credit]);
    assert!(stdout.contains("Numeric columns"), "unexpected stdout: {stdout}");
    assert!(stdout.contains("Categorical columns"), "unexpected stdout: {stdout}");
    assert!(stdout.contains("Region"), "unexpected stdout: {stdout}");
}

#[test]
fn fit_with_ks() {
    let credit = fixture_path("credit.csv");
    let v = run_json(&["fit", &credit, "--column", "Income", "--ks"]);
    assert_eq!(v["column"], "Income");
    assert_eq!(v["method"], "moments");
    assert_eq!(v["n"].as_u64(), Some(164));
    assert!(v["df"].as_f64().unwrap() > 0.0);
    assert!(v["scale"].as_f64().unwrap() > 0.0);
    let p_value = v["ks"]["p_value"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&p_value));
}

#[test]
fn sample_is_reproducible() {
    let credit = fixture_path("credit.csv");
    let args = [
        "sample", &credit, "--column", "Income", "--count", "5", "--seed", "7",
    ];
    let first = run_json(&args);
    let second = run_json(&args);
    assert_eq!(first["values"].as_array().unwrap().len(), 5);
    assert_eq!(first["values"], second["values"]);
}

#[test]
fn output_to_file() {
    let credit = fixture_path("credit.csv");
    let path = tmp_path("gof.json");
    let path_str = path.to_string_lossy().into_owned();
    let stdout = run_ok(&[
        "gof",
        &credit,
        "--column",
        "Region",
        "--format",
        "json",
        "--output",
        &path_str,
    ]);
    assert!(stdout.is_empty());

    let content = std::fs::read_to_string(&path).unwrap();
    let v: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(v["column"], "Region");
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn output_to_missing_directory_fails() {
    let credit = fixture_path("credit.csv");
    let path = tmp_path("no_such_dir").join("report.txt");
    let stderr = run_err(&["info", &credit, "--output", &path.to_string_lossy()]);
    assert!(
        stderr.contains("Failed to create output file"),
        "unexpected stderr: {stderr}"
    );
}

#[test]
fn info_logs_to_stderr() {
    let credit = fixture_path("credit.csv");
    let out = run(&["info", &credit, "--log-level", "info"]);
    assert!(out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("table loaded"), "unexpected stderr: {stderr}");
}
