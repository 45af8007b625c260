use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

fn repo_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("expected crates/<name> layout")
        .to_path_buf()
}

fn fixture(parts: &[&str]) -> String {
    let mut path = repo_root().join("fixtures");
    for p in parts {
        path = path.join(p);
    }
    assert!(path.exists(), "fixture missing: {}", path.display());
    path.to_string_lossy().into_owned()
}

fn sample() -> String {
    fixture(&["documents", "sample.json"])
}

fn kpitree() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo_bin!("kpitree"));
    cmd.current_dir(repo_root());
    cmd
}

fn run_json(args: &[&str]) -> Value {
    let output = kpitree().args(args).assert().success().get_output().clone();
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

fn node_ids(result: &Value) -> Vec<String> {
    result["nodes"]
        .as_array()
        .expect("nodes array")
        .iter()
        .map(|n| n["id"].as_str().unwrap_or_default().to_string())
        .collect()
}

fn position(result: &Value, id: &str) -> (f64, f64) {
    let node = result["nodes"]
        .as_array()
        .expect("nodes array")
        .iter()
        .find(|n| n["id"] == id)
        .unwrap_or_else(|| panic!("node {id} missing"));
    (
        node["position"]["x"].as_f64().expect("x"),
        node["position"]["y"].as_f64().expect("y"),
    )
}

#[test]
fn layout_defaults_to_hierarchical() {
    let result = run_json(&[&sample()]);
    assert_eq!(
        node_ids(&result),
        vec!["M1", "F1", "L1", "L2", "F2", "L3", "M2", "F4", "L5"]
    );
    assert_eq!(result["edges"].as_array().map(Vec::len), Some(7));
    assert_eq!(result["edges"][0]["id"], "e-M1-F1");
    assert_eq!(result["nodes"][0]["category"], "top-metric");
    assert_eq!(position(&result, "F2"), (40.0, 60.0));
}

#[test]
fn layout_command_name_is_optional() {
    let sample = sample();
    let implicit = run_json(&[&sample]);
    let explicit = run_json(&["layout", &sample]);
    assert_eq!(implicit, explicit);
}

#[test]
fn layout_radial_island() {
    let result = run_json(&["layout", "--mode", "radial", "--island", "M2", &sample()]);
    assert_eq!(node_ids(&result), vec!["M2", "F4", "L5"]);
    assert_eq!(position(&result, "M2"), (630.0, 396.0));
}

#[test]
fn layout_accepts_legacy_mode_names() {
    let sample = sample();
    let island = run_json(&["--mode", "island", &sample]);
    let radial = run_json(&["--mode", "radial", &sample]);
    assert_eq!(island, radial);
}

#[test]
fn layout_focus_filters_the_view() {
    let result = run_json(&["--focus", "L3", &sample()]);
    assert_eq!(node_ids(&result), vec!["M1", "F2", "L3"]);
    assert_eq!(result["edges"].as_array().map(Vec::len), Some(2));
}

#[test]
fn layout_manual_uses_staggered_defaults() {
    let result = run_json(&["--manual", &sample()]);
    assert_eq!(position(&result, "M1"), (100.0, 80.0));
    assert_eq!(position(&result, "L2"), (780.0, 170.0));
    assert_eq!(position(&result, "F2"), (40.0, 60.0));
}

#[test]
fn layout_reads_a_config_file() {
    let result = run_json(&[
        "--mode",
        "radial",
        "--config",
        &fixture(&["config", "wide_nodes.json"]),
        &sample(),
    ]);
    assert_eq!(position(&result, "M1"), (600.0, 396.0));
}

#[test]
fn layout_reads_legacy_documents() {
    let result = run_json(&["--mode", "radial", &fixture(&["documents", "legacy.json"])]);
    assert_eq!(
        node_ids(&result),
        vec!["kpi_margin", "drv_cost", "lev_automation", "lev_selfservice"]
    );
    assert_eq!(result["nodes"][0]["label"], "Operating margin");
}

#[test]
fn layout_reads_stdin() {
    let text = fs::read_to_string(sample()).expect("read fixture");
    let output = kpitree()
        .args(["--mode", "radial", "-"])
        .write_stdin(text)
        .assert()
        .success()
        .get_output()
        .clone();
    let result: Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(node_ids(&result).len(), 6);
}

#[test]
fn layout_writes_to_out_file() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let out = tmp.path().join("layout.json");
    kpitree()
        .args([
            "--pretty",
            "--out",
            out.to_string_lossy().as_ref(),
            sample().as_str(),
        ])
        .assert()
        .success()
        .stdout("");

    let text = fs::read_to_string(&out).expect("read output");
    assert!(text.contains("\n  \"nodes\""));
    let result: Value = serde_json::from_str(&text).expect("output is JSON");
    assert_eq!(node_ids(&result).len(), 9);
}

#[test]
fn duplicate_ids_fail_unless_lenient() {
    let doc = fixture(&["documents", "duplicate_ids.json"]);
    let output = kpitree().arg(&doc).assert().code(1).get_output().clone();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("duplicate id"), "stderr: {stderr}");

    kpitree().args(["--lenient", doc.as_str()]).assert().success();
}

#[test]
fn malformed_input_is_tolerated_with_lenient() {
    let result = {
        let output = kpitree()
            .args(["--lenient", "-"])
            .write_stdin(r#"{ "topMetrics": "nope" }"#)
            .assert()
            .success()
            .get_output()
            .clone();
        serde_json::from_slice::<Value>(&output.stdout).expect("stdout is JSON")
    };
    assert_eq!(result, serde_json::json!({ "nodes": [], "edges": [] }));

    kpitree()
        .args(["--lenient", "-"])
        .write_stdin("not json")
        .assert()
        .code(1);
}

#[test]
fn usage_errors_exit_with_two() {
    kpitree().args(["--mode", "spiral", sample().as_str()]).assert().code(2);
    kpitree().args(["--bogus"]).assert().code(2);
    kpitree().args(["select", sample().as_str()]).assert().code(2);
    kpitree().args(["a.json", "b.json"]).assert().code(2);
    kpitree().args(["--help"]).assert().code(2);
}

#[test]
fn missing_input_file_is_an_io_error() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let missing = tmp.path().join("missing.json");
    let output = kpitree()
        .arg(missing.to_string_lossy().as_ref())
        .assert()
        .code(1)
        .get_output()
        .clone();
    assert!(String::from_utf8_lossy(&output.stderr).contains("I/O error"));
}

#[test]
fn select_reports_the_keep_set() {
    let result = run_json(&["select", "--focus", "F1", &sample()]);
    assert_eq!(result["focus"], "F1");
    assert_eq!(result["role"], "factor");
    assert_eq!(result["nodes"], serde_json::json!(["M1", "F1", "L1", "L2"]));
    assert_eq!(result["edges"].as_array().map(Vec::len), Some(3));

    let unknown = run_json(&["select", "--focus", "nope", &sample()]);
    assert_eq!(unknown["role"], Value::Null);
    assert_eq!(unknown["nodes"].as_array().map(Vec::len), Some(9));
}

#[test]
fn select_on_a_lever_keeps_its_ancestor_chain() {
    let result = run_json(&["select", "--focus", "L3", &sample()]);
    assert_eq!(result["role"], "lever");
    assert_eq!(result["nodes"], serde_json::json!(["M1", "F2", "L3"]));
    assert_eq!(
        result["edges"],
        serde_json::json!([
            { "id": "e-M1-F2", "source": "M1", "target": "F2" },
            { "id": "e-F2-L3", "source": "F2", "target": "L3" },
        ])
    );
}

#[test]
fn prune_drops_stale_positions() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let out = tmp.path().join("pruned.json");
    kpitree()
        .args(["prune", "--out", out.to_string_lossy().as_ref(), sample().as_str()])
        .assert()
        .success();

    let text = fs::read_to_string(&out).expect("read output");
    let doc: Value = serde_json::from_str(&text).expect("output is JSON");
    assert_eq!(
        doc["positions"],
        serde_json::json!({ "F2": { "x": 40.0, "y": 60.0 } })
    );
    assert_eq!(doc["topMetrics"].as_array().map(Vec::len), Some(2));
}

#[test]
fn prune_rewrites_legacy_spelling() {
    let doc = run_json(&["prune", &fixture(&["documents", "legacy.json"])]);
    assert!(doc.get("kpis").is_none());
    assert_eq!(doc["topMetrics"][0]["factors"][0]["label"], "Cost to serve");
}
