//! Binary-level tests for `scales rollup` and `scales expectations`

use serde_json::json;
use std::path::Path;
use std::process::Command;

fn scales_bin() -> String {
    env!("CARGO_BIN_EXE_scales").to_string()
}

fn run(base: &Path, args: &[&str]) -> (i32, String) {
    let output = Command::new(scales_bin())
        .arg("--base")
        .arg(base)
        .args(args)
        .output()
        .expect("Failed to run scales");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    (output.status.code().unwrap_or(-1), stdout)
}

const CONFIG: &str = r#"
version: "2.0.0"
as_of: "2025-12-06"
pillars:
  - { code: S, name: Structural safeguards }
  - { code: C, name: Coercive apparatus }
indicators:
  - { id: S-01, pillar: S }
  - { id: C-01, pillar: C }
indices:
  ILG:
    name: Institutional Legitimacy & Guardrails
    pillar_weights: { S: 1 }
  CCI:
    name: Coercive Capacity Index
    pillar_weights: { C: 1 }
global_score:
  index_weights: { ILG: 0.5, CCI: 0.5 }
modules:
  AI_PEI:
    name: AI Preference Engineering Index
    components:
      - { code: PIC, weight: 2 }
      - { code: CC }
    scoring: { max_raw: 12 }
"#;

fn setup() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    let base = dir.path();
    std::fs::create_dir_all(base.join("config")).expect("mkdir");
    std::fs::write(base.join("config/SCALES_Config.yaml"), CONFIG).expect("write config");
    std::fs::create_dir_all(base.join("data")).expect("mkdir");
    std::fs::write(
        base.join("data/scales_ledger_public.json"),
        json!([
            {"id": "1", "indicator_id": "S-01", "pillar": "S", "score_0_4": 2},
            {"id": "2", "indicator_id": "S-01", "pillar": "S", "score_0_4": 4},
            {"id": "3", "indicator_id": "C-01", "pillar": "C", "score_0_4": "1"},
            {"id": "4", "indicator_id": "C-01", "pillar": "C", "score_0_4": "n/a"}
        ])
        .to_string(),
    )
    .expect("write ledger");
    dir
}

#[test]
fn test_rollup_global_state() {
    let dir = setup();
    let (code, stdout) = run(dir.path(), &["rollup"]);
    assert_eq!(code, 0);

    let state: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    // S = 3.0 -> 75, C = 1.0 -> 25, global = 50
    assert_eq!(state["indices"]["ILG"]["score"], 75.0);
    assert_eq!(state["indices"]["ILG"]["band"], "severe");
    assert_eq!(state["indices"]["CCI"]["score"], 25.0);
    assert_eq!(state["global"]["score"], 50.0);
    assert_eq!(state["global"]["band"], "elevated");
    assert_eq!(state["pillars"][0]["code"], "S");
    assert_eq!(state["pillars"][0]["score"], 3.0);
    assert_eq!(state["version"], "2.0.0");
}

#[test]
fn test_rollup_does_not_touch_snapshots() {
    let dir = setup();
    let ledger = dir.path().join("data/scales_ledger_public.json");
    let before = std::fs::read_to_string(&ledger).expect("read");
    run(dir.path(), &["rollup"]);
    assert_eq!(std::fs::read_to_string(&ledger).expect("read"), before);
    assert!(!dir.path().join("data/scales_state.json").exists());
}

#[test]
fn test_rollup_module() {
    let dir = setup();
    let evidence = dir.path().join("ai_pei_evidence.json");
    std::fs::write(
        &evidence,
        json!([
            {"component_code": "PIC", "score_0_4": 3},
            {"component_code": "CC", "score_0_4": 2}
        ])
        .to_string(),
    )
    .expect("write evidence");

    let (code, stdout) = run(
        dir.path(),
        &[
            "rollup",
            "--module",
            "AI_PEI",
            "--evidence",
            evidence.to_str().expect("utf-8 path"),
        ],
    );
    assert_eq!(code, 0);

    let module: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    // (3 × 2 + 2) / 12 × 100
    assert_eq!(module["score"], 66.7);
    assert_eq!(module["band"], "severe");
    assert_eq!(module["key"], "AI_PEI");
    assert_eq!(module["components"].as_array().expect("components").len(), 2);
}

#[test]
fn test_rollup_without_ledger_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (code, stdout) = run(dir.path(), &["rollup"]);
    assert_eq!(code, 1);
    assert!(stdout.is_empty());
}

#[test]
fn test_expectations_json() {
    let dir = setup();
    let (code, stdout) = run(dir.path(), &["expectations", "--format", "json"]);
    assert_eq!(code, 0);

    let e: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    assert_eq!(e["pillars"], json!(["S", "C"]));
    assert_eq!(e["indices"], json!(["ILG", "CCI"]));
    assert_eq!(e["modules"]["AI_PEI"]["components"], json!(["PIC", "CC"]));
}

#[test]
fn test_expectations_builtin_text() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (code, stdout) = run(dir.path(), &["--no-color", "expectations"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Source: built-in defaults"));
    assert!(stdout.contains("Pillars: S, C, A, L, E, S2"));
    assert!(stdout.contains("SDEI (Surveillance & Data Exploitation Index): CB, IL, AC, AG_raw, RR_raw"));
}
