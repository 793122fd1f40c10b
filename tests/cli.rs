//! CLI integration tests: run the `site-studio` binary as a user would.
//!
//! Run with: cargo test --test cli

use serde_json::{Value, json};
use site_studio::config::StudioConfig;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

/// Run the binary with a config path that does not exist, so stock
/// defaults apply regardless of the working directory.
fn studio(tmp: &Path, args: &[&str]) -> Output {
    let config = tmp.join("missing-studio.toml");
    Command::new(env!("CARGO_BIN_EXE_site-studio"))
        .arg("--config")
        .arg(&config)
        .args(args)
        .current_dir(tmp)
        .output()
        .expect("failed to run site-studio")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn write_json(dir: &Path, name: &str, value: &Value) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

#[test]
fn generate_writes_site() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("dist");
    let project = root().join("fixtures/tech-solutions.json");
    let output = studio(
        tmp.path(),
        &["generate", project.to_str().unwrap(), "--output", out.to_str().unwrap()],
    );

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let text = stdout(&output);
    assert!(text.contains("001 Home \u{2192} index.html"));
    assert!(text.contains("Generated 3 pages, 7 files"));
    assert!(out.join("index.html").exists());
    assert!(out.join("services/index.html").exists());
    assert!(out.join("assets/site.css").exists());
}

#[test]
fn generate_dry_run_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("dist");
    let project = root().join("fixtures/tech-solutions.json");
    let output = studio(
        tmp.path(),
        &[
            "generate",
            project.to_str().unwrap(),
            "--output",
            out.to_str().unwrap(),
            "--dry-run",
        ],
    );

    assert!(output.status.success());
    assert!(stdout(&output).contains("Dry run"));
    assert!(!out.exists());
}

#[test]
fn generate_empty_project_fails() {
    let tmp = TempDir::new().unwrap();
    let project = write_json(
        tmp.path(),
        "empty.json",
        &json!({ "id": "empty", "businessInfo": { "name": "Nobody" }, "pages": [] }),
    );
    let output = studio(tmp.path(), &["generate", project.to_str().unwrap()]);

    assert!(!output.status.success());
    assert!(stdout(&output).contains("EMPTY_PROJECT"));
}

#[test]
fn validate_accepts_flat_pricing() {
    let tmp = TempDir::new().unwrap();
    let data = write_json(
        tmp.path(),
        "pricing.json",
        &json!({
            "plan1_name": "Basic", "plan1_price": "$19",
            "plan2_name": "Pro", "plan2_price": "$49", "plan2_highlighted": "yes"
        }),
    );
    let output = studio(tmp.path(), &["validate", "pricing", data.to_str().unwrap(), "--json"]);

    assert!(output.status.success());
    let report: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["success"], true);
    assert_eq!(report["data"]["plans"][1]["price"], 49.0);
    assert_eq!(report["data"]["plans"][1]["highlighted"], true);
}

#[test]
fn validate_reports_every_error() {
    let tmp = TempDir::new().unwrap();
    let plans: Vec<Value> = (1..=6)
        .map(|i| json!({ "name": format!("Plan {i}"), "price": i }))
        .collect();
    let data = write_json(tmp.path(), "pricing.json", &json!({ "plans": plans }));
    let output = studio(tmp.path(), &["validate", "pricing", data.to_str().unwrap()]);

    assert!(!output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("pricing: 1 error"));
    assert!(text.contains("plans: Array must contain at most 5 element(s)"));
}

#[test]
fn validate_unknown_block_fails() {
    let tmp = TempDir::new().unwrap();
    let data = write_json(tmp.path(), "data.json", &json!({}));
    let output = studio(tmp.path(), &["validate", "carousel", data.to_str().unwrap()]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown block 'carousel'"));
}

#[test]
fn defaults_print_valid_json() {
    let tmp = TempDir::new().unwrap();
    let output = studio(tmp.path(), &["defaults", "hero"]);

    assert!(output.status.success());
    let data: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(data["variant"], "centered");
    assert!(data["title"].as_str().is_some_and(|t| !t.is_empty()));
}

#[test]
fn blocks_lists_catalog() {
    let tmp = TempDir::new().unwrap();
    let output = studio(tmp.path(), &["blocks"]);

    assert!(output.status.success());
    let text = stdout(&output);
    assert_eq!(text.lines().count(), 8);
    assert!(text.contains("pricing: cards, table, minimal"));
}

#[test]
fn gen_config_round_trips() {
    let tmp = TempDir::new().unwrap();
    let output = studio(tmp.path(), &["gen-config"]);

    assert!(output.status.success());
    let config: StudioConfig = toml::from_str(&stdout(&output)).unwrap();
    assert_eq!(config.generator.output_path, "dist");
    assert!(config.options.cache);
}
