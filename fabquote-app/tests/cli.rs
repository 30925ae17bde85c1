use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

fn fabquote() -> Command {
    let mut cmd = Command::cargo_bin("fabquote").expect("找不到 fabquote 可执行文件");
    cmd.env_remove("FABQUOTE_CONFIG");
    cmd
}

#[test]
fn quote_prints_total_for_mild_steel_plate() {
    fabquote()
        .arg("quote")
        .arg(fixture("plate_with_holes.dxf"))
        .args(["--material", "Mild Steel", "--thickness", "0.048\""])
        .assert()
        .success()
        .stdout(predicate::str::contains("Holes:       4"))
        .stdout(predicate::str::contains("Total: 5.00"));
}

#[test]
fn countersinking_and_quantity_show_up_in_json() {
    let output = fabquote()
        .arg("quote")
        .arg(fixture("plate_with_holes.dxf"))
        .args([
            "--material",
            "Mild Steel",
            "--thickness",
            "0.048\"",
            "--service",
            "Countersinking",
            "--quantity",
            "2",
            "--json",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).expect("输出不是 UTF-8");
    assert!(text.contains("\"total_cents\": 1400"), "unexpected output: {text}");
    assert!(text.contains("unsupported_entity"));
}

#[test]
fn missing_material_gives_zero_total() {
    fabquote()
        .arg("quote")
        .arg(fixture("plate_with_holes.dxf"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 0.00"));
}

#[test]
fn truncated_drawing_reports_user_facing_error() {
    fabquote()
        .arg("quote")
        .arg(fixture("truncated.dxf"))
        .args(["--material", "Mild Steel", "--thickness", "0.048\""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("file could not be read as a drawing"));
}

#[test]
fn svg_preview_is_written() {
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let svg = dir.path().join("plate.svg");
    fabquote()
        .arg("quote")
        .arg(fixture("plate_with_holes.dxf"))
        .arg("--svg")
        .arg(&svg)
        .assert()
        .success();
    let content = fs::read_to_string(&svg).expect("读取 SVG 失败");
    assert!(content.starts_with("<svg"));
}

#[test]
fn custom_rate_table_from_config() {
    let dir = tempfile::tempdir().expect("创建临时目录失败");
    fs::write(
        dir.path().join("rates.json"),
        r#"{ "materials": { "Copper": { "0_064": 0.40 } } }"#,
    )
    .unwrap();
    let config = dir.path().join("fabquote.toml");
    fs::write(&config, "[pricing]\nrate_table = \"rates.json\"\n").unwrap();

    fabquote()
        .arg("--config")
        .arg(&config)
        .arg("quote")
        .arg(fixture("plate_with_holes.dxf"))
        .args(["--material", "Copper", "--thickness", "0.064\""])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total: 20.00"));
}

#[test]
fn rates_lists_catalog() {
    fabquote()
        .arg("rates")
        .assert()
        .success()
        .stdout(predicate::str::contains("Mild Steel: 0.030\""))
        .stdout(predicate::str::contains("Powder Coat (0.05 per sq_inch)"));
}

#[test]
fn zero_quantity_is_rejected() {
    fabquote()
        .arg("quote")
        .arg(fixture("plate_with_holes.dxf"))
        .args(["--quantity", "0"])
        .assert()
        .failure();
}
