//! Integration tests for the `classmap` binary.

use assert_cmd::Command;
use indoc::indoc;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    let package = dir.path().join("garden");
    fs::create_dir_all(&package).unwrap();
    fs::write(package.join("__init__.py"), "").unwrap();
    fs::write(
        package.join("plants.py"),
        indoc! {"
            class Plant:
                def __init__(self, name: str, height: float = 0.0):
                    self.name = name
                    self.height = height
                    self.leaves = []

                def water(self, litres: int) -> bool:
                    pass
        "},
    )
    .unwrap();
    dir
}

fn classmap() -> Command {
    Command::cargo_bin("classmap").unwrap()
}

#[test]
fn test_model_text_output() {
    let dir = fixture();
    let output = classmap()
        .current_dir(dir.path())
        .args(["model", "garden", "--no-color"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("class Plant(object)  garden.plants.Plant"));
    assert!(stdout.contains("    name:str"));
    assert!(stdout.contains("    leaves:List[Any]"));
    assert!(stdout.contains("    fn water(self, litres: int) -> bool"));
}

#[test]
fn test_model_json_output_to_file() {
    let dir = fixture();
    let output_path = dir.path().join("models.json");
    classmap()
        .current_dir(dir.path())
        .args(["model", "garden", "--format", "json", "--package", "garden", "--output"])
        .arg(&output_path)
        .assert()
        .success();

    let json: Value = serde_json::from_str(&fs::read_to_string(&output_path).unwrap()).unwrap();
    let models = json.as_array().expect("a list of models");
    assert_eq!(models.len(), 1);
    assert_eq!(models[0]["kind"], "class");
    assert_eq!(models[0]["qualified_name"], "garden.plants.Plant");
    assert_eq!(models[0]["attributes"][1]["name"], "height");
}

#[test]
fn test_unknown_package_fails() {
    let dir = fixture();
    let output = classmap()
        .current_dir(dir.path())
        .args(["model", "garden", "--package", "orchard"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Module not found: orchard"));
}

#[test]
fn test_init_writes_config_once() {
    let dir = TempDir::new().unwrap();
    classmap().current_dir(dir.path()).arg("init").assert().success();
    assert!(dir.path().join(".classmap.toml").exists());

    classmap().current_dir(dir.path()).arg("init").assert().failure();
    classmap()
        .current_dir(dir.path())
        .args(["init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_config_default_format_is_used() {
    let dir = fixture();
    fs::write(dir.path().join(".classmap.toml"), "[output]\ndefault_format = \"json\"\n").unwrap();
    let output = classmap()
        .current_dir(dir.path())
        .args(["model", "garden"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(json.is_array());
}
