use std::fs;
use std::process::{Command, Output};
use tempfile::TempDir;

fn fe(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fe"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("FE_CONFIG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn test_lex_prints_tokens_as_json() {
    let temp_dir = TempDir::new().unwrap();
    let src = temp_dir.path().join("prog.let");
    fs::write(&src, "let id = λ x x;").unwrap();

    let output = fe(&["lex", src.to_str().unwrap(), "--format", "json"]);
    assert!(output.status.success());

    let tokens: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let tags: Vec<&str> = tokens
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["tag"].as_str().unwrap())
        .collect();
    assert_eq!(tags, ["let", "id", "assign", "lambda", "id", "id", "semicolon", "eof"]);
    assert!(tokens[1]["loc"].as_str().unwrap().ends_with("prog.let:1:5-6"));
    assert_eq!(tokens[1]["text"], "id");
}

#[test]
fn test_lex_fails_on_bad_input() {
    let temp_dir = TempDir::new().unwrap();
    let src = temp_dir.path().join("bad.let");
    fs::write(&src, "x ? y").unwrap();

    let output = fe(&["lex", src.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("invalid input character: '?'"));
}

#[test]
fn test_intern_reports_pool_usage() {
    let temp_dir = TempDir::new().unwrap();
    let words = temp_dir.path().join("words.txt");
    fs::write(&words, "a bb a_long_identifier\na_long_identifier another_long_one a").unwrap();
    let config = temp_dir.path().join("fe.toml");
    fs::write(&config, "[pool]\npage_size = 4096\n").unwrap();

    let output = fe(&[
        "--config",
        config.to_str().unwrap(),
        "intern",
        words.to_str().unwrap(),
        "--format",
        "json",
    ]);
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["words"], 6);
    assert_eq!(report["distinct_boxed"], 2);
    assert_eq!(report["pool"]["records"], 2);
    assert_eq!(report["pool"]["capacity_bytes"], 4096);
    if cfg!(target_pointer_width = "64") {
        assert_eq!(report["inline"], 3);
        assert_eq!(report["boxed"], 3);
    }
}

#[test]
fn test_missing_file_is_an_error() {
    let output = fe(&["intern", "/definitely/not/here.txt"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Failed to read"));
}
