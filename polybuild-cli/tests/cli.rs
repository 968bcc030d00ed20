use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex};
use std::thread;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

const DEFINITION: &str = r#"
problem:
  polygon_name: two-sum
  name: Two Sum
  timelimit_ms: 2000
  memory_mb: 256
  tags: [arrays]
statement:
  legend_md: legend.md
  input_md: input.md
  output_md: output.md
files:
  checker: wcmp
  validator_path: validator.cpp
  solutions:
    - { path: solution.cpp, language: cpp.g++17, tag: main }
tests:
  samples:
    - { input: 01.in, example: true }
  generators:
    - { path: gen.cpp, repeat: 3 }
"#;

fn polybuild(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("polybuild").expect("polybuild binary");
    cmd.current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("POLYGON_API_KEY")
        .env_remove("POLYGON_API_SECRET")
        .env_remove("POLYGON_KEY")
        .env_remove("POLYGON_SECRET")
        .env_remove("POLYGON_BASE_URL");
    cmd
}

fn with_credentials<'a>(cmd: &'a mut Command, base_url: &str) -> &'a mut Command {
    cmd.env("POLYGON_API_KEY", "test-key")
        .env("POLYGON_API_SECRET", "test-secret")
        .env("POLYGON_BASE_URL", base_url)
}

fn workspace(definition: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("tempdir");
    for name in [
        "legend.md",
        "input.md",
        "output.md",
        "validator.cpp",
        "solution.cpp",
        "gen.cpp",
        "01.in",
    ] {
        fs::write(dir.path().join(name), format!("{name}\n")).expect("write fixture");
    }
    let config = dir.path().join("problem.yaml");
    fs::write(&config, definition).expect("write problem.yaml");
    (dir, config)
}

/// Serve every request until the test process exits, answering like the
/// service would for an existing `two-sum` problem. Returns the base URL and
/// the request lines seen so far.
fn serve_polygon() -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
            let mut request_line = String::new();
            reader.read_line(&mut request_line).expect("request line");
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).expect("header");
                if line == "\r\n" || line.is_empty() {
                    break;
                }
                if let Some(v) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                    content_length = v.trim().parse().expect("content-length");
                }
            }
            let mut body = vec![0u8; content_length];
            reader.read_exact(&mut body).expect("body");

            let reply = if request_line.contains("/problems.list") {
                r#"{"status":"OK","result":[{"id":7,"name":"two-sum"}]}"#
            } else {
                r#"{"status":"OK"}"#
            };
            log.lock().expect("request log").push(request_line.trim().to_string());
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{reply}",
                reply.len()
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });
    (format!("http://{addr}/api"), seen)
}

#[test]
fn validate_accepts_a_complete_definition() {
    let (dir, _) = workspace(DEFINITION);
    polybuild(dir.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(contains("is valid"))
        .stdout(contains("two-sum"))
        .stdout(contains("2-4"));
}

#[test]
fn validate_reports_every_problem_at_once() {
    let broken = DEFINITION
        .replace("  timelimit_ms: 2000\n", "")
        .replace("  checker: wcmp\n", "");
    let (dir, _) = workspace(&broken);
    polybuild(dir.path())
        .arg("validate")
        .assert()
        .failure()
        .stderr(contains("Config error:"))
        .stderr(contains("problem.timelimit_ms"))
        .stderr(contains("files.checker"));
}

#[test]
fn validate_rejects_more_tests_than_indices() {
    let (dir, _) = workspace(&DEFINITION.replace("repeat: 3", "repeat: 4294967295"));
    polybuild(dir.path())
        .arg("validate")
        .assert()
        .failure()
        .stderr(contains("Config error:"))
        .stderr(contains("4294967296 tests"));
}

#[test]
fn validate_json_emits_parsed_definition() {
    let (dir, config) = workspace(DEFINITION);
    let output = polybuild(dir.path())
        .args(["validate", "--json", "--config"])
        .arg(&config)
        .output()
        .expect("run validate");
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(json["definition"]["polygon_name"], "two-sum");
    assert_eq!(json["definition"]["time_limit_ms"], 2000);
    assert_eq!(json["tests"][1]["tests"], "2-4");
}

#[test]
fn build_without_credentials_fails_before_reading_definition() {
    let (dir, _) = workspace(DEFINITION);
    polybuild(dir.path())
        .args(["build", "--dry-run"])
        .assert()
        .failure()
        .stderr(contains("missing API credentials"))
        .stderr(contains("POLYGON_API_KEY"));
}

#[test]
fn dry_run_still_rejects_missing_main_solution() {
    let (dir, _) = workspace(&DEFINITION.replace("tag: main", "tag: correct"));
    with_credentials(&mut polybuild(dir.path()), "http://127.0.0.1:9")
        .args(["build", "--dry-run"])
        .assert()
        .failure()
        .stderr(contains("Config error:"))
        .stderr(contains("main"))
        .stderr(contains("STAGE").not());
}

#[test]
fn unreachable_service_fails_the_first_stage() {
    let (dir, _) = workspace(DEFINITION);
    // Bind and drop a listener to get a port nothing is listening on.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .and_then(|l| l.local_addr())
        .expect("free port")
        .port();
    with_credentials(&mut polybuild(dir.path()), &format!("http://127.0.0.1:{port}"))
        .args(["build", "--timeout", "2"])
        .assert()
        .failure()
        .stderr(contains("Build error: STAGE 1: Problem init FAILED"))
        .stdout(contains("Build completed.").not());
}

#[test]
fn non_english_statement_stops_the_process_at_stage_three() {
    let (dir, _) = workspace(&DEFINITION.replace("statement:\n", "statement:\n  language: french\n"));
    let (url, seen) = serve_polygon();

    with_credentials(&mut polybuild(dir.path()), &url)
        .args(["build", "--timeout", "5"])
        .assert()
        .failure()
        .stderr(contains("Build error: STAGE 3: English statement FAILED"))
        .stdout(contains("Build completed.").not());

    let seen = seen.lock().expect("request log");
    let methods: Vec<&str> = seen
        .iter()
        .filter_map(|line| line.split_whitespace().nth(1))
        .filter_map(|path| path.rsplit('/').next())
        .collect();
    assert_eq!(
        methods,
        vec!["problems.list", "problem.updateInfo", "problem.saveTags"],
        "stages after the statement must not call the service"
    );
}

#[test]
fn methods_lists_the_registry() {
    let dir = TempDir::new().expect("tempdir");
    polybuild(dir.path())
        .arg("methods")
        .assert()
        .success()
        .stdout(contains("problem.saveFile"))
        .stdout(contains("problems.list"));
}

#[test]
fn methods_can_hide_read_only_calls() {
    let dir = TempDir::new().expect("tempdir");
    polybuild(dir.path())
        .args(["methods", "--mutating"])
        .assert()
        .success()
        .stdout(contains("problem.commitChanges"))
        .stdout(contains("problems.list").not());
}
