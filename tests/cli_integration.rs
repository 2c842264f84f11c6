//! Integration tests for the `tayra` CLI.
//!
//! Each test gets its own config directory and runs `tayra` as a
//! subprocess. Commands that need a server talk to a small canned-response
//! HTTP server on a local port.

use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::Path;
use std::process::Command;
use std::sync::{Arc, Mutex};
use std::thread;

use tempfile::TempDir;

/// Run `tayra` with `config_home` as XDG_CONFIG_HOME.
/// Returns (stdout, stderr, success).
fn run_tayra(config_home: &Path, args: &[&str]) -> (String, String, bool) {
    run_tayra_env(config_home, args, &[])
}

fn run_tayra_env(config_home: &Path, args: &[&str], env: &[(&str, &str)]) -> (String, String, bool) {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_tayra"));
    cmd.args(args)
        .env("XDG_CONFIG_HOME", config_home)
        .env_remove("TAYRA_API_URL")
        .env_remove("RUST_LOG");
    for (key, value) in env {
        cmd.env(key, value);
    }
    let output = cmd.output().expect("failed to run tayra");
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.success(),
    )
}

fn run_tayra_ok(config_home: &Path, args: &[&str]) -> String {
    let (stdout, stderr, ok) = run_tayra(config_home, args);
    assert!(ok, "tayra {:?} failed: {}", args, stderr);
    stdout
}

struct FakeServer {
    base: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeServer {
    /// Request lines received so far, e.g. "GET /api/tasks"
    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

/// Serve `tasks_json` for GET /api/tasks, an empty category list, and 404
/// for everything else. Runs until the test process exits.
fn fake_server(tasks_json: String) -> FakeServer {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}/api", listener.local_addr().unwrap());
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&requests);

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(stream) = stream else { break };
            let mut reader = BufReader::new(stream);
            let mut request_line = String::new();
            if reader.read_line(&mut request_line).is_err() {
                continue;
            }
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap_or(0) == 0 || line == "\r\n" {
                    break;
                }
                if let Some(v) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                    content_length = v.trim().parse().unwrap_or(0);
                }
            }
            let mut body = vec![0u8; content_length];
            let _ = reader.read_exact(&mut body);

            let parts: Vec<&str> = request_line.split_whitespace().take(2).collect();
            let (status, payload) = match parts.as_slice() {
                ["GET", "/api/tasks"] => ("200 OK", tasks_json.clone()),
                ["GET", "/api/categories"] => ("200 OK", "[]".to_string()),
                ["GET", "/api/health"] => ("200 OK", r#"{"status":"ok"}"#.to_string()),
                _ => ("404 NOT FOUND", r#"{"error":"not found"}"#.to_string()),
            };
            seen.lock().unwrap().push(parts.join(" "));

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                payload.len(),
                payload
            );
            let _ = reader.get_mut().write_all(response.as_bytes());
        }
    });

    FakeServer { base, requests }
}

/// Three open tasks a, b, c planned for today, plus one unscheduled task
fn todays_tasks() -> String {
    let today = chrono::Local::now().date_naive();
    format!(
        r#"[
  {{"id":"a","title":"Alpha","category":"work","doDate":"{d}","completed":false,"subtasks":[{{"id":"s1","title":"step","completed":true}}]}},
  {{"id":"b","title":"Bravo","category":"work","doDate":"{d}","completed":false}},
  {{"id":"c","title":"Charlie","category":"home","doDate":"{d}","completed":false}},
  {{"id":"d","title":"Delta","category":"home","doDate":null,"completed":false}}
]"#,
        d = today
    )
}

/// Saved state: c then a in Important, a expanded
fn write_saved_state(path: &Path) {
    fs::write(
        path,
        r#"{
  "sections": { "c": "important", "a": "important" },
  "order": { "important": ["c", "a"], "extra": [] },
  "expanded": ["a"]
}"#,
    )
    .unwrap();
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[test]
fn config_path_respects_xdg() {
    let tmp = TempDir::new().unwrap();
    let out = run_tayra_ok(tmp.path(), &["config", "path"]);
    assert_eq!(
        out.trim(),
        tmp.path().join("tayra").join("config.toml").display().to_string()
    );
}

#[test]
fn config_set_then_show() {
    let tmp = TempDir::new().unwrap();
    run_tayra_ok(tmp.path(), &["config", "set", "server.base_url", "http://tasks.lan:5000/api"]);
    run_tayra_ok(tmp.path(), &["config", "set", "server.timeout_secs", "3"]);

    let out = run_tayra_ok(tmp.path(), &["config", "show"]);
    assert!(out.contains(r#"base_url = "http://tasks.lan:5000/api""#));
    assert!(out.contains("timeout_secs = 3"));

    let written = fs::read_to_string(tmp.path().join("tayra").join("config.toml")).unwrap();
    assert!(written.contains("[server]"));
}

#[test]
fn config_set_unknown_key_fails() {
    let tmp = TempDir::new().unwrap();
    let (_, stderr, ok) = run_tayra(tmp.path(), &["config", "set", "server.port", "80"]);
    assert!(!ok);
    assert!(stderr.starts_with("error: unknown config key 'server.port'"));
}

#[test]
fn api_url_flag_beats_env() {
    let tmp = TempDir::new().unwrap();
    let env = [("TAYRA_API_URL", "http://from-env:1/api")];

    let (out, _, ok) = run_tayra_env(tmp.path(), &["--json", "config"], &env);
    assert!(ok);
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["server"]["base_url"], "http://from-env:1/api");

    let (out, _, ok) = run_tayra_env(
        tmp.path(),
        &["--json", "--api-url", "http://from-flag:2/api", "config", "show"],
        &env,
    );
    assert!(ok);
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["server"]["base_url"], "http://from-flag:2/api");
}

// ---------------------------------------------------------------------------
// Server-backed commands
// ---------------------------------------------------------------------------

#[test]
fn unreachable_server_is_reported() {
    let tmp = TempDir::new().unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}/api", listener.local_addr().unwrap());
    drop(listener);

    let (_, stderr, ok) = run_tayra(tmp.path(), &["--api-url", &base, "today"]);
    assert!(!ok);
    assert!(stderr.starts_with("error: "), "stderr: {}", stderr);
    assert!(!tmp.path().join("tayra").join("triage.json").exists());
}

#[test]
fn today_renders_saved_order() {
    let tmp = TempDir::new().unwrap();
    let state = tmp.path().join("triage.json");
    write_saved_state(&state);
    let server = fake_server(todays_tasks());

    let out = run_tayra_ok(
        tmp.path(),
        &["--api-url", &server.base, "--state-file", state.to_str().unwrap(), "today"],
    );
    let lines: Vec<&str> = out.lines().collect();

    assert!(lines[0].starts_with("== Today ("));
    assert_eq!(lines[2], "-- Important --");
    assert!(lines[3].starts_with("  [ ] c Charlie"));
    assert!(lines[4].starts_with("  [ ] a Alpha"));
    assert_eq!(lines[5], "      [x] s1 step");
    assert_eq!(lines[7], "-- Extra --");
    assert!(lines[8].starts_with("  [ ] b Bravo"));
    assert_eq!(lines.len(), 9);
    assert_eq!(server.requests(), vec!["GET /api/tasks"]);
}

#[test]
fn today_json_lists_sections() {
    let tmp = TempDir::new().unwrap();
    let state = tmp.path().join("triage.json");
    write_saved_state(&state);
    let server = fake_server(todays_tasks());

    let out = run_tayra_ok(
        tmp.path(),
        &["--json", "--api-url", &server.base, "--state-file", state.to_str().unwrap(), "today"],
    );
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    let ids = |key: &str| -> Vec<String> {
        json[key]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["id"].as_str().unwrap().to_string())
            .collect()
    };
    assert_eq!(ids("important"), vec!["c", "a"]);
    assert_eq!(ids("extra"), vec!["b"]);
}

#[test]
fn place_within_today_is_local() {
    let tmp = TempDir::new().unwrap();
    let state = tmp.path().join("triage.json");
    write_saved_state(&state);
    let server = fake_server(todays_tasks());

    let out = run_tayra_ok(
        tmp.path(),
        &["--api-url", &server.base, "--state-file", state.to_str().unwrap(), "place", "b", "important"],
    );
    assert_eq!(out.trim(), "b -> important");
    assert_eq!(server.requests(), vec!["GET /api/tasks"]);

    let saved: serde_json::Value = serde_json::from_str(&fs::read_to_string(&state).unwrap()).unwrap();
    assert_eq!(saved["order"]["important"], serde_json::json!(["c", "a", "b"]));
    assert_eq!(saved["sections"]["b"], "important");
}

#[test]
fn reorder_moves_to_target_position() {
    let tmp = TempDir::new().unwrap();
    let state = tmp.path().join("triage.json");
    write_saved_state(&state);
    let server = fake_server(todays_tasks());
    let state_arg = state.to_str().unwrap();

    run_tayra_ok(
        tmp.path(),
        &["--api-url", &server.base, "--state-file", state_arg, "reorder", "a", "--before", "c"],
    );
    let saved: serde_json::Value = serde_json::from_str(&fs::read_to_string(&state).unwrap()).unwrap();
    assert_eq!(saved["order"]["important"], serde_json::json!(["a", "c"]));

    // b renders in Extra, c in Important
    let (_, stderr, ok) = run_tayra(
        tmp.path(),
        &["--api-url", &server.base, "--state-file", state_arg, "reorder", "b", "--before", "c"],
    );
    assert!(!ok);
    assert!(stderr.contains("use `tayra place`"));
}

#[test]
fn bad_section_fails_before_any_request() {
    let tmp = TempDir::new().unwrap();
    let server = fake_server("[]".to_string());
    let (_, stderr, ok) = run_tayra(
        tmp.path(),
        &["--api-url", &server.base, "place", "a", "urgent"],
    );
    assert!(!ok);
    assert!(stderr.contains("unknown section 'urgent'"));
    assert!(server.requests().is_empty());
}

#[test]
fn health_checks_server() {
    let tmp = TempDir::new().unwrap();
    let server = fake_server("[]".to_string());
    let out = run_tayra_ok(tmp.path(), &["--api-url", &server.base, "health"]);
    assert!(out.starts_with("ok "));
    assert_eq!(server.requests(), vec!["GET /api/health"]);
}
