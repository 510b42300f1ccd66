use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// An isolated home: data dir, config dir and mock scenario in one temp dir
struct Sandbox {
    root: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("scenario")).unwrap();
        Self { root }
    }

    fn with_fixture(fixture: &str) -> Self {
        let sandbox = Self::new();
        fs::write(sandbox.scenario().join("fixture.toml"), fixture).unwrap();
        sandbox
    }

    fn path(&self) -> &Path {
        self.root.path()
    }

    fn scenario(&self) -> std::path::PathBuf {
        self.path().join("scenario")
    }

    fn call_log(&self) -> String {
        fs::read_to_string(self.scenario().join("call_log.jsonl")).unwrap_or_default()
    }

    fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("showcase");
        cmd.current_dir(self.path())
            .env("HOME", self.path())
            .env("XDG_CONFIG_HOME", self.path().join("config"))
            .env("SHOWCASE_DATA_DIR", self.path().join("data"))
            .env("SHOWCASE_MOCK_DIR", self.scenario())
            .env("SHOWCASE_FORK_SETTLE_SECS", "0")
            .env("NO_COLOR", "1")
            .env_remove("SHOWCASE_LOG")
            .env_remove("SHOWCASE_CONFIG")
            .env_remove("SHOWCASE_COLOR_SCHEME");
        cmd
    }

    fn login(&self) {
        self.cmd()
            .args(["auth", "login", "--token", "gho_mock"])
            .assert()
            .success();
    }
}

#[test]
fn test_help_command() {
    cargo_bin_cmd!("showcase")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Submit projects and tools to a GitHub-hosted showcase",
        ));
}

#[test]
fn test_tool_subcommand_help() {
    cargo_bin_cmd!("showcase")
        .args(["tool", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tool operations"));
}

#[test]
fn test_version() {
    cargo_bin_cmd!("showcase")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_submit_without_login_makes_no_calls() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args([
            "project",
            "submit",
            "--name",
            "Site",
            "--url",
            "https://example.com",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be logged in"));

    sandbox
        .cmd()
        .args(["tool", "submit", "--name", "Picker", "--folder", "picker"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be logged in"));

    assert_eq!(sandbox.call_log(), "");
}

#[test]
fn test_json_error_format() {
    let sandbox = Sandbox::new();

    let output = sandbox
        .cmd()
        .args([
            "--format",
            "json",
            "project",
            "submit",
            "--name",
            "Site",
            "--url",
            "https://example.com",
        ])
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["error"], true);
    assert_eq!(json["code"], "not_authenticated");
}

#[test]
fn test_token_login_and_status() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["auth", "login", "--token", "gho_mock"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in as The Octocat"));

    sandbox
        .cmd()
        .args(["auth", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("@octocat"));

    let store = fs::read_to_string(sandbox.path().join("data").join("store.json")).unwrap();
    assert!(store.contains("github_token"));
    assert!(store.contains("github_user"));

    sandbox.cmd().args(["auth", "logout"]).assert().success();
    sandbox
        .cmd()
        .args(["auth", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in"));
}

#[test]
fn test_rejected_token_leaves_session_logged_out() {
    let sandbox = Sandbox::with_fixture("[user]\nid = 1\nlogin = \"octocat\"\ntoken = \"gho_ok\"\n");

    sandbox
        .cmd()
        .args(["auth", "login", "--token", "gho_wrong"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Authentication failed"));

    sandbox
        .cmd()
        .args(["--format", "json", "auth", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"logged_out\""));
}

#[test]
fn test_login_prints_authorize_url() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["auth", "login", "--no-browser", "--scope", "gist"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "https://github.com/login/oauth/authorize?client_id=Ov23liYJv9yGDtXz1DDK",
        ))
        .stdout(predicate::str::contains("scope=user%2Crepo%2Cgist"))
        .stdout(predicate::str::contains("&state="));

    let store = fs::read_to_string(sandbox.path().join("data").join("store.json")).unwrap();
    assert!(store.contains("oauth_callback_id"));
}

#[test]
fn test_callback_completes_pending_login() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["auth", "login", "--no-browser"])
        .assert()
        .success();

    sandbox
        .cmd()
        .args([
            "auth",
            "callback",
            "--url",
            "https://julieisbaka.github.io/github-authentication-sample/?code=abc123",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("@octocat"));

    let store = fs::read_to_string(sandbox.path().join("data").join("store.json")).unwrap();
    assert!(store.contains("gho_mock"));
    assert!(!store.contains("oauth_callback_id"));
}

#[test]
fn test_callback_without_code_fails() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["auth", "callback", "--url", "https://example.com/?state=1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no code received"));
}

#[test]
fn test_callback_rejects_malformed_url() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["auth", "callback", "--url", "code=abc123"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("redirect URL is not valid"));
}

#[test]
fn test_project_submit_opens_issue() {
    let sandbox = Sandbox::new();
    sandbox.login();

    let output = sandbox
        .cmd()
        .args([
            "--format",
            "json",
            "project",
            "submit",
            "--name",
            "Site",
            "--url",
            "https://example.com",
            "--tags",
            "web, rust,web",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let receipt: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(receipt["issue"]["number"], 1);
    assert_eq!(receipt["submission"]["user"], "octocat");
    assert_eq!(receipt["submission"]["tags"], serde_json::json!(["web", "rust"]));

    let log = sandbox.call_log();
    assert!(log.contains("\"create_issue\""));
    assert!(log.contains("[Project Submission] Site"));
}

#[test]
fn test_tool_submit_from_directory() {
    let sandbox = Sandbox::new();
    sandbox.login();

    let tool_dir = sandbox.path().join("my-tool");
    fs::create_dir_all(tool_dir.join("assets")).unwrap();
    fs::write(tool_dir.join("index.html"), "<html></html>").unwrap();
    fs::write(tool_dir.join("app.js"), "console.log(1)").unwrap();
    fs::write(tool_dir.join("assets").join("logo.svg"), "<svg/>").unwrap();

    let output = sandbox
        .cmd()
        .args(["--format", "json", "tool", "submit", "--name", "My Tool", "--dir"])
        .arg(&tool_dir)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["fork_created"], true);
    assert_eq!(report["pull_request"]["number"], 1);
    assert!(report["branch"].as_str().unwrap().starts_with("tool/my-tool-"));
    assert_eq!(
        report["written"],
        serde_json::json!([
            "tools/my-tool/metadata.json",
            "tools/my-tool/README.md",
            "tools/my-tool/app.js",
            "tools/my-tool/index.html"
        ])
    );
    assert_eq!(report["submission"]["folder"], "my-tool");
}

#[test]
fn test_tool_submit_skips_oversized_files() {
    let sandbox = Sandbox::new();
    sandbox.login();

    let tool_dir = sandbox.path().join("big");
    fs::create_dir_all(&tool_dir).unwrap();
    fs::write(tool_dir.join("small.txt"), "ok").unwrap();
    fs::write(tool_dir.join("large.bin"), vec![0u8; 64]).unwrap();

    sandbox
        .cmd()
        .env("SHOWCASE_MAX_FILE_BYTES", "16")
        .args(["tool", "submit", "--name", "Big", "--dir"])
        .arg(&tool_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipped:"))
        .stdout(predicate::str::contains("large.bin (64 bytes, over size limit)"));

    assert!(!sandbox.call_log().contains("tools/big/large.bin"));
}

#[test]
fn test_tool_submit_failure_names_step() {
    let sandbox = Sandbox::with_fixture("[[failures]]\nmethod = \"create_branch\"\nstatus = 422\nmessage = \"Reference already exists\"\n");
    sandbox.login();

    sandbox
        .cmd()
        .args(["tool", "submit", "--name", "Picker", "--folder", "picker"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("create branch"))
        .stderr(predicate::str::contains("Reference already exists"));

    assert!(!sandbox.call_log().contains("create_pull_request"));
}

#[test]
fn test_unreadable_directory_falls_back() {
    let sandbox = Sandbox::new();
    sandbox.login();

    sandbox
        .cmd()
        .args([
            "tool",
            "submit",
            "--name",
            "Ghost",
            "--dir",
            "does-not-exist",
            "--folder",
            "ghost",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("without files"));
}

#[test]
fn test_project_list_empty_catalog() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["project", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No projects submitted yet."));
}

#[test]
fn test_project_list_reads_catalog() {
    let sandbox = Sandbox::with_fixture(
        r#"
[[files]]
path = "data/projects.json"
sha = "c1"
content = '[{"name": "Sample Project", "url": "https://github.com/username/sample-project", "tags": ["demo"], "timestamp": "2024-05-01T12:00:00Z", "user": "github_user"}, {"name": "Curated", "url": "https://example.com/curated", "description": "Added by hand"}]'
"#,
    );

    sandbox
        .cmd()
        .args(["project", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sample Project"))
        .stdout(predicate::str::contains("@github_user"))
        .stdout(predicate::str::contains("Added by hand"));
}

#[test]
fn test_settings_require_login() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["settings", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be logged in to manage settings"));
}

#[test]
fn test_settings_round_trip_and_disconnect() {
    let sandbox = Sandbox::new();
    sandbox.login();

    sandbox
        .cmd()
        .args(["settings", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Display name: The Octocat"));

    sandbox
        .cmd()
        .args(["settings", "set", "--theme", "dark", "--scope", "gist"])
        .assert()
        .success()
        .stdout(predicate::str::contains("bg-color #24292e"));

    let output = sandbox
        .cmd()
        .args(["--format", "json", "settings", "show"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let view: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(view["theme"], "dark");
    assert_eq!(view["dark"], true);
    assert_eq!(view["additionalScopes"], serde_json::json!(["gist"]));

    sandbox
        .cmd()
        .args(["settings", "disconnect"])
        .assert()
        .success();

    let store = fs::read_to_string(sandbox.path().join("data").join("store.json")).unwrap();
    assert!(!store.contains("github-auth-settings-1"));
    assert!(!store.contains("github_token"));
}

#[test]
fn test_system_theme_follows_terminal_scheme() {
    let sandbox = Sandbox::new();
    sandbox.login();

    sandbox
        .cmd()
        .args(["settings", "set", "--theme", "system"])
        .assert()
        .success();

    sandbox
        .cmd()
        .env("SHOWCASE_COLOR_SCHEME", "dark")
        .args(["settings", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Theme: system (dark)"));

    sandbox
        .cmd()
        .env("SHOWCASE_COLOR_SCHEME", "light")
        .args(["settings", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Theme: system\n"));
}

#[test]
fn test_config_path_lists_local_file() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("showcase.toml"))
        .stdout(predicate::str::contains("Data directory:"));
}

#[test]
fn test_config_show_reflects_file_and_env() {
    let sandbox = Sandbox::new();
    fs::write(
        sandbox.path().join("showcase.toml"),
        "owner = \"acme\"\nrepo = \"gallery\"\n",
    )
    .unwrap();

    sandbox
        .cmd()
        .env("SHOWCASE_POLL_ATTEMPTS", "4")
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("owner = \"acme\""))
        .stdout(predicate::str::contains("poll_attempts = 4"));
}

#[test]
fn test_missing_config_file() {
    let sandbox = Sandbox::new();

    sandbox
        .cmd()
        .args(["--config", "nope.toml", "config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn test_completions() {
    cargo_bin_cmd!("showcase")
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("showcase"));
}
