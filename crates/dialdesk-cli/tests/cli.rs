use assert_cmd::cargo::cargo_bin_cmd;
use dialdesk_store::Store;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::process::Output;
use tempfile::TempDir;

fn run_raw(temp: &TempDir, args: &[&str]) -> Output {
    let db_path = temp.path().join("dialdesk.sqlite3");
    cargo_bin_cmd!("dialdesk")
        .env("XDG_CONFIG_HOME", temp.path().join("config"))
        .env_remove("RUST_LOG")
        .args(["--db-path", db_path.to_str().expect("db path")])
        .args(args)
        .output()
        .expect("run command")
}

fn run_cmd(temp: &TempDir, args: &[&str]) -> String {
    let output = run_raw(temp, args);
    assert!(output.status.success(), "command failed: {:?}", output);
    String::from_utf8(output.stdout).expect("utf8")
}

fn run_cmd_json(temp: &TempDir, args: &[&str]) -> Value {
    let mut full = vec!["--json"];
    full.extend_from_slice(args);
    let output = run_raw(temp, &full);
    assert!(output.status.success(), "command failed: {:?}", output);
    serde_json::from_slice(&output.stdout).expect("parse json")
}

fn exit_code(temp: &TempDir, args: &[&str]) -> i32 {
    run_raw(temp, args).status.code().expect("exit code")
}

#[test]
fn cli_import_next_finalize_flow() {
    let temp = TempDir::new().expect("temp dir");

    let report = run_cmd_json(
        &temp,
        &[
            "import", "--org", "acme", "--agent", "agent-a", "+1 555 0100", "555-0101",
            "555 0101", "nope",
        ],
    );
    assert_eq!(report["created"], 2);
    assert_eq!(report["duplicates"], 1);
    assert_eq!(report["rejected"].as_array().expect("array").len(), 1);

    let leased = run_cmd_json(&temp, &["next", "--org", "acme", "--agent", "agent-a"]);
    assert_eq!(leased["state"]["status"], "dialing");
    assert_eq!(leased["state"]["agent"], "agent-a");
    assert_eq!(leased["attempts"], 1);
    let id = leased["id"].as_str().expect("id").to_string();

    let finalized = run_cmd_json(
        &temp,
        &[
            "finalize",
            &id,
            "--agent",
            "agent-a",
            "--disposition",
            "No Answer",
            "--call-log",
            "CA42",
        ],
    );
    assert_eq!(finalized["state"]["status"], "completed");
    assert_eq!(finalized["disposition"], "No Answer");
    assert_eq!(finalized["call_log_id"], "CA42");

    let detail = run_cmd_json(&temp, &["show", &id]);
    assert_eq!(detail["eligibility"], "completed");
    assert_eq!(detail["phone_number"], finalized["phone_number"]);

    let stats = run_cmd_json(&temp, &["stats", "--org", "acme"]);
    assert_eq!(stats["completed"], 1);
    assert_eq!(stats["pending"], 1);
    assert_eq!(stats["total"], 2);
}

#[test]
fn cli_next_reports_empty_queue() {
    let temp = TempDir::new().expect("temp dir");
    let leased = run_cmd_json(&temp, &["next", "--org", "acme", "--agent", "agent-a"]);
    assert!(leased.is_null());

    let text = run_cmd(&temp, &["next", "--org", "acme", "--agent", "agent-a"]);
    assert!(text.contains("no eligible record"));
}

#[test]
fn cli_release_guards_ownership() {
    let temp = TempDir::new().expect("temp dir");
    run_cmd(
        &temp,
        &["import", "--org", "acme", "--agent", "agent-a", "5550100"],
    );
    let leased = run_cmd_json(&temp, &["next", "--org", "acme", "--agent", "agent-a"]);
    let id = leased["id"].as_str().expect("id").to_string();

    assert_eq!(exit_code(&temp, &["release", &id, "--agent", "agent-b"]), 2);
    assert_eq!(
        exit_code(
            &temp,
            &["finalize", &id, "--agent", "agent-b", "--disposition", "Sale"]
        ),
        2
    );

    let released = run_cmd_json(
        &temp,
        &["release", &id, "--agent", "agent-a", "--status", "busy"],
    );
    assert_eq!(released["state"]["status"], "busy");
    assert_eq!(released["attempts"], 1);

    assert_eq!(exit_code(&temp, &["release", &id, "--agent", "agent-a"]), 2);
}

#[test]
fn cli_rejects_bad_input() {
    let temp = TempDir::new().expect("temp dir");
    assert_eq!(exit_code(&temp, &["show", "not-a-uuid"]), 3);
    assert_eq!(
        exit_code(&temp, &["show", "6f1d8e1c-3b0a-4c59-9a53-2f0c8d1a7e11"]),
        2
    );
    assert_eq!(exit_code(&temp, &["next", "--org", "acme"]), 3);
    assert_eq!(
        exit_code(
            &temp,
            &[
                "release",
                "6f1d8e1c-3b0a-4c59-9a53-2f0c8d1a7e11",
                "--agent",
                "agent-a",
                "--status",
                "pending"
            ]
        ),
        3
    );
}

#[test]
fn cli_import_reads_file_and_lists() {
    let temp = TempDir::new().expect("temp dir");
    let list_path = temp.path().join("numbers.txt");
    fs::write(&list_path, "# morning batch\n555-0100\n\n555-0101\n").expect("write list");

    let report = run_cmd_json(
        &temp,
        &[
            "import",
            "--org",
            "acme",
            "--agent",
            "agent-a",
            "--priority",
            "5",
            "--file",
            list_path.to_str().expect("path"),
        ],
    );
    assert_eq!(report["created"], 2);

    let records = run_cmd_json(
        &temp,
        &["list", "--org", "acme", "--agent", "agent-a", "--status", "pending"],
    );
    let items = records.as_array().expect("array");
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|item| item["priority"] == 5));
}

#[cfg(unix)]
fn write_private(path: &Path, contents: &str) {
    use std::os::unix::fs::PermissionsExt;
    fs::write(path, contents).expect("write config");
    fs::set_permissions(path, fs::Permissions::from_mode(0o600)).expect("chmod");
}

#[cfg(unix)]
#[test]
fn cli_uses_agent_defaults_and_attempt_cap_from_config() {
    let temp = TempDir::new().expect("temp dir");
    let config_path = temp.path().join("dialdesk.toml");
    write_private(
        &config_path,
        "max_attempts = 1\n\n[agent]\nid = \"agent-a\"\norganization = \"acme\"\n",
    );
    let config = config_path.to_str().expect("config path");

    run_cmd(&temp, &["--config", config, "import", "5550100"]);
    let leased = run_cmd_json(&temp, &["--config", config, "next"]);
    let id = leased["id"].as_str().expect("id").to_string();
    run_cmd(&temp, &["--config", config, "release", &id]);

    let again = run_cmd_json(&temp, &["--config", config, "next"]);
    assert!(again.is_null());

    let per_agent = run_cmd_json(&temp, &["--config", config, "stats", "--per-agent"]);
    let rows = per_agent.as_array().expect("array");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["agent"], "agent-a");
    assert_eq!(rows[0]["pending"], 1);
}

#[cfg(unix)]
#[test]
fn cli_reports_busy_store_as_unavailable() {
    let temp = TempDir::new().expect("temp dir");
    let config_path = temp.path().join("dialdesk.toml");
    write_private(&config_path, "[store]\nbusy_timeout_ms = 50\n");
    let config = config_path.to_str().expect("config path");

    run_cmd(
        &temp,
        &["--config", config, "import", "--org", "acme", "--agent", "agent-a", "5550100"],
    );

    let holder = Store::open(&temp.path().join("dialdesk.sqlite3")).expect("open store");
    holder
        .connection()
        .execute_batch("BEGIN IMMEDIATE;")
        .expect("take write lock");

    let output = run_raw(
        &temp,
        &["--config", config, "next", "--org", "acme", "--agent", "agent-a"],
    );
    assert_eq!(output.status.code(), Some(4), "output: {:?}", output);
    let stderr = String::from_utf8(output.stderr).expect("utf8");
    assert!(stderr.contains("unavailable"), "stderr: {stderr}");

    let stats = run_cmd_json(&temp, &["--config", config, "stats", "--org", "acme"]);
    assert_eq!(stats["pending"], 1);

    holder
        .connection()
        .execute_batch("ROLLBACK;")
        .expect("drop write lock");
    let leased = run_cmd_json(
        &temp,
        &["--config", config, "next", "--org", "acme", "--agent", "agent-a"],
    );
    assert_eq!(leased["attempts"], 1);
}

#[test]
fn cli_help_describes_every_command() {
    let temp = TempDir::new().expect("temp dir");
    let help = run_cmd(&temp, &["--help"]);
    for line in [
        "import    Load phone numbers",
        "next      Lease the next eligible record",
        "release   Give a leased record back",
        "finalize  Record the call outcome",
        "show      Show one record",
        "list      List an agent's records",
        "stats     Count records per status",
    ] {
        assert!(help.contains(line), "missing {line:?} in help:\n{help}");
    }
}
