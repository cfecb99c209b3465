use assert_cmd::Command;
use predicates::str;
use serde_json::Value;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use tempfile::TempDir;

static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

fn setup_test_env() -> (TempDir, PathBuf) {
    let data_dir = TempDir::new().unwrap();
    let counter = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    let config_path = env::temp_dir().join(format!(
        "vve_projects_test_config_{}_{}.toml",
        std::process::id(),
        counter
    ));

    if config_path.exists() {
        fs::remove_file(&config_path).ok();
    }

    (data_dir, config_path)
}

fn vve(data_dir: &TempDir, config_path: &PathBuf) -> Command {
    let mut cmd = Command::cargo_bin("vve").unwrap();
    cmd.env("VVE_CONFIG_PATH", config_path)
        .env("VVE_DATA_DIR", data_dir.path())
        .env("VVE_STAGE_DELAY_MS", "0");
    cmd
}

fn cleanup_test_config(config_path: &PathBuf) {
    if config_path.exists() {
        fs::remove_file(config_path).ok();
    }
}

fn analyze_fixture(data_dir: &TempDir, config_path: &PathBuf) -> String {
    let video_path = data_dir.path().join("demo.mp4");
    fs::write(&video_path, b"fake video content").unwrap();

    let mut cmd = vve(data_dir, config_path);
    cmd.args(["analyze", &video_path.to_string_lossy(), "--json"]);

    let output = cmd.assert().success();
    let json: Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
    json["id"].as_str().unwrap().to_string()
}

#[test]
fn test_projects_list_empty() {
    let (data_dir, config_path) = setup_test_env();

    let mut cmd = vve(&data_dir, &config_path);
    cmd.args(["projects", "list"]);
    cmd.assert().success().stdout("");

    cleanup_test_config(&config_path);
}

#[test]
fn test_projects_list_shows_analyzed_project() {
    let (data_dir, config_path) = setup_test_env();
    let project_id = analyze_fixture(&data_dir, &config_path);

    let mut cmd = vve(&data_dir, &config_path);
    cmd.args(["projects", "list"]);
    cmd.assert()
        .success()
        .stdout(str::contains(&project_id))
        .stdout(str::contains("demo"));

    cleanup_test_config(&config_path);
}

#[test]
fn test_projects_show_details() {
    let (data_dir, config_path) = setup_test_env();
    let project_id = analyze_fixture(&data_dir, &config_path);

    let mut cmd = vve(&data_dir, &config_path);
    cmd.args(["projects", "show", &project_id]);
    cmd.assert()
        .success()
        .stdout(str::contains("name:       demo"))
        .stdout(str::contains("transcript: 4 segments (mock)"));

    cleanup_test_config(&config_path);
}

#[test]
fn test_projects_show_unknown_id() {
    let (data_dir, config_path) = setup_test_env();

    let mut cmd = vve(&data_dir, &config_path);
    cmd.args(["projects", "show", "no-such-id"]);
    cmd.assert()
        .failure()
        .stderr(str::contains("No project with id"));

    cleanup_test_config(&config_path);
}

#[test]
fn test_projects_save_stamps_timestamp() {
    let (data_dir, config_path) = setup_test_env();
    let project_id = analyze_fixture(&data_dir, &config_path);

    let mut cmd = vve(&data_dir, &config_path);
    cmd.args(["projects", "save", &project_id]);
    cmd.assert()
        .success()
        .stdout(str::contains(format!("Saved project {}", project_id)));

    cleanup_test_config(&config_path);
}

#[test]
fn test_projects_delete_with_yes_flag() {
    let (data_dir, config_path) = setup_test_env();
    let project_id = analyze_fixture(&data_dir, &config_path);

    let mut delete = vve(&data_dir, &config_path);
    delete.args(["projects", "delete", &project_id, "--yes"]);
    delete
        .assert()
        .success()
        .stdout(format!("Deleted project {}\n", project_id));

    let mut show = vve(&data_dir, &config_path);
    show.args(["projects", "show", &project_id]);
    show.assert()
        .failure()
        .stderr(str::contains("No project with id"));

    cleanup_test_config(&config_path);
}

#[test]
fn test_projects_scan_registers_videos() {
    let (data_dir, config_path) = setup_test_env();

    let scan_dir = TempDir::new().unwrap();
    fs::write(scan_dir.path().join("first.mp4"), b"fake").unwrap();
    fs::write(scan_dir.path().join("second.mov"), b"fake").unwrap();
    fs::write(scan_dir.path().join("notes.txt"), b"not a video").unwrap();

    let mut cmd = vve(&data_dir, &config_path);
    cmd.args(["projects", "scan", &scan_dir.path().to_string_lossy()]);
    cmd.assert()
        .success()
        .stdout(str::contains("Registered 2 new project(s)"));

    // A second scan finds nothing new
    let mut rescan = vve(&data_dir, &config_path);
    rescan.args(["projects", "scan", &scan_dir.path().to_string_lossy()]);
    rescan
        .assert()
        .success()
        .stdout(str::contains("Registered 0 new project(s)"));

    cleanup_test_config(&config_path);
}

#[test]
fn test_projects_scan_with_filter() {
    let (data_dir, config_path) = setup_test_env();

    let scan_dir = TempDir::new().unwrap();
    fs::write(scan_dir.path().join("demo_take1.mp4"), b"fake").unwrap();
    fs::write(scan_dir.path().join("other.mp4"), b"fake").unwrap();

    let mut cmd = vve(&data_dir, &config_path);
    cmd.args([
        "projects",
        "scan",
        &scan_dir.path().to_string_lossy(),
        "-f",
        "*demo*",
    ]);
    cmd.assert()
        .success()
        .stdout(str::contains("Registered 1 new project(s)"))
        .stdout(str::contains("demo_take1"));

    cleanup_test_config(&config_path);
}

#[test]
fn test_export_writes_placeholder_output() {
    let (data_dir, config_path) = setup_test_env();
    let project_id = analyze_fixture(&data_dir, &config_path);

    let mut cmd = vve(&data_dir, &config_path);
    cmd.args(["export", &project_id]);
    cmd.assert()
        .success()
        .stdout(str::contains("Exported to"))
        .stdout(str::contains("_energetic.mp4"));

    // The mock export copies the source video bytes
    let exported = data_dir
        .path()
        .join("exports")
        .join(format!("{}_energetic.mp4", project_id));
    assert_eq!(fs::read(&exported).unwrap(), b"fake video content");

    cleanup_test_config(&config_path);
}

#[test]
fn test_export_format_flag_changes_extension() {
    let (data_dir, config_path) = setup_test_env();
    let project_id = analyze_fixture(&data_dir, &config_path);

    let mut cmd = vve(&data_dir, &config_path);
    cmd.args(["export", &project_id, "--format", "webm", "--quality", "5"]);
    cmd.assert()
        .success()
        .stdout(str::contains("_energetic.webm"));

    cleanup_test_config(&config_path);
}

#[test]
fn test_export_rejects_out_of_range_quality() {
    let (data_dir, config_path) = setup_test_env();
    let project_id = analyze_fixture(&data_dir, &config_path);

    let mut cmd = vve(&data_dir, &config_path);
    cmd.args(["export", &project_id, "--quality", "15"]);
    cmd.assert()
        .failure()
        .stderr(str::contains("quality must be between 1 and 10"));

    cleanup_test_config(&config_path);
}

#[test]
fn test_stats_empty_library() {
    let (data_dir, config_path) = setup_test_env();

    let mut cmd = vve(&data_dir, &config_path);
    cmd.args(["stats"]);
    cmd.assert()
        .success()
        .stdout(str::contains("Projects:            0"))
        .stdout(str::contains("Avg vibe confidence: n/a"));

    cleanup_test_config(&config_path);
}

#[test]
fn test_stats_after_analysis() {
    let (data_dir, config_path) = setup_test_env();
    analyze_fixture(&data_dir, &config_path);

    let mut cmd = vve(&data_dir, &config_path);
    cmd.args(["stats", "--json"]);

    let output = cmd.assert().success();
    let json: Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
    assert_eq!(json["total_projects"], 1);
    assert_eq!(json["transcribed_projects"], 1);
    assert_eq!(json["completed_exports"], 0);
    assert_eq!(json["vibe_distribution"]["energetic"], 1);

    cleanup_test_config(&config_path);
}

#[test]
fn test_suggest_known_vibe() {
    let mut cmd = Command::cargo_bin("vve").unwrap();
    cmd.args(["suggest", "calm"]);
    cmd.assert()
        .success()
        .stdout(str::contains("Editing tips:"));
}

#[test]
fn test_suggest_unknown_vibe() {
    let mut cmd = Command::cargo_bin("vve").unwrap();
    cmd.args(["suggest", "sparkly"]);
    cmd.assert()
        .failure()
        .stderr(str::contains("Unknown vibe: sparkly"));
}

#[test]
fn test_models_list_marks_current() {
    let (data_dir, config_path) = setup_test_env();

    let mut cmd = vve(&data_dir, &config_path);
    cmd.args(["models", "list"]);
    cmd.assert()
        .success()
        .stdout(str::contains("ggml-base.bin"))
        .stdout(str::contains("[current]"));

    cleanup_test_config(&config_path);
}

#[test]
fn test_tools_list_names_all_tools() {
    let (data_dir, config_path) = setup_test_env();

    let mut cmd = vve(&data_dir, &config_path);
    cmd.args(["tools", "list"]);
    cmd.assert()
        .success()
        .stdout(str::contains("ffmpeg"))
        .stdout(str::contains("ffprobe"))
        .stdout(str::contains("whisper-cli"));

    cleanup_test_config(&config_path);
}

#[test]
fn test_version_command() {
    let mut cmd = Command::cargo_bin("vve").unwrap();
    cmd.args(["version"]);
    cmd.assert().success().stdout(str::starts_with("vve "));
}
