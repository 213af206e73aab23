//! Common utilities for integration tests

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use goal_planner::project::ProjectContext;

/// Get the path to the `gp` binary
///
/// Uses `CARGO_BIN_EXE_gp` when cargo sets it (custom target directories),
/// and falls back to `cargo_bin()` otherwise.
#[allow(deprecated, dead_code)]
pub fn gp_binary() -> PathBuf {
    std::env::var("CARGO_BIN_EXE_gp")
        .map(PathBuf::from)
        .unwrap_or_else(|_| assert_cmd::cargo::cargo_bin("gp"))
}

/// A `gp` command isolated to `project_dir`.
///
/// HOME points nowhere so the home-directory fallback never finds a real
/// project, and log output is silenced.
#[allow(dead_code)]
pub fn gp_command(project_dir: &Path) -> Command {
    let mut cmd = Command::new(gp_binary());
    cmd.current_dir(project_dir)
        .env("HOME", "/nonexistent")
        .env("USERPROFILE", "/nonexistent")
        .env("GOAL_PLANNER_DIR", project_dir)
        .env_remove("GOAL_PLANNER_LOG_FILE")
        .env_remove("RUST_LOG");
    cmd
}

/// Run `gp` with `args` plus `--format json` and parse stdout.
#[allow(dead_code)]
pub fn gp_json(project_dir: &Path, args: &[&str]) -> serde_json::Value {
    let output = gp_command(project_dir)
        .args(args)
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "gp {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

/// A fresh temporary project directory.
#[allow(dead_code)]
pub fn setup_test_env() -> TempDir {
    TempDir::new().unwrap()
}

/// Open a project database directly in a temporary directory.
#[allow(dead_code)]
pub async fn open_project() -> (TempDir, ProjectContext) {
    let dir = TempDir::new().unwrap();
    let ctx = ProjectContext::open_at(dir.path()).await.unwrap();
    (dir, ctx)
}
