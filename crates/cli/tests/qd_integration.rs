//! End-to-end tests for the `qd` binary

mod common;

use anyhow::Result;
use tempfile::TempDir;

#[test]
fn test_replay_trailing_burst_collapses() -> Result<()> {
    let dir = TempDir::new()?;
    let result = qd!(
        dir.path(),
        "replay",
        "--wait",
        "100",
        "--max-wait",
        "100",
        "--leading",
        "false",
        "--schedule",
        "0,10,20"
    )
    .assert_success()?;

    assert_eq!(result.invoked_queries(), vec!["3"]);
    assert!(result.stdout.contains("3 calls collapsed into 1 invocations"));
    Ok(())
}

#[test]
fn test_replay_demo_schedule() -> Result<()> {
    let dir = TempDir::new()?;
    let result = qd!(dir.path(), "replay").assert_success()?;

    assert_eq!(result.invoked_queries(), vec!["1", "4", "5", "6"]);
    assert!(result.duration.as_millis() >= 3000);
    Ok(())
}

#[test]
fn test_replay_uses_config_file() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("debounce.toml");
    std::fs::write(&path, "wait_ms = 50\nleading = true\ntrailing = false\n")?;

    let result = qd!(
        dir.path(),
        "replay",
        "--config",
        path.to_str().unwrap(),
        "--schedule",
        "0,10,20"
    )
    .assert_success()?;

    assert_eq!(result.invoked_queries(), vec!["1"]);
    Ok(())
}

#[test]
fn test_replay_rejects_bad_schedule() -> Result<()> {
    let dir = TempDir::new()?;
    let result = qd!(dir.path(), "replay", "--schedule", "300,100").assert_failure()?;

    assert!(result.invoked_queries().is_empty());
    Ok(())
}

#[test]
fn test_config_example_is_valid() -> Result<()> {
    let dir = TempDir::new()?;
    let result = qd!(dir.path(), "config", "example").assert_success()?;
    assert!(result.stdout.contains("wait_ms"));

    let path = dir.path().join("example.toml");
    std::fs::write(&path, &result.stdout)?;
    qd!(dir.path(), "config", "check", path.to_str().unwrap()).assert_success()?;
    Ok(())
}

#[test]
fn test_config_check_rejects_negative_wait() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "wait_ms = -5\n")?;

    let result = qd!(dir.path(), "config", "check", path.to_str().unwrap()).assert_failure()?;
    assert!(result.contains_stderr("non-negative"));
    Ok(())
}
