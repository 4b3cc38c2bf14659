use std::process::Command;

#[test]
fn bundled_scenario_runs_to_completion() {
    let scenario = concat!(env!("CARGO_MANIFEST_DIR"), "/scenarios/forked_lanes.toml");
    let output = Command::new(env!("CARGO_BIN_EXE_waypoint-defence"))
        .args(["--scenario", scenario, "--log", "warn"])
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to launch waypoint-defence binary");

    assert!(
        output.status.success(),
        "scenario run failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("6 of 6 agents finished"), "unexpected summary:\n{stdout}");
}

#[test]
fn missing_scenario_reports_an_error() {
    let output = Command::new(env!("CARGO_BIN_EXE_waypoint-defence"))
        .args(["--scenario", "does/not/exist.toml"])
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to launch waypoint-defence binary");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed to read scenario"));
}
