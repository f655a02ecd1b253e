//! Integration tests for planbench
//!
//! These drive the binary end to end against fake planners written as
//! `/bin/sh` scripts inside a temporary project.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a planbench Command rooted in `dir`
fn planbench(dir: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("planbench");
    cmd.current_dir(dir).env_remove("TIMEOUT_S").env_remove("RUST_LOG");
    cmd
}

/// Helper to create a temporary project directory
fn create_temp_project() -> TempDir {
    TempDir::new().unwrap()
}

const MCTS_SCRIPT: &str = r#"#!/bin/sh
case "$2" in
  *p02.pddl) echo "MCTS search exhausted, no plan"; exit 1 ;;
esac
echo "0: (pick ball1 rooma left)"
echo "MCTS succeeded, plan found (9 steps)."
"#;

const ASTAR_SCRIPT: &str = r#"#!/bin/sh
echo "0: (pick ball1 rooma left)"
echo "1: (move rooma roomb)"
echo "search succeeded, plan found"
"#;

const BENCH_TOML: &str = r#"
[harness]
timeout_s = 10
domains = ["gripper", "missing"]
problems_per_domain = 2

[[planners]]
kind = "mcts"
program = "/bin/sh"
prefix_args = ["mcts.sh"]
args = ["-t", "{timeout}"]

[[planners]]
kind = "astar"
program = "/bin/sh"
prefix_args = ["astar.sh"]
extractors = ["step-count"]
"#;

/// Helper to lay out a project with fake planners and one domain
fn create_bench_project() -> TempDir {
    let dir = create_temp_project();
    let root = dir.path();
    fs::write(root.join("planbench.toml"), BENCH_TOML).unwrap();
    fs::write(root.join("mcts.sh"), MCTS_SCRIPT).unwrap();
    fs::write(root.join("astar.sh"), ASTAR_SCRIPT).unwrap();

    let gripper = root.join("tp_domains").join("gripper");
    fs::create_dir_all(&gripper).unwrap();
    fs::write(gripper.join("domain.pddl"), "(define (domain gripper))").unwrap();
    for p in ["p03.pddl", "p01.pddl", "p02.pddl"] {
        fs::write(gripper.join(p), "(define (problem x))").unwrap();
    }
    dir
}

// =============================================================================
// Basic CLI Tests
// =============================================================================

mod cli_basics {
    use super::*;

    #[test]
    fn test_planbench_help() {
        let dir = create_temp_project();
        planbench(dir.path())
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("run"))
            .stdout(predicate::str::contains("summarize"));
    }

    #[test]
    fn test_planbench_version() {
        let dir = create_temp_project();
        planbench(dir.path()).arg("--version").assert().success();
    }

    #[test]
    fn test_unknown_command_fails() {
        let dir = create_temp_project();
        planbench(dir.path()).arg("frobnicate").assert().failure();
    }
}

// =============================================================================
// Config Tests
// =============================================================================

mod config_commands {
    use super::*;

    #[test]
    fn test_config_init_creates_file() {
        let dir = create_temp_project();
        planbench(dir.path())
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Created planbench.toml"));

        let content = fs::read_to_string(dir.path().join("planbench.toml")).unwrap();
        assert!(content.contains("timeout_s = 300"));
        assert!(content.contains("blocksworld"));
    }

    #[test]
    fn test_config_init_does_not_overwrite() {
        let dir = create_temp_project();
        fs::write(dir.path().join("planbench.toml"), "[harness]\ntimeout_s = 5\n").unwrap();

        planbench(dir.path())
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("already exists"));

        let content = fs::read_to_string(dir.path().join("planbench.toml")).unwrap();
        assert_eq!(content, "[harness]\ntimeout_s = 5\n");
    }

    #[test]
    fn test_config_show_defaults() {
        let dir = create_temp_project();
        planbench(dir.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("timeout_s = 300"))
            .stdout(predicate::str::contains("MCTS"))
            .stdout(predicate::str::contains("A*"));
    }

    #[test]
    fn test_config_show_applies_timeout_env() {
        let dir = create_temp_project();
        planbench(dir.path())
            .env("TIMEOUT_S", "42")
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Effective values"))
            .stdout(predicate::str::contains("timeout_s = 42"));
    }

    #[test]
    fn test_config_validate_reports_warnings() {
        let dir = create_temp_project();
        fs::write(
            dir.path().join("planbench.toml"),
            "[harness]\ntimeout_s = 0\nproblems_per_domain = 0\n",
        )
        .unwrap();

        planbench(dir.path())
            .args(["config", "validate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration warnings"))
            .stdout(predicate::str::contains("timeout_s is 0"));
    }

    #[test]
    fn test_invalid_planner_kind_is_fatal() {
        let dir = create_temp_project();
        fs::write(
            dir.path().join("planbench.toml"),
            "[[planners]]\nkind = \"bfs\"\nprogram = \"bfs\"\n",
        )
        .unwrap();

        planbench(dir.path())
            .arg("run")
            .assert()
            .failure()
            .stderr(predicate::str::contains("planbench.toml"));
    }
}

// =============================================================================
// Sweep Tests
// =============================================================================

#[cfg(unix)]
mod sweep {
    use super::*;

    #[test]
    fn test_run_writes_results_logs_and_manifest() {
        let dir = create_bench_project();
        let root = dir.path();

        planbench(root)
            .arg("run")
            .assert()
            .success()
            .stdout(predicate::str::contains("4 runs, 3 succeeded, 0 timed out"))
            .stdout(predicate::str::contains("Skipped domains"))
            .stdout(predicate::str::contains("results.csv"));

        let results = fs::read_to_string(root.join("results.csv")).unwrap();
        let lines: Vec<_> = results.lines().collect();
        assert_eq!(lines[0], "domain,problem,planner,success,time_s,plan_len");
        assert_eq!(lines.len(), 5);
        assert!(lines[1].starts_with("gripper,p01.pddl,MCTS,true,"));
        assert!(lines[1].ends_with(",9"));
        assert!(lines[2].starts_with("gripper,p01.pddl,A*,true,"));
        assert!(lines[2].ends_with(",2"));
        assert!(lines[3].starts_with("gripper,p02.pddl,MCTS,false,"));
        assert!(lines[3].ends_with(",NA"));
        assert!(lines[4].starts_with("gripper,p02.pddl,A*,true,"));

        let logs = root.join("runs_logs");
        assert!(logs.join("gripper__p01.pddl__MCTS.log").exists());
        assert!(logs.join("gripper__p02.pddl__ASTAR.log").exists());
        assert!(!logs.join("gripper__p03.pddl__MCTS.log").exists());

        let mcts_log = fs::read_to_string(logs.join("gripper__p02.pddl__MCTS.log")).unwrap();
        assert!(mcts_log.contains("no plan"));
        assert!(mcts_log.contains("exited with code 1"));

        let manifest = fs::read_to_string(root.join("sweep-manifest.json")).unwrap();
        assert!(manifest.contains("\"attempted\": 4"));
        assert!(manifest.contains("\"missing\""));
    }

    #[test]
    fn test_run_cli_overrides() {
        let dir = create_bench_project();
        let root = dir.path();

        planbench(root)
            .args(["run", "--domains", "gripper", "--problems", "1", "--out-dir", "out"])
            .assert()
            .success()
            .stdout(predicate::str::contains("2 runs, 2 succeeded"));

        let results = fs::read_to_string(root.join("out").join("results.csv")).unwrap();
        assert_eq!(results.lines().count(), 3);
        assert!(root.join("out").join("runs_logs").is_dir());
        assert!(!root.join("results.csv").exists());
    }

    #[test]
    fn test_run_with_relative_project_dir() {
        let parent = create_temp_project();
        let project = parent.path().join("bench");
        fs::create_dir(&project).unwrap();
        let bench = create_bench_project();
        for entry in ["planbench.toml", "mcts.sh", "astar.sh"] {
            fs::copy(bench.path().join(entry), project.join(entry)).unwrap();
        }
        let gripper = project.join("tp_domains").join("gripper");
        fs::create_dir_all(&gripper).unwrap();
        for entry in ["domain.pddl", "p01.pddl", "p02.pddl"] {
            fs::copy(bench.path().join("tp_domains/gripper").join(entry), gripper.join(entry)).unwrap();
        }
        // fails the run unless both paths resolve from the planner's working dir
        fs::write(
            project.join("astar.sh"),
            "#!/bin/sh\n[ -f \"$1\" ] && [ -f \"$2\" ] || { echo \"MISSING FILES $1 $2\"; exit 2; }\n\
             echo \"0: (move a b)\"\necho \"search succeeded, plan found\"\n",
        )
        .unwrap();

        planbench(parent.path())
            .args(["--project-dir", "bench", "run", "--problems", "1"])
            .assert()
            .success()
            .stdout(predicate::str::contains("2 runs, 2 succeeded"));

        let results = fs::read_to_string(project.join("results.csv")).unwrap();
        assert!(results.contains("gripper,p01.pddl,A*,true,"));
        let log = fs::read_to_string(project.join("runs_logs").join("gripper__p01.pddl__ASTAR.log")).unwrap();
        assert!(!log.contains("MISSING FILES"));
        assert!(!parent.path().join("results.csv").exists());
    }

    #[test]
    fn test_run_rejects_duplicate_domains() {
        let dir = create_bench_project();
        planbench(dir.path())
            .args(["run", "--domains", "gripper,gripper"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("'gripper' is listed more than once"));
        assert!(!dir.path().join("results.csv").exists());
    }

    #[test]
    fn test_summarize_after_run() {
        let dir = create_bench_project();
        let root = dir.path();

        planbench(root).arg("run").assert().success();
        planbench(root)
            .arg("summarize")
            .assert()
            .success()
            .stdout(predicate::str::contains("Results by domain and planner"))
            .stdout(predicate::str::contains("Summary written to"));

        let summary = fs::read_to_string(root.join("summary.csv")).unwrap();
        let lines: Vec<_> = summary.lines().collect();
        assert_eq!(
            lines[0],
            "domain,planner,n_runs,success_rate,mean_time,median_time,mean_plan_len,median_plan_len"
        );
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("gripper,MCTS,2,0.5000,"));
        assert!(lines[1].ends_with(",9.0000,9.0000"));
        assert!(lines[2].starts_with("gripper,A*,2,1.0000,"));
    }

    #[test]
    fn test_summarize_missing_input_fails() {
        let dir = create_temp_project();
        planbench(dir.path())
            .args(["summarize", "--input", "nope.csv"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("nope.csv"));
    }
}
