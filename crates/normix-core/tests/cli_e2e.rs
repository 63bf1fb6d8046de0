//! End-to-end tests for the normix binary.
//!
//! Every test runs against an explicit (empty) config file so a user's
//! own configuration cannot leak in.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let ws = Self {
            dir: TempDir::new().expect("temp dir"),
        };
        ws.write("config.toml", "");
        ws
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, content).expect("write input");
        path
    }

    fn path(&self, name: &str) -> String {
        self.dir.path().join(name).display().to_string()
    }

    fn normix(&self) -> Command {
        let mut cmd = Command::cargo_bin("normix").expect("normix binary should exist");
        cmd.env_remove("NORMIX_LOG")
            .env_remove("NORMIX_LOG_FORMAT")
            .env_remove("RUST_LOG")
            .arg("--config")
            .arg(self.path("config.toml"))
            .arg("--quiet");
        cmd
    }
}

fn stdout_json(output: &[u8]) -> serde_json::Value {
    serde_json::from_slice(output).expect("stdout is JSON")
}

const STANDARD_NORMAL: &str = r#"{"weights": [1.0], "mu": [0.0], "tau2": [1.0]}"#;
const SEPARATED: &str = r#"{"weights": [1, 1], "mu": [-10, 10], "tau2": [1, 1]}"#;

mod densities {
    use super::*;

    #[test]
    fn density_of_standard_normal_at_zero() {
        let ws = Workspace::new();
        ws.write("m.json", STANDARD_NORMAL);
        ws.write("y.txt", "0\n");

        let output = ws
            .normix()
            .args(["density", "--mixture", &ws.path("m.json"), "--values", &ws.path("y.txt")])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let json = stdout_json(&output);
        assert_eq!(json["command"], "density");
        let d = json["density"][0].as_f64().unwrap();
        assert!((d - 0.398_942_280_401_432_7).abs() < 1e-12);
    }

    #[test]
    fn density_rejects_nan_values() {
        let ws = Workspace::new();
        ws.write("m.json", STANDARD_NORMAL);
        ws.write("y.txt", "0\nNaN\n");

        ws.normix()
            .args(["density", "--mixture", &ws.path("m.json"), "--values", &ws.path("y.txt")])
            .assert()
            .code(11)
            .stderr(predicate::str::contains("y[1] is not finite"));
    }

    #[test]
    fn marginal_rejects_mismatched_noise() {
        let ws = Workspace::new();
        ws.write("m.json", STANDARD_NORMAL);
        ws.write("y.txt", "[0.0, 1.0]");
        ws.write("s2.txt", "[0.5]");

        ws.normix()
            .args([
                "marginal",
                "--mixture",
                &ws.path("m.json"),
                "--values",
                &ws.path("y.txt"),
                "--noise",
                &ws.path("s2.txt"),
            ])
            .assert()
            .code(11)
            .stderr(predicate::str::contains("ERR_INPUT"));
    }

    #[test]
    fn missing_input_is_io_error() {
        let ws = Workspace::new();
        ws.write("m.json", STANDARD_NORMAL);

        ws.normix()
            .args(["density", "--mixture", &ws.path("m.json"), "--values", &ws.path("nope.txt")])
            .assert()
            .code(21);
    }

    #[test]
    fn zero_weight_mixture_is_invalid_input() {
        let ws = Workspace::new();
        ws.write("m.json", r#"{"weights": [0], "mu": [0], "tau2": [1]}"#);
        ws.write("y.txt", "0");

        ws.normix()
            .args(["density", "--mixture", &ws.path("m.json"), "--values", &ws.path("y.txt")])
            .assert()
            .code(11);
    }
}

mod sampling {
    use super::*;

    #[test]
    fn seeded_sample_is_reproducible() {
        let ws = Workspace::new();
        ws.write("m.json", SEPARATED);

        let draws = || {
            let output = ws
                .normix()
                .args(["--seed", "42", "sample", "--mixture", &ws.path("m.json"), "-n", "25"])
                .assert()
                .success()
                .get_output()
                .stdout
                .clone();
            stdout_json(&output)["draws"].clone()
        };
        let first = draws();
        assert_eq!(first.as_array().unwrap().len(), 25);
        assert_eq!(first, draws());
    }

    #[test]
    fn classify_separated_components() {
        let ws = Workspace::new();
        ws.write("m.json", SEPARATED);
        ws.write("y.txt", "-10\n10\n-9.5\n");
        ws.write("s2.txt", "1\n1\n0\n");

        let output = ws
            .normix()
            .args([
                "classify",
                "--mixture",
                &ws.path("m.json"),
                "--values",
                &ws.path("y.txt"),
                "--noise",
                &ws.path("s2.txt"),
            ])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        assert_eq!(stdout_json(&output)["components"], serde_json::json!([0, 1, 0]));
    }
}

mod fit {
    use super::*;

    const Z: &str = "0.1\n-0.4\n1.2\n3.3\n-2.9\n0.0\n0.7\n-1.1\n";

    #[test]
    fn fit_reports_estimate_and_local_fdr() {
        let ws = Workspace::new();
        ws.write("z.txt", Z);

        let output = ws
            .normix()
            .args(["--seed", "1", "fit", "--values", &ws.path("z.txt"), "--replicates", "3"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let json = stdout_json(&output);
        assert_eq!(json["status"], "completed");
        assert_eq!(json["fit"]["observations"], 24);
        assert_eq!(json["local_fdr"].as_array().unwrap().len(), 8);
        assert_eq!(json["local_fdr_grid"].as_array().unwrap().len(), 41);
        let pi0 = json["fit"]["pi0"].as_f64().unwrap();
        assert!((0.0..=1.0).contains(&pi0));
    }

    #[test]
    fn grid_comes_from_config() {
        let ws = Workspace::new();
        ws.write("config.toml", "[grid]\nlower = -3.0\nupper = 3.0\npoints = 13\n");
        ws.write("z.txt", Z);

        let output = ws
            .normix()
            .args(["fit", "--values", &ws.path("z.txt")])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        assert_eq!(stdout_json(&output)["fit"]["grid_x"].as_array().unwrap().len(), 13);
    }

    #[test]
    fn expired_deadline_aborts() {
        let ws = Workspace::new();
        ws.write("z.txt", Z);

        ws.normix()
            .args(["--timeout", "0", "fit", "--values", &ws.path("z.txt")])
            .assert()
            .code(6)
            .stdout(predicate::str::contains("\"aborted\""));
    }

    #[test]
    fn bad_override_is_args_error() {
        let ws = Workspace::new();
        ws.write("z.txt", Z);

        ws.normix()
            .args(["fit", "--values", &ws.path("z.txt"), "--nullprob", "1.5"])
            .assert()
            .code(10)
            .stderr(predicate::str::contains("\"detail_code\":65"));
    }

    #[test]
    fn bad_config_is_args_error() {
        let ws = Workspace::new();
        ws.write("config.toml", "[recursion]\nsig0 = -1.0\n");
        ws.write("z.txt", Z);

        ws.normix()
            .args(["fit", "--values", &ws.path("z.txt")])
            .assert()
            .code(10)
            .stderr(predicate::str::contains("\"detail_code\":65"));
    }

    #[test]
    fn huge_timeout_runs_to_completion() {
        let ws = Workspace::new();
        ws.write("z.txt", Z);

        ws.normix()
            .args(["--timeout", "18446744073709551615", "fit", "--values", &ws.path("z.txt")])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"completed\""));
    }

    #[test]
    fn far_outlier_is_numeric_degeneracy() {
        let ws = Workspace::new();
        ws.write("z.txt", "0.5\n1000\n");

        ws.normix()
            .args(["fit", "--values", &ws.path("z.txt")])
            .assert()
            .code(12)
            .stderr(predicate::str::contains("ERR_DEGENERATE"));
    }

    #[test]
    fn negative_decay_flag_is_accepted() {
        let ws = Workspace::new();
        ws.write("z.txt", Z);

        ws.normix()
            .args(["fit", "--values", &ws.path("z.txt"), "--decay", "-0.8"])
            .assert()
            .success();
    }
}

mod logging {
    use super::*;

    #[test]
    fn jsonl_logs_carry_run_id() {
        let ws = Workspace::new();
        ws.write("m.json", STANDARD_NORMAL);
        ws.write("y.txt", "0");

        let mut cmd = Command::cargo_bin("normix").expect("normix binary should exist");
        cmd.env_remove("NORMIX_LOG")
            .env_remove("RUST_LOG")
            .args(["--config", &ws.path("config.toml")])
            .args(["--log-format", "jsonl", "--log-level", "debug"])
            .args(["density", "--mixture", &ws.path("m.json"), "--values", &ws.path("y.txt")])
            .assert()
            .success()
            .stderr(predicate::str::contains("run_id"))
            .stderr(predicate::str::contains("configuration resolved"));
    }

    #[test]
    fn unknown_command_fails() {
        Workspace::new()
            .normix()
            .arg("nonexistent-command")
            .assert()
            .failure()
            .stderr(predicate::str::contains("error"));
    }
}
