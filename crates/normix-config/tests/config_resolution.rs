//! Configuration loading + resolution tests against real files.
//!
//! Covers:
//! - JSON and TOML loading with validation
//! - Resolution order (CLI > env > XDG > defaults)

use normix_config::resolve::{load_config, resolve_config_path, ConfigSource, ENV_CONFIG_PATH};
use normix_config::{validate_config, NormixConfig, ValidationError};
use std::env;
use std::fs;
use std::path::Path;
use std::sync::{Mutex, OnceLock};
use tempfile::TempDir;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

struct EnvGuard {
    keys: Vec<String>,
    saved: Vec<Option<String>>,
}

impl EnvGuard {
    fn new(keys: &[&str]) -> Self {
        let mut saved = Vec::with_capacity(keys.len());
        for key in keys {
            saved.push(env::var(key).ok());
        }
        Self {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            saved,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (idx, key) in self.keys.iter().enumerate() {
            match self.saved.get(idx).and_then(|v| v.as_ref()) {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
    }
}

fn with_env_lock<T>(f: impl FnOnce() -> T) -> T {
    let _guard = ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    f()
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, content).expect("write config");
}

#[test]
fn test_load_toml_file() {
    let temp = TempDir::new().expect("temp dir");
    let path = temp.path().join("normix.toml");
    write_file(
        &path,
        r#"
schema_version = "1.0.0"

[recursion]
nullprob = 0.9
decay = -0.7

[grid]
lower = -5.0
upper = 5.0
points = 101
"#,
    );

    let resolved = load_config(Some(&path)).expect("valid toml config");
    assert_eq!(resolved.source, ConfigSource::CliArgument);
    assert_eq!(resolved.config.recursion.nullprob, 0.9);
    assert_eq!(resolved.config.grid.points, 101);
    assert_eq!(resolved.config.recursion.sig0, 1.0);
}

#[test]
fn test_load_json_file() {
    let temp = TempDir::new().expect("temp dir");
    let path = temp.path().join("normix.json");
    write_file(
        &path,
        r#"{"simulation": {"seed": 7, "replicates": 10}}"#,
    );

    let cfg = NormixConfig::from_file(&path).expect("valid json config");
    validate_config(&cfg).expect("semantically valid");
    assert_eq!(cfg.simulation.seed, Some(7));
    assert_eq!(cfg.simulation.replicates, 10);
}

#[test]
fn test_semantic_error_surfaces_from_load() {
    let temp = TempDir::new().expect("temp dir");
    let path = temp.path().join("bad.toml");
    write_file(&path, "[recursion]\nsig0 = -1.0\n");

    let err = load_config(Some(&path)).expect_err("negative sig0 should fail");
    assert!(matches!(err, ValidationError::InvalidValue { .. }));
}

#[test]
fn test_malformed_file_is_parse_error() {
    let temp = TempDir::new().expect("temp dir");
    let path = temp.path().join("broken.json");
    write_file(&path, "{ not json");

    let err = load_config(Some(&path)).expect_err("broken json should fail");
    assert_eq!(err.code(), 61);
}

#[test]
fn test_resolve_cli_over_env() {
    with_env_lock(|| {
        let _guard = EnvGuard::new(&[ENV_CONFIG_PATH]);
        let temp = TempDir::new().expect("temp dir");
        let cli = temp.path().join("cli.toml");
        let from_env = temp.path().join("env.toml");
        write_file(&cli, "");
        write_file(&from_env, "");
        env::set_var(ENV_CONFIG_PATH, from_env.display().to_string());

        let (path, source) = resolve_config_path(Some(&cli));
        assert_eq!(source, ConfigSource::CliArgument);
        assert_eq!(path.unwrap(), cli);
    });
}

#[test]
fn test_resolve_env_when_no_cli() {
    with_env_lock(|| {
        let _guard = EnvGuard::new(&[ENV_CONFIG_PATH]);
        let temp = TempDir::new().expect("temp dir");
        let from_env = temp.path().join("env.toml");
        write_file(&from_env, "[grid]\npoints = 11\n");
        env::set_var(ENV_CONFIG_PATH, from_env.display().to_string());

        let resolved = load_config(None).expect("env config loads");
        assert_eq!(resolved.source, ConfigSource::Environment);
        assert_eq!(resolved.config.grid.points, 11);
    });
}
