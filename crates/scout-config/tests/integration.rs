//! Integration tests for scout-config.
//!
//! Tests the full configuration loading pipeline: discovery -> parse -> merge -> validate.

// Integration tests live outside cfg(test)
#![allow(clippy::tests_outside_test_module)]

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use scout_config::{Config, ConfigError, ConfigWarning};

/// Test helper to create a temporary directory structure for tests.
struct TestEnv {
    root: tempfile::TempDir,
}

impl TestEnv {
    fn new() -> Self {
        Self {
            root: tempfile::tempdir().unwrap(),
        }
    }

    fn path(&self) -> &Path {
        self.root.path()
    }

    /// Creates a directory and returns its path.
    fn create_dir(&self, rel_path: &str) -> PathBuf {
        let path = self.root.path().join(rel_path);
        fs::create_dir_all(&path).unwrap();
        path
    }

    /// Creates a file with content and returns its path.
    fn create_file(&self, rel_path: &str, content: &str) -> PathBuf {
        let path = self.root.path().join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }
}

#[test]
fn test_load_from_no_files_returns_default() {
    let config = Config::load_from_files(&[]).unwrap();

    assert!(config.config_root.is_none());
    assert_eq!(config.endpoints.database_url.as_str(), "http://localhost:5000/");
    assert_eq!(config.search.return_type, "scene");
}

#[test]
fn test_load_single_config() {
    let env = TestEnv::new();
    env.create_file(
        ".scout.toml",
        r#"
root = true

[endpoints]
database_url = "http://db.example:5000"

[search]
request_timeout = 2000
limit = 3
"#,
    );

    let config = Config::load(env.path()).unwrap();

    assert_eq!(
        config.endpoints.database_url.as_str(),
        "http://db.example:5000/"
    );
    assert_eq!(config.endpoints.nlp_url.as_str(), "http://localhost:4000/");
    assert_eq!(config.search.request_timeout, Duration::from_secs(2));
    assert_eq!(config.search.limit, 3);
    assert_eq!(config.config_root.as_deref(), Some(env.path()));
}

#[test]
fn test_load_nested_configs_merging() {
    let env = TestEnv::new();
    let subdir = env.create_dir("project/subdir");

    env.create_file(
        ".scout.toml",
        r#"
root = true

[endpoints]
nlp_url = "http://nlp.outer:4000/"

[search]
limit = 5
id_field = "uid"
"#,
    );
    env.create_file(
        "project/.scout.toml",
        r#"
[search]
limit = 20

[features]
visualization = false
"#,
    );

    let config = Config::load(&subdir).unwrap();

    assert_eq!(config.endpoints.nlp_url.as_str(), "http://nlp.outer:4000/");
    assert_eq!(config.search.limit, 20);
    assert_eq!(config.search.id_field, "uid");
    assert!(!config.features.visualization);
    assert!(config.features.autosuggest);
    assert_eq!(config.config_root, Some(env.path().join("project")));
}

#[test]
fn test_root_config_hides_parent() {
    let env = TestEnv::new();
    let project = env.create_dir("project");

    env.create_file(".scout.toml", "[search]\nlimit = 99\n");
    env.create_file("project/.scout.toml", "root = true\n");

    let config = Config::load(&project).unwrap();
    assert_eq!(config.search.limit, 10);
}

#[test]
fn test_invalid_toml_reports_path() {
    let env = TestEnv::new();
    let path = env.create_file(".scout.toml", "[search\nlimit = ");

    let err = Config::load_from_files(&[path.clone()]).unwrap_err();
    match err {
        ConfigError::ParseToml { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_file_is_read_error() {
    let env = TestEnv::new();
    let missing = env.path().join("absent.toml");

    let err = Config::load_from_files(&[missing]).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFile { .. }));
}

#[test]
fn test_invalid_endpoint_is_error() {
    let env = TestEnv::new();
    let path = env.create_file(".scout.toml", "[endpoints]\ndatabase_url = \"::nope\"\n");

    let err = Config::load_from_files(&[path]).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::InvalidEndpoint {
            name: "database_url",
            ..
        }
    ));
}

#[test]
fn test_validate_loaded_config() {
    let env = TestEnv::new();
    let path = env.create_file(
        ".scout.toml",
        r#"
[endpoints]
img_url = "file:///var/images/"

[search]
request_timeout = 5000
cycle_timeout = 1000
"#,
    );

    let config = Config::load_from_files(&[path]).unwrap();
    let warnings = config.validate();

    assert_eq!(warnings.len(), 2);
    assert!(matches!(
        warnings[0],
        ConfigWarning::EndpointNotHttp { name: "img_url", .. }
    ));
    assert!(matches!(
        warnings[1],
        ConfigWarning::CycleShorterThanRequest { .. }
    ));
}
