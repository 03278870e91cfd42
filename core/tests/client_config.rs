//! Configuration loading: defaults, file discovery and environment overrides.

use std::fs;
use std::path::{Path, PathBuf};

use serial_test::serial;
use tempfile::TempDir;

use webui_client::{ApiClient, ClientConfig, CourseApi};

const ENV_VARS_TO_RESET: &[&str] = &[
    "WEBUI_CLIENT_CONFIG",
    "WEBUI_CLIENT__BASE_URL",
    "WEBUI_CLIENT__TOKEN",
    "WEBUI_CLIENT__COURSE_API",
];

/// Restores environment variables and the working directory on drop.
struct TestContext {
    vars: Vec<(String, Option<String>)>,
    original_dir: Option<PathBuf>,
}

impl TestContext {
    fn new() -> Self {
        let mut ctx = Self {
            vars: Vec::new(),
            original_dir: None,
        };
        for key in ENV_VARS_TO_RESET {
            ctx.remove_var(key);
        }
        ctx
    }

    fn set_var(&mut self, key: &str, value: impl AsRef<str>) {
        let previous = std::env::var(key).ok();
        std::env::set_var(key, value.as_ref());
        self.vars.push((key.to_string(), previous));
    }

    fn remove_var(&mut self, key: &str) {
        let previous = std::env::var(key).ok();
        std::env::remove_var(key);
        self.vars.push((key.to_string(), previous));
    }

    fn set_current_dir(&mut self, dir: &Path) {
        if self.original_dir.is_none() {
            self.original_dir = Some(std::env::current_dir().expect("failed to capture current directory"));
        }
        std::env::set_current_dir(dir).expect("failed to set current directory");
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        if let Some(original) = self.original_dir.take() {
            let _ = std::env::set_current_dir(original);
        }
        while let Some((key, value)) = self.vars.pop() {
            match value {
                Some(val) => std::env::set_var(&key, val),
                None => std::env::remove_var(&key),
            }
        }
    }
}

fn write_config_file(root: &Path, relative: &str, contents: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create config directories");
    }
    fs::write(&path, contents).expect("failed to write config file");
    path
}

#[test]
#[serial]
fn defaults_without_files_or_environment() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::new();
    ctx.set_current_dir(temp_dir.path());

    let config = ClientConfig::load().expect("load should succeed without files");
    assert_eq!(config, ClientConfig::default());
}

#[test]
#[serial]
fn first_file_in_search_order_wins() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::new();
    ctx.set_current_dir(temp_dir.path());

    write_config_file(temp_dir.path(), "webui-client.toml", r#"base_url = "http://first/api/v1""#);
    write_config_file(
        temp_dir.path(),
        "config/webui-client.toml",
        r#"base_url = "http://second/api/v1""#,
    );

    let config = ClientConfig::load().expect("load should pick the first file");
    assert_eq!(config.base_url, "http://first/api/v1");
}

#[test]
#[serial]
fn nested_config_directory_is_searched() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::new();
    ctx.set_current_dir(temp_dir.path());

    write_config_file(
        temp_dir.path(),
        "config/webui-client.toml",
        r#"
        token = "from-file"
        course_api = "legacy"
        "#,
    );

    let config = ClientConfig::load().expect("load should succeed");
    assert_eq!(config.token.as_deref(), Some("from-file"));
    assert_eq!(config.course_api, CourseApi::Legacy);
    assert_eq!(config.base_url, ClientConfig::default().base_url);
}

#[test]
#[serial]
fn explicit_path_overrides_discovery() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::new();
    ctx.set_current_dir(temp_dir.path());

    write_config_file(temp_dir.path(), "webui-client.toml", r#"base_url = "http://discovered""#);
    let explicit = write_config_file(temp_dir.path(), "elsewhere/client.json", r#"{"base_url": "http://explicit"}"#);
    ctx.set_var("WEBUI_CLIENT_CONFIG", explicit.to_string_lossy());

    let config = ClientConfig::load().expect("load should read the explicit file");
    assert_eq!(config.base_url, "http://explicit");
}

#[test]
#[serial]
fn environment_overrides_file() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::new();
    ctx.set_current_dir(temp_dir.path());

    write_config_file(
        temp_dir.path(),
        "webui-client.toml",
        r#"
        base_url = "http://file/api/v1"
        token = "file-token"
        "#,
    );
    ctx.set_var("WEBUI_CLIENT__TOKEN", "env-token");
    ctx.set_var("WEBUI_CLIENT__COURSE_API", "legacy");

    let config = ClientConfig::load().expect("load should apply overrides");
    assert_eq!(config.base_url, "http://file/api/v1");
    assert_eq!(config.token.as_deref(), Some("env-token"));
    assert_eq!(config.course_api, CourseApi::Legacy);
}

#[test]
#[serial]
fn missing_explicit_file_is_an_error() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::new();
    ctx.set_current_dir(temp_dir.path());
    ctx.set_var("WEBUI_CLIENT_CONFIG", temp_dir.path().join("absent.toml").to_string_lossy());

    assert!(ClientConfig::load().is_err());
}

#[test]
#[serial]
fn unknown_course_api_is_rejected() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::new();
    ctx.set_current_dir(temp_dir.path());
    ctx.set_var("WEBUI_CLIENT__COURSE_API", "experimental");

    let err = ClientConfig::load().expect_err("unknown variant should fail");
    assert!(format!("{err:#}").contains("invalid client configuration"));
}

#[test]
#[serial]
fn loaded_config_drives_client() {
    let temp_dir = TempDir::new().expect("failed to create temp dir");
    let mut ctx = TestContext::new();
    ctx.set_current_dir(temp_dir.path());
    write_config_file(
        temp_dir.path(),
        "webui-client.toml",
        r#"
        base_url = "https://lms.example/api/v1/"
        token = "t0k"
        course_api = "legacy"
        "#,
    );

    let client = ApiClient::from_config(ClientConfig::load().expect("load should succeed"));
    assert_eq!(client.base_url(), "https://lms.example/api/v1");
    assert_eq!(client.course_api(), CourseApi::Legacy);

    let request = client.build_get_courses();
    assert_eq!(request.path, "https://lms.example/api/v1/courses");
    assert_eq!(request.header("authorization"), Some("Bearer t0k"));
}
