//! Client configuration: where the API lives, who is calling, and which
//! Courses variant the deployment speaks.

use std::path::PathBuf;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &["webui-client.toml", "config/webui-client.toml"];

/// Which shape of the Courses API the backend exposes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseApi {
    /// `/courses/` listing that may be wrapped in an envelope, and an update
    /// that probes six method/path combinations.
    #[default]
    Tolerant,
    /// `/courses` listing that is always a bare array, and a single
    /// `POST /courses/id/{id}/update`.
    Legacy,
}

/// Configuration for an `ApiClient`.
///
/// ```
/// use webui_client::{ClientConfig, CourseApi};
///
/// let config = ClientConfig::default();
/// assert_eq!(config.base_url, "http://localhost:8080/api/v1");
/// assert!(config.token.is_none());
/// assert_eq!(config.course_api, CourseApi::Tolerant);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "ClientConfig::default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub course_api: CourseApi,
}

impl ClientConfig {
    fn default_base_url() -> String {
        "http://localhost:8080/api/v1".to_string()
    }

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_course_api(mut self, course_api: CourseApi) -> Self {
        self.course_api = course_api;
        self
    }

    /// Layer defaults, an optional config file and `WEBUI_CLIENT__*`
    /// environment overrides.
    ///
    /// The file comes from `WEBUI_CLIENT_CONFIG` when set, otherwise the first
    /// of `webui-client.toml` / `config/webui-client.toml` found in the
    /// working directory.
    pub fn load() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let mut builder = config::Config::builder()
            .set_default("base_url", defaults.base_url)
            .context("invalid default base_url")?
            .set_default("course_api", "tolerant")
            .context("invalid default course_api")?;

        if let Ok(path) = std::env::var("WEBUI_CLIENT_CONFIG") {
            debug!(path, "loading client configuration via WEBUI_CLIENT_CONFIG");
            builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        } else if let Ok(cwd) = std::env::current_dir() {
            let fallback = DEFAULT_CONFIG_FILES
                .iter()
                .map(|candidate| cwd.join(candidate))
                .find(|path| path.exists());

            if let Some(path) = fallback {
                debug!(path = %path.display(), "loading client configuration file");
                builder = builder.add_source(config::File::from(path));
            } else {
                debug!("no client configuration file found, using defaults and environment");
            }
        }

        builder = builder.add_source(config::Environment::with_prefix("WEBUI_CLIENT").separator("__"));

        let config = builder
            .build()
            .context("unable to build client configuration")?
            .try_deserialize::<ClientConfig>()
            .context("invalid client configuration")?;

        debug!(base_url = %config.base_url, course_api = ?config.course_api, "loaded client configuration");
        Ok(config)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            token: None,
            course_api: CourseApi::default(),
        }
    }
}
