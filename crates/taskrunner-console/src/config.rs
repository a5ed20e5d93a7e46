/*
[INPUT]:  Built-in defaults, optional YAML file, TASKRUNNER__* env vars, CLI overrides
[OUTPUT]: Validated ConsoleConfig plus derived client/projector settings
[POS]:    Configuration layer - console startup
[UPDATE]: When adding new configuration options
*/

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File, FileFormat, Map};
use serde::{Deserialize, Serialize};
use taskrunner_adapter::{ClientConfig, DEFAULT_BASE_URL};
use url::Url;

use crate::history::{DEFAULT_FAILURE_MARKERS, HistoryProjector};

pub const ENV_PREFIX: &str = "TASKRUNNER";
const APP_DIR: &str = "taskrunner-console";

/// Top-level configuration for the console
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub api: ApiConfig,
    pub logging: LoggingConfig,
    pub history: HistoryConfig,
}

/// Task service connection settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL including any path prefix, e.g. `http://host:8080/api`
    pub base_url: String,
    /// Whole-request timeout; runs block until the remote pod finishes
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        let client = ClientConfig::default();
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: client.timeout.as_secs(),
            connect_timeout_secs: client.connect_timeout.as_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `taskrunner_adapter=debug`
    pub level: String,
    /// Where the interactive session writes its log files
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Output substrings that mark an execution as failed
    pub failure_markers: Vec<String>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            failure_markers: DEFAULT_FAILURE_MARKERS
                .iter()
                .map(|marker| marker.to_string())
                .collect(),
        }
    }
}

/// Values given on the command line; they win over every other layer
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub log_level: Option<String>,
}

impl ConsoleConfig {
    /// Load all layers. An explicit `path` must exist; otherwise the per-user
    /// config file is read when present.
    pub fn load(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self> {
        let file = match path {
            Some(path) => Some((path.to_path_buf(), true)),
            None => default_config_path()
                .filter(|path| path.exists())
                .map(|path| (path, false)),
        };

        let mut builder = config::Config::builder();
        if let Some((path, required)) = &file {
            tracing::debug!(path = %path.display(), "reading config file");
            builder = builder.add_source(
                File::from(path.as_path())
                    .format(FileFormat::Yaml)
                    .required(*required),
            );
        }
        Self::finish(builder, overrides, None)
            .with_context(|| match &file {
                Some((path, _)) => format!("load config from {}", path.display()),
                None => "load config".to_string(),
            })
    }

    /// Parse a YAML document on top of the defaults; env vars are ignored
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let builder =
            config::Config::builder().add_source(File::from_str(yaml, FileFormat::Yaml));
        Self::finish(builder, &ConfigOverrides::default(), Some(Map::new()))
    }

    fn finish(
        builder: ConfigBuilder<DefaultState>,
        overrides: &ConfigOverrides,
        env: Option<Map<String, String>>,
    ) -> Result<Self> {
        let config: Self = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("history.failure_markers")
                    .try_parsing(true)
                    .source(env),
            )
            .set_override_option("api.base_url", overrides.base_url.clone())?
            .set_override_option("logging.level", overrides.log_level.clone())?
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.api.base_url)
            .map_err(|err| anyhow!("api.base_url '{}' is invalid: {err}", self.api.base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("api.base_url must use http or https, got '{}'", url.scheme());
        }
        if self.api.timeout_secs == 0 {
            bail!("api.timeout_secs must be greater than zero");
        }
        if self.api.connect_timeout_secs == 0 {
            bail!("api.connect_timeout_secs must be greater than zero");
        }
        if self.logging.level.trim().is_empty() {
            bail!("logging.level cannot be empty");
        }
        if !self
            .history
            .failure_markers
            .iter()
            .any(|marker| !marker.is_empty())
        {
            bail!("history.failure_markers needs at least one non-empty marker");
        }
        Ok(())
    }

    /// Effective configuration as a YAML document
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("serialize config")
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api.base_url.clone(),
            timeout: Duration::from_secs(self.api.timeout_secs),
            connect_timeout: Duration::from_secs(self.api.connect_timeout_secs),
        }
    }

    pub fn projector(&self) -> HistoryProjector {
        HistoryProjector::with_markers(self.history.failure_markers.clone())
    }

    /// Configured log directory, else the per-user data dir, else the temp dir
    pub fn log_directory(&self) -> PathBuf {
        self.logging
            .directory
            .clone()
            .or_else(|| dirs::data_local_dir().map(|dir| dir.join(APP_DIR).join("logs")))
            .unwrap_or_else(|| std::env::temp_dir().join(APP_DIR))
    }
}

/// `<config_dir>/taskrunner-console/config.yaml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.yaml"))
}
