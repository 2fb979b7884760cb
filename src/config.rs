//! Configuration loaded from `marees.toml`.
//!
//! [`MareesConfig`] holds every tunable of a run. Values missing from the
//! file use sensible defaults. The `MAREES_BASE_URL` environment variable
//! takes precedence over the file for the submission endpoint.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::shom::API_URL;
use crate::state_machine::PollConfig;

pub const DEFAULT_CONFIG_FILE: &str = "marees.toml";
pub const BASE_URL_ENV: &str = "MAREES_BASE_URL";

#[derive(Debug, Clone, Deserialize)]
pub struct MareesConfig {
    /// Submission endpoint of the asynchronous download API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// REFMAR station identifier (3 is Brest).
    #[serde(default = "default_station_id")]
    pub station_id: u32,

    /// Station name used in output file names.
    #[serde(default = "default_station_name")]
    pub station_name: String,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Seconds between two status queries.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Status queries before the job is considered lost.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    API_URL.to_string()
}

fn default_station_id() -> u32 {
    3
}

fn default_station_name() -> String {
    "brest".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data/public")
}

fn default_poll_interval_secs() -> u64 {
    10
}

// 30 queries at 10s is roughly five minutes.
fn default_max_attempts() -> u32 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for MareesConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            station_id: default_station_id(),
            station_name: default_station_name(),
            output_dir: default_output_dir(),
            poll_interval_secs: default_poll_interval_secs(),
            max_attempts: default_max_attempts(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl MareesConfig {
    /// Loads the configuration.
    ///
    /// With `path` set the file must exist. Without it, `marees.toml` in the
    /// current directory is read if present, defaults are used otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_env(std::env::var(BASE_URL_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    /// Applies the value of `MAREES_BASE_URL`. An empty value is ignored.
    fn apply_env(&mut self, base_url: Option<String>) {
        if let Some(url) = base_url
            && !url.is_empty()
        {
            self.base_url = url;
        }
    }

    fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            bail!("max_attempts must be at least 1");
        }
        Ok(())
    }

    /// The `--output-dir` value when given, the configured directory otherwise.
    pub fn output_dir_for(&self, cli: Option<PathBuf>) -> PathBuf {
        cli.unwrap_or_else(|| self.output_dir.clone())
    }

    fn from_file(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p, true),
            None => (Path::new(DEFAULT_CONFIG_FILE), false),
        };

        if !path.exists() {
            if required {
                bail!("config file '{}' does not exist", path.display());
            }
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read '{}'", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("invalid config '{}'", path.display()))
    }

    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            interval: Duration::from_secs(self.poll_interval_secs),
            max_attempts: self.max_attempts,
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_values() {
        let config = MareesConfig::default();
        assert_eq!(config.base_url, API_URL);
        assert_eq!(config.station_id, 3);
        assert_eq!(config.station_name, "brest");
        assert_eq!(config.output_dir, PathBuf::from("data/public"));
        assert_eq!(config.poll_interval_secs, 10);
        assert_eq!(config.max_attempts, 30);
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            station_id = 52
            station_name = "le_conquet"
            max_attempts = 5
        "#;
        let config: MareesConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.station_id, 52);
        assert_eq!(config.station_name, "le_conquet");
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.poll_interval_secs, 10);
        assert_eq!(config.base_url, API_URL);
    }

    #[test]
    fn poll_config_from_values() {
        let config = MareesConfig {
            poll_interval_secs: 2,
            max_attempts: 7,
            ..Default::default()
        };
        let poll = config.poll_config();
        assert_eq!(poll.interval, Duration::from_secs(2));
        assert_eq!(poll.max_attempts, 7);
    }

    #[test]
    fn load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "output_dir = \"/tmp/marees\"\npoll_interval_secs = 1").unwrap();

        let config = MareesConfig::from_file(Some(file.path())).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/tmp/marees"));
        assert_eq!(config.poll_interval_secs, 1);
    }

    #[test]
    fn load_missing_explicit_file_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(MareesConfig::from_file(Some(&missing)).is_err());
    }

    #[test]
    fn load_invalid_toml_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_attempts = \"many\"").unwrap();
        assert!(MareesConfig::from_file(Some(file.path())).is_err());
    }

    #[test]
    fn env_base_url_overrides_file() {
        let mut config = MareesConfig::default();
        config.apply_env(Some("http://localhost:8080/obs".into()));
        assert_eq!(config.base_url, "http://localhost:8080/obs");
    }

    #[test]
    fn empty_env_base_url_is_ignored() {
        let mut config = MareesConfig {
            base_url: "http://from-file/obs".into(),
            ..Default::default()
        };
        config.apply_env(Some(String::new()));
        assert_eq!(config.base_url, "http://from-file/obs");
    }

    #[test]
    fn unset_env_base_url_keeps_file_value() {
        let mut config = MareesConfig {
            base_url: "http://from-file/obs".into(),
            ..Default::default()
        };
        config.apply_env(None);
        assert_eq!(config.base_url, "http://from-file/obs");
    }

    #[test]
    fn zero_max_attempts_is_rejected() {
        let config = MareesConfig {
            max_attempts: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(MareesConfig::default().validate().is_ok());
    }

    #[test]
    fn load_rejects_zero_max_attempts_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_attempts = 0").unwrap();
        let err = MareesConfig::load(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("max_attempts"));
    }

    #[test]
    fn cli_output_dir_takes_precedence() {
        let config = MareesConfig::default();
        assert_eq!(
            config.output_dir_for(Some(PathBuf::from("/srv/marees"))),
            PathBuf::from("/srv/marees")
        );
    }

    #[test]
    fn configured_output_dir_without_cli_override() {
        let config = MareesConfig {
            output_dir: PathBuf::from("/var/lib/marees"),
            ..Default::default()
        };
        assert_eq!(config.output_dir_for(None), PathBuf::from("/var/lib/marees"));
    }

    #[test]
    fn load_falls_back_to_defaults() {
        // The crate root has no marees.toml.
        let config = MareesConfig::from_file(None).unwrap();
        assert_eq!(config.max_attempts, 30);
    }
}
