//! ---
//! ems_section: "01-core-functionality"
//! ems_subsection: "module"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Shared primitives and utilities for the core runtime."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use gridmix_core::RangeSelector;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds, DurationSeconds};
use tracing::debug;
use url::Url;

use crate::logging::LogFormat;

pub const ENV_ENTSOE_API_KEY: &str = "GRIDMIX_ENTSOE_API_KEY";
pub const ENV_EIRGRID_API_KEY: &str = "GRIDMIX_EIRGRID_API_KEY";
pub const ENV_ENABLE_ENTSOE: &str = "GRIDMIX_ENABLE_ENTSOE";
pub const ENV_ENABLE_EIRGRID: &str = "GRIDMIX_ENABLE_EIRGRID";

fn default_source() -> String {
    "mock".to_owned()
}

fn default_true() -> bool {
    true
}

fn default_eirgrid_base_url() -> String {
    "https://www.eirgridgroup.com/site-files/library/EirGrid".to_owned()
}

fn default_eirgrid_generation_path() -> String {
    "/All-Island%20Generation%20Output%20Report%20-%20".to_owned()
}

fn default_eirgrid_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_eirgrid_refresh() -> Duration {
    Duration::from_secs(5 * 60)
}

fn default_user_agent() -> String {
    "Ireland-Carbon-Viz/1.0".to_owned()
}

fn default_entsoe_base_url() -> String {
    "https://transparency.entsoe.eu/api".to_owned()
}

fn default_entsoe_timeout() -> Duration {
    Duration::from_secs(15)
}

fn default_entsoe_refresh() -> Duration {
    Duration::from_secs(15 * 60)
}

fn default_entsoe_domain() -> String {
    // Ireland bidding zone
    "10Y1001A1001A59A".to_owned()
}

fn default_entsoe_document_type() -> String {
    // actual generation per production type
    "A75".to_owned()
}

/// Primary configuration object for gridmix services and tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub default_range: RangeSelector,
    #[serde(default = "default_source")]
    pub default_source: String,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
}

/// Metadata describing where an [`AppConfig`] was loaded from.
#[derive(Debug, Clone)]
pub struct LoadedAppConfig {
    pub config: AppConfig,
    pub source: Option<PathBuf>,
}

impl AppConfig {
    pub const ENV_CONFIG_PATH: &str = "GRIDMIX_CONFIG";

    /// Load configuration from disk, respecting the `GRIDMIX_CONFIG` override.
    pub fn load<P: AsRef<Path>>(candidates: &[P]) -> Result<Self> {
        let loaded = Self::load_with_source(candidates)?;
        match loaded.source {
            Some(_) => Ok(loaded.config),
            None => Err(anyhow!(
                "no configuration files found. inspected: {}",
                describe_candidates(candidates)
            )),
        }
    }

    /// Load configuration together with the effective source path.
    ///
    /// When neither the environment override nor any candidate exists the
    /// built-in defaults are returned with `source: None`.
    pub fn load_with_source<P: AsRef<Path>>(candidates: &[P]) -> Result<LoadedAppConfig> {
        if let Ok(env_path) = std::env::var(Self::ENV_CONFIG_PATH) {
            if !env_path.trim().is_empty() {
                let path = PathBuf::from(env_path);
                let config = Self::from_path(&path)?;
                return Ok(LoadedAppConfig {
                    config,
                    source: Some(path),
                });
            }
        }

        for candidate in candidates {
            if candidate.as_ref().exists() {
                let path = candidate.as_ref().to_path_buf();
                let config = Self::from_path(&path)?;
                return Ok(LoadedAppConfig {
                    config,
                    source: Some(path),
                });
            }
        }

        debug!(
            inspected = %describe_candidates(candidates),
            "no configuration file found, using defaults"
        );
        Ok(LoadedAppConfig {
            config: Self::default(),
            source: None,
        })
    }

    fn from_path(path: &Path) -> Result<Self> {
        debug!(config_path = %path.display(), "loading configuration");
        let contents = fs::read_to_string(path)
            .with_context(|| format!("unable to read config file {}", path.display()))?;
        let config = toml::from_str::<AppConfig>(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply credential and feature-flag overrides from a key lookup.
    ///
    /// The lookup is injected so callers decide whether it reads the process
    /// environment or a fixed map. Empty values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        if let Some(key) = read(ENV_ENTSOE_API_KEY) {
            self.sources.entsoe.api_key = Some(key);
        }
        if let Some(key) = read(ENV_EIRGRID_API_KEY) {
            self.sources.eirgrid.api_key = Some(key);
        }
        if let Some(flag) = read(ENV_ENABLE_ENTSOE) {
            self.sources.entsoe.enabled = parse_flag(ENV_ENABLE_ENTSOE, &flag)?;
        }
        if let Some(flag) = read(ENV_ENABLE_EIRGRID) {
            self.sources.eirgrid.enabled = parse_flag(ENV_ENABLE_EIRGRID, &flag)?;
        }
        Ok(())
    }

    /// Validate structural invariants.
    pub fn validate(&self) -> Result<()> {
        self.sources.eirgrid.validate()?;
        self.sources.entsoe.validate()?;
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_range: RangeSelector::default(),
            default_source: default_source(),
            logging: LoggingConfig::default(),
            sources: SourcesConfig::default(),
        }
    }
}

impl std::str::FromStr for AppConfig {
    type Err = anyhow::Error;

    fn from_str(content: &str) -> std::result::Result<Self, Self::Err> {
        let config: AppConfig =
            toml::from_str(content).with_context(|| "failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }
}

fn describe_candidates<P: AsRef<Path>>(candidates: &[P]) -> String {
    candidates
        .iter()
        .map(|p| p.as_ref().display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(anyhow!("{key} must be a boolean flag, got '{other}'")),
    }
}

fn validate_base_url(section: &str, base_url: &str) -> Result<()> {
    Url::parse(base_url)
        .with_context(|| format!("sources.{section}.base_url '{base_url}' is not a valid URL"))?;
    Ok(())
}

/// Live data source settings. Each source carries its own timeout.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SourcesConfig {
    #[serde(default)]
    pub eirgrid: EirGridConfig,
    #[serde(default)]
    pub entsoe: EntsoeConfig,
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EirGridConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_eirgrid_base_url")]
    pub base_url: String,
    #[serde(default = "default_eirgrid_generation_path")]
    pub generation_path: String,
    #[serde(rename = "timeout_ms", default = "default_eirgrid_timeout")]
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub timeout: Duration,
    #[serde(rename = "refresh_interval_secs", default = "default_eirgrid_refresh")]
    #[serde_as(as = "DurationSeconds<u64>")]
    pub refresh_interval: Duration,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl EirGridConfig {
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.trim().is_empty())
    }

    pub fn validate(&self) -> Result<()> {
        validate_base_url("eirgrid", &self.base_url)?;
        if self.timeout.is_zero() {
            return Err(anyhow!("sources.eirgrid.timeout_ms must be greater than zero"));
        }
        Ok(())
    }
}

impl Default for EirGridConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_eirgrid_base_url(),
            generation_path: default_eirgrid_generation_path(),
            timeout: default_eirgrid_timeout(),
            refresh_interval: default_eirgrid_refresh(),
            user_agent: default_user_agent(),
            api_key: None,
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntsoeConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_entsoe_base_url")]
    pub base_url: String,
    #[serde(rename = "timeout_ms", default = "default_entsoe_timeout")]
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    pub timeout: Duration,
    #[serde(rename = "refresh_interval_secs", default = "default_entsoe_refresh")]
    #[serde_as(as = "DurationSeconds<u64>")]
    pub refresh_interval: Duration,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_entsoe_domain")]
    pub domain: String,
    #[serde(default = "default_entsoe_document_type")]
    pub document_type: String,
}

impl EntsoeConfig {
    /// Security token, if one was configured.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.trim().is_empty())
    }

    pub fn validate(&self) -> Result<()> {
        validate_base_url("entsoe", &self.base_url)?;
        if self.timeout.is_zero() {
            return Err(anyhow!("sources.entsoe.timeout_ms must be greater than zero"));
        }
        Ok(())
    }
}

impl Default for EntsoeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: default_entsoe_base_url(),
            timeout: default_entsoe_timeout(),
            refresh_interval: default_entsoe_refresh(),
            api_key: None,
            domain: default_entsoe_domain(),
            document_type: default_entsoe_document_type(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
    /// Directory for the rolling log file; stderr only when unset.
    #[serde(default)]
    pub directory: Option<PathBuf>,
    #[serde(default)]
    pub file_prefix: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_match_live_source_conventions() {
        let config = AppConfig::default();
        assert_eq!(config.default_range, RangeSelector::Day);
        assert_eq!(config.default_source, "mock");
        assert!(config.sources.eirgrid.enabled);
        assert_eq!(config.sources.eirgrid.timeout, Duration::from_secs(10));
        assert!(!config.sources.entsoe.enabled);
        assert_eq!(config.sources.entsoe.timeout, Duration::from_secs(15));
        assert!(config.sources.entsoe.api_key().is_none());
        config.validate().unwrap();
    }

    #[test]
    fn parses_inline_toml() {
        let config: AppConfig = r#"
            default_range = "7d"
            default_source = "eirgrid"

            [logging]
            format = "pretty"

            [sources.eirgrid]
            base_url = "http://127.0.0.1:8080"
            generation_path = "/generation/"
            timeout_ms = 250

            [sources.entsoe]
            enabled = true
            api_key = "token"
        "#
        .parse()
        .unwrap();
        assert_eq!(config.default_range, RangeSelector::Week);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.sources.eirgrid.timeout, Duration::from_millis(250));
        assert_eq!(config.sources.eirgrid.generation_path, "/generation/");
        assert_eq!(config.sources.entsoe.api_key(), Some("token"));
        assert_eq!(config.sources.entsoe.domain, "10Y1001A1001A59A");
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let config: AppConfig = "[sources.entsoe]\nenabled = true\napi_key = \"  \"\n"
            .parse()
            .unwrap();
        assert!(config.sources.entsoe.api_key().is_none());
    }

    #[test]
    fn rejects_invalid_base_url_and_zero_timeout() {
        let err = "[sources.eirgrid]\nbase_url = \"not a url\"\n"
            .parse::<AppConfig>()
            .unwrap_err();
        assert!(format!("{err:#}").contains("not a valid URL"));

        let err = "[sources.entsoe]\ntimeout_ms = 0\n"
            .parse::<AppConfig>()
            .unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn env_overrides_apply_through_injected_lookup() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_ENTSOE_API_KEY, "secret"),
            (ENV_ENABLE_ENTSOE, "true"),
            (ENV_ENABLE_EIRGRID, "0"),
            (ENV_EIRGRID_API_KEY, ""),
        ]);
        let mut config = AppConfig::default();
        config
            .apply_env_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();
        assert!(config.sources.entsoe.enabled);
        assert_eq!(config.sources.entsoe.api_key(), Some("secret"));
        assert!(!config.sources.eirgrid.enabled);
        assert!(config.sources.eirgrid.api_key.is_none());
    }

    #[test]
    fn env_override_rejects_non_boolean_flag() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env_overrides(|key| (key == ENV_ENABLE_EIRGRID).then(|| "maybe".to_owned()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_ENABLE_EIRGRID));
    }

    #[test]
    fn loads_first_existing_candidate() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "default_range = \"48h\"")?;
        file.flush()?;
        let missing = PathBuf::from("does/not/exist.toml");
        let candidates = vec![missing, file.path().to_path_buf()];
        let loaded = AppConfig::load_with_source(&candidates)?;
        assert_eq!(loaded.config.default_range, RangeSelector::TwoDays);
        assert_eq!(loaded.source.as_deref(), Some(file.path()));
        Ok(())
    }

    #[test]
    fn missing_candidates_fall_back_to_defaults() -> Result<()> {
        let candidates = [PathBuf::from("does/not/exist.toml")];
        let loaded = AppConfig::load_with_source(&candidates)?;
        assert!(loaded.source.is_none());
        assert!(AppConfig::load(&candidates).is_err());
        Ok(())
    }

    #[test]
    fn example_configuration_parses() {
        let raw = include_str!("../../../configs/gridmix.example.toml");
        let config: AppConfig = raw.parse().unwrap();
        assert_eq!(config.sources.eirgrid.timeout, Duration::from_secs(10));
        assert_eq!(config.sources.entsoe.timeout, Duration::from_secs(15));
    }
}
