//! Application configuration loading from config.toml
//!
//! Every section is optional; anything left out falls back to the defaults
//! below, so the service starts without a config file at all.

use crate::errors::{Error, Result};
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Database settings
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Scheduled job settings
    #[serde(default)]
    pub jobs: JobsConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address the API listens on
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1:8000".to_string()
}

/// Database settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL; `DATABASE_URL` takes precedence when set
    #[serde(default)]
    pub url: Option<String>,
    /// Insert the demo customers, products and order into an empty database
    #[serde(default)]
    pub seed_demo_data: bool,
}

/// Settings for one scheduled job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobConfig {
    /// Whether the job is scheduled at all
    pub enabled: bool,
    /// Seconds between runs
    pub interval_secs: u64,
    /// Append-only log file the job writes to
    pub log_path: PathBuf,
}

/// A `[jobs.<name>]` table as written; missing keys keep that job's defaults.
#[derive(Debug, Deserialize)]
struct JobOverrides {
    enabled: Option<bool>,
    interval_secs: Option<u64>,
    log_path: Option<PathBuf>,
}

impl JobOverrides {
    fn apply(self, defaults: JobConfig) -> JobConfig {
        JobConfig {
            enabled: self.enabled.unwrap_or(defaults.enabled),
            interval_secs: self.interval_secs.unwrap_or(defaults.interval_secs),
            log_path: self.log_path.unwrap_or(defaults.log_path),
        }
    }
}

fn heartbeat_job<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<JobConfig, D::Error> {
    JobOverrides::deserialize(d).map(|o| o.apply(JobConfig::heartbeat()))
}

fn low_stock_job<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<JobConfig, D::Error> {
    JobOverrides::deserialize(d).map(|o| o.apply(JobConfig::low_stock()))
}

fn report_job<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<JobConfig, D::Error> {
    JobOverrides::deserialize(d).map(|o| o.apply(JobConfig::report()))
}

fn order_reminders_job<'de, D: Deserializer<'de>>(
    d: D,
) -> std::result::Result<JobConfig, D::Error> {
    JobOverrides::deserialize(d).map(|o| o.apply(JobConfig::order_reminders()))
}

impl JobConfig {
    fn new(interval_secs: u64, log_path: &str) -> Self {
        Self {
            enabled: true,
            interval_secs,
            log_path: PathBuf::from(log_path),
        }
    }

    fn heartbeat() -> Self {
        Self::new(300, "/tmp/crm_heartbeat_log.txt")
    }

    fn low_stock() -> Self {
        Self::new(12 * 60 * 60, "/tmp/low_stock_updates_log.txt")
    }

    fn report() -> Self {
        Self::new(7 * 24 * 60 * 60, "/tmp/crm_report_log.txt")
    }

    fn order_reminders() -> Self {
        Self::new(24 * 60 * 60, "/tmp/order_reminders_log.txt")
    }
}

/// Settings for all scheduled jobs
#[derive(Debug, Clone, Deserialize)]
pub struct JobsConfig {
    /// Liveness heartbeat
    #[serde(default = "JobConfig::heartbeat", deserialize_with = "heartbeat_job")]
    pub heartbeat: JobConfig,
    /// Low-stock replenishment
    #[serde(default = "JobConfig::low_stock", deserialize_with = "low_stock_job")]
    pub low_stock: JobConfig,
    /// Customer/order/revenue report
    #[serde(default = "JobConfig::report", deserialize_with = "report_job")]
    pub report: JobConfig,
    /// Recent order reminders
    #[serde(default = "JobConfig::order_reminders", deserialize_with = "order_reminders_job")]
    pub order_reminders: JobConfig,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            heartbeat: JobConfig::heartbeat(),
            low_stock: JobConfig::low_stock(),
            report: JobConfig::report(),
            order_reminders: JobConfig::order_reminders(),
        }
    }
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads the application configuration.
///
/// The path comes from `CRM_CONFIG`, falling back to `./config.toml`. A missing
/// file is not an error: defaults are used instead.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var("CRM_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    if Path::new(&path).exists() {
        let config = load_config(&path)?;
        info!("Loaded configuration from {}", path);
        Ok(config)
    } else {
        info!("No configuration file at {}, using defaults", path);
        Ok(AppConfig::default())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [server]
            bind_address = "0.0.0.0:9000"

            [database]
            url = "sqlite://crm.sqlite?mode=rwc"
            seed_demo_data = true

            [jobs.heartbeat]
            enabled = false
            interval_secs = 60
            log_path = "/var/log/heartbeat.txt"
        "#;

        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.bind_address, "0.0.0.0:9000");
        assert_eq!(
            config.database.url.as_deref(),
            Some("sqlite://crm.sqlite?mode=rwc")
        );
        assert!(config.database.seed_demo_data);
        assert!(!config.jobs.heartbeat.enabled);
        assert_eq!(config.jobs.heartbeat.interval_secs, 60);
        assert_eq!(
            config.jobs.heartbeat.log_path,
            PathBuf::from("/var/log/heartbeat.txt")
        );
        // Untouched jobs keep their defaults
        assert_eq!(config.jobs.low_stock, JobConfig::low_stock());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.bind_address, "127.0.0.1:8000");
        assert!(config.database.url.is_none());
        assert!(!config.database.seed_demo_data);
        assert_eq!(config.jobs.heartbeat.interval_secs, 300);
        assert_eq!(
            config.jobs.report.log_path,
            PathBuf::from("/tmp/crm_report_log.txt")
        );
    }

    #[test]
    fn test_job_enabled_defaults_to_true() {
        let toml_str = r#"
            [jobs.report]
            interval_secs = 10
            log_path = "report.txt"
        "#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert!(config.jobs.report.enabled);
    }

    #[test]
    fn test_partial_job_table_keeps_job_defaults() {
        let toml_str = r"
            [jobs.heartbeat]
            enabled = false

            [jobs.order_reminders]
            interval_secs = 60
        ";
        let config: AppConfig = toml::from_str(toml_str).unwrap();

        assert!(!config.jobs.heartbeat.enabled);
        assert_eq!(config.jobs.heartbeat.interval_secs, 300);
        assert_eq!(
            config.jobs.heartbeat.log_path,
            PathBuf::from("/tmp/crm_heartbeat_log.txt")
        );

        assert!(config.jobs.order_reminders.enabled);
        assert_eq!(config.jobs.order_reminders.interval_secs, 60);
        assert_eq!(
            config.jobs.order_reminders.log_path,
            PathBuf::from("/tmp/order_reminders_log.txt")
        );
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("definitely/not/here/config.toml");
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let path =
            std::env::temp_dir().join(format!("crm_bad_config_{}.toml", std::process::id()));
        std::fs::write(&path, "[server\nbind_address = ").unwrap();
        let result = load_config(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result.unwrap_err(), Error::Config { message: _ }));
    }
}
