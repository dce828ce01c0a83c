/// Application settings loaded from config.toml
pub mod app;

/// Database configuration and connection management
pub mod database;

pub use app::{AppConfig, JobConfig, JobsConfig, load_app_configuration, load_config};
