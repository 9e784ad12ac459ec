//! Dashboard Configuration
//! Defaults, optional JSON file and `DASHBOARD_*` environment overrides.

use crate::data::table::{NET_PROFIT, REVENUE};
use crate::view::{Controls, ForecastSettings};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_FILE_VAR: &str = "DASHBOARD_CONFIG";

/// Longest projection the dashboard will draw.
pub const MAX_FORECAST_HORIZON: usize = 50;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub year_start: i32,
    pub year_end: i32,
    pub cache_ttl_secs: u64,
    pub forecast_horizon: usize,
    pub forecast_metrics: Vec<String>,
    pub default_metrics: Vec<String>,
    pub show_growth: bool,
    pub forecast_enabled: bool,
    /// Fixed generator seed; random per session when unset.
    pub seed: Option<u64>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            year_start: 2018,
            year_end: 2024,
            cache_ttl_secs: 3600,
            forecast_horizon: 1,
            forecast_metrics: vec![REVENUE.to_string(), NET_PROFIT.to_string()],
            default_metrics: vec![REVENUE.to_string(), NET_PROFIT.to_string()],
            show_growth: true,
            forecast_enabled: true,
            seed: None,
        }
    }
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

impl DashboardConfig {
    /// Load `.env`, then the JSON file named by `DASHBOARD_CONFIG`, then
    /// individual environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mut config = match std::env::var(CONFIG_FILE_VAR) {
            Ok(path) => {
                info!(path = %path, "loading dashboard config file");
                Self::from_json_file(Path::new(&path))?
            }
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Apply `DASHBOARD_*` overrides from a key lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("DASHBOARD_YEAR_START") {
            self.year_start = parse("DASHBOARD_YEAR_START", &v)?;
        }
        if let Some(v) = lookup("DASHBOARD_YEAR_END") {
            self.year_end = parse("DASHBOARD_YEAR_END", &v)?;
        }
        if let Some(v) = lookup("DASHBOARD_CACHE_TTL_SECS") {
            self.cache_ttl_secs = parse("DASHBOARD_CACHE_TTL_SECS", &v)?;
        }
        if let Some(v) = lookup("DASHBOARD_FORECAST_HORIZON") {
            self.forecast_horizon = parse("DASHBOARD_FORECAST_HORIZON", &v)?;
        }
        if let Some(v) = lookup("DASHBOARD_FORECAST_METRICS") {
            self.forecast_metrics = parse_list(&v);
        }
        if let Some(v) = lookup("DASHBOARD_DEFAULT_METRICS") {
            self.default_metrics = parse_list(&v);
        }
        if let Some(v) = lookup("DASHBOARD_SHOW_GROWTH") {
            self.show_growth = parse("DASHBOARD_SHOW_GROWTH", &v)?;
        }
        if let Some(v) = lookup("DASHBOARD_FORECAST_ENABLED") {
            self.forecast_enabled = parse("DASHBOARD_FORECAST_ENABLED", &v)?;
        }
        if let Some(v) = lookup("DASHBOARD_SEED") {
            self.seed = Some(parse("DASHBOARD_SEED", &v)?);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.year_start > self.year_end {
            return Err(ConfigError::Invalid(format!(
                "year_start {} is after year_end {}",
                self.year_start, self.year_end
            )));
        }
        if self.forecast_horizon == 0 || self.forecast_horizon > MAX_FORECAST_HORIZON {
            return Err(ConfigError::Invalid(format!(
                "forecast_horizon must be between 1 and {}",
                MAX_FORECAST_HORIZON
            )));
        }
        if self.cache_ttl_secs == 0 {
            return Err(ConfigError::Invalid(
                "cache_ttl_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Initial dashboard controls.
    pub fn controls(&self) -> Controls {
        Controls {
            selected_metrics: self.default_metrics.iter().cloned().collect(),
            show_growth: self.show_growth,
            forecast_enabled: self.forecast_enabled,
        }
    }

    pub fn forecast_settings(&self) -> ForecastSettings {
        ForecastSettings {
            metrics: self.forecast_metrics.clone(),
            horizon: self.forecast_horizon,
        }
    }
}
