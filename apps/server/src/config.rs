use std::fmt;
use std::fs;
use std::path::Path;

use cerc::Options;
use cerc::error::ConfigError;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Reporter backends to enable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportingConfig {
    /// Log every outcome through tracing
    pub log: bool,
    /// Count outcomes and serve them on `/metrics`
    pub prometheus: bool,
    /// Keep the latest outcome per pathway and serve it on `/reports`
    pub http: bool,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self { log: true, prometheus: true, http: true }
    }
}

/// The server configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub service: Options,
    #[serde(default)]
    pub reporting: ReportingConfig,
}

impl Config {
    /// Read `path`; `.toml` files are parsed as TOML, anything else as JSON
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let raw = fs::read_to_string(path).map_err(|source| AppError::ReadConfig { path: path.into(), source })?;

        if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("toml")) {
            toml::from_str(&raw).map_err(|source| AppError::ParseToml { path: path.into(), source })
        } else {
            serde_json::from_str(&raw).map_err(|source| AppError::ParseJson { path: path.into(), source })
        }
    }

    /// Fill in defaults and validate, leaving the effective configuration
    pub fn check(&mut self) -> Result<(), ConfigError> {
        self.service.fill_in_defaults();
        self.service.validate()
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.service)?;
        writeln!(f, "Reporting")?;
        writeln!(f, "  Log: {}", self.reporting.log)?;
        writeln!(f, "  Prometheus: {}", self.reporting.prometheus)?;
        writeln!(f, "  HTTP: {}", self.reporting.http)
    }
}
