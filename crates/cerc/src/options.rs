use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::pathway::{BasicAuth, Pathway};
use crate::response_url::{DEFAULT_TEMPLATE, ResponseUrlBuilder, UrlTemplate};

/// Period used for pathways that do not configure one, unless overridden
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(30);

/// Certificate and key for serving over HTTPS
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpsOptions {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub crt: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub key: String,
}

impl HttpsOptions {
    /// Both certificate and key are present
    pub fn is_enabled(&self) -> bool {
        !self.crt.is_empty() && !self.key.is_empty()
    }
}

/// Configuration of a cerc service instance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Options {
    #[serde(default)]
    pub pathways: Vec<Pathway>,

    /// Listen address; a bare `:port` listens on all interfaces
    #[serde(default)]
    pub address: String,

    #[serde(with = "crate::duration", default)]
    pub default_period: Duration,

    /// Guards the reporting endpoints when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<BasicAuth>,

    #[serde(rename = "responseURLTemplate", alias = "responseUrlTemplate", default)]
    pub response_url_template: String,

    #[serde(default)]
    pub https: HttpsOptions,
}

impl Options {
    /// Complete the options with default values. Idempotent; explicit
    /// non-zero values are never overwritten.
    pub fn fill_in_defaults(&mut self) {
        if self.response_url_template.is_empty() {
            self.response_url_template = DEFAULT_TEMPLATE.to_string();
        }
        if self.default_period.is_zero() {
            self.default_period = DEFAULT_PERIOD;
        }
        for pathway in &mut self.pathways {
            pathway.fill_in_defaults(self.default_period);
        }
    }

    /// Ensure the options are usable. Expects defaults to be filled in.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for pathway in &self.pathways {
            pathway.validate().map_err(|source| ConfigError::InvalidPathway {
                pathway: pathway.name.clone(),
                source,
            })?;
            if !seen.insert(pathway.name.as_str()) {
                return Err(ConfigError::DuplicatePathway(pathway.name.clone()));
            }
        }

        if self.address.is_empty() {
            return Err(ConfigError::MissingAddress);
        }

        self.response_url_template.parse::<UrlTemplate>()?;

        Ok(())
    }

    /// Address suitable for binding a listener
    pub fn bind_address(&self) -> String {
        if self.address.starts_with(':') {
            format!("0.0.0.0{}", self.address)
        } else {
            self.address.clone()
        }
    }

    pub(crate) fn response_url_builder(&self) -> Result<ResponseUrlBuilder, ConfigError> {
        let template = self.response_url_template.parse::<UrlTemplate>()?;
        Ok(ResponseUrlBuilder::new(template, self.address.clone(), self.https.is_enabled()))
    }
}

impl fmt::Display for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_indented = |level: usize| {
            move |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
                writeln!(f, "{:indent$}{}: {}", "", label, value, indent = level * 2)
            }
        };
        let write_1 = write_indented(1);
        let write_2 = write_indented(2);

        writeln!(f, "Service")?;
        write_1(f, "Address", &self.address)?;
        write_1(f, "Default Period", &humantime::format_duration(self.default_period))?;
        write_1(f, "Response URL Template", &self.response_url_template)?;
        write_1(f, "HTTPS", &self.https.is_enabled())?;
        write_1(f, "Reporting Auth", &self.auth.is_some())?;

        for pathway in &self.pathways {
            writeln!(f, "Pathway {}", pathway.name)?;
            write_2(f, "Endpoint", &format!("{} {}", pathway.method, pathway.endpoint))?;
            write_2(f, "Period", &humantime::format_duration(pathway.period))?;
            write_2(f, "Request Timeout", &humantime::format_duration(pathway.timeouts.request))?;
            write_2(f, "Response Timeout", &humantime::format_duration(pathway.timeouts.response))?;
        }

        Ok(())
    }
}
