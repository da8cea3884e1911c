use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::PathwayError;

/// Methods a pathway may use for its outbound request
pub const VALID_METHODS: [&str; 9] =
    ["GET", "HEAD", "POST", "PUT", "PATCH", "DELETE", "CONNECT", "OPTIONS", "TRACE"];

/// Timeout applied to the outbound request when none is configured
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Basic authentication credentials for requests or endpoints
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth").field("username", &self.username).field("password", &"***").finish()
    }
}

/// Timeouts of a single probe attempt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Timeouts {
    /// Hard deadline for the outbound request
    #[serde(with = "crate::duration", default)]
    pub request: Duration,

    /// Grace window for the callback after the endpoint accepted the probe
    #[serde(with = "crate::duration", default)]
    pub response: Duration,
}

/// One monitored circuit: the request we send and the callback we expect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Pathway {
    pub name: String,
    pub endpoint: String,
    pub method: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<BasicAuth>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,

    #[serde(default)]
    pub timeouts: Timeouts,

    /// Time between two probe attempts. Also read from `duration`.
    #[serde(with = "crate::duration", alias = "duration", default)]
    pub period: Duration,
}

impl Pathway {
    /// Create a pathway with all timings unset
    pub fn new(name: impl Into<String>, endpoint: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: endpoint.into(),
            method: method.into(),
            auth: None,
            payload: None,
            timeouts: Timeouts::default(),
            period: Duration::ZERO,
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub fn with_timeouts(mut self, request: Duration, response: Duration) -> Self {
        self.timeouts = Timeouts { request, response };
        self
    }

    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn with_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.auth = Some(BasicAuth { username: username.into(), password: password.into() });
        self
    }

    /// Fill unset timings. Never touches a value that is already non-zero.
    pub(crate) fn fill_in_defaults(&mut self, default_period: Duration) {
        if self.period.is_zero() {
            self.period = default_period;
        }
        if self.timeouts.request.is_zero() {
            self.timeouts.request = DEFAULT_REQUEST_TIMEOUT;
        }
        if self.timeouts.response.is_zero() {
            self.timeouts.response = self.period / 2;
        }
    }

    pub(crate) fn validate(&self) -> Result<(), PathwayError> {
        if self.name.is_empty() {
            return Err(PathwayError::MissingName);
        }
        if self.endpoint.is_empty() {
            return Err(PathwayError::MissingEndpoint);
        }
        Url::parse(&self.endpoint)?;

        if !VALID_METHODS.contains(&self.method.as_str()) {
            return Err(PathwayError::InvalidMethod(self.method.clone()));
        }

        if self.period.is_zero() {
            return Err(PathwayError::ZeroDuration("period"));
        }
        if self.timeouts.request.is_zero() {
            return Err(PathwayError::ZeroDuration("request timeout"));
        }
        if self.timeouts.response.is_zero() {
            return Err(PathwayError::ZeroDuration("response timeout"));
        }

        Ok(())
    }

    /// Method as understood by the HTTP client. Only valid after validation.
    pub(crate) fn http_method(&self) -> reqwest::Method {
        reqwest::Method::from_bytes(self.method.as_bytes()).unwrap_or(reqwest::Method::GET)
    }
}
