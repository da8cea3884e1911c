use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a probe attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeResult {
    /// The callback arrived in time
    Success,
    /// The request failed, was rejected, or nobody called back in time
    Failure,
    /// The request could not be dispatched at all
    NonStarter,
}

impl fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeResult::Success => write!(f, "success"),
            ProbeResult::Failure => write!(f, "failure"),
            ProbeResult::NonStarter => write!(f, "nonstarter"),
        }
    }
}

/// Final report of one probe attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Name of the pathway the probe ran on
    pub pathway: String,

    pub result: ProbeResult,

    /// Failure reason; empty on success
    pub message: String,

    /// Time from registration to resolution
    #[serde(with = "crate::duration")]
    pub duration: Duration,

    /// When the outcome was decided
    pub timestamp: DateTime<Utc>,
}

impl Report {
    fn new(pathway: &str, result: ProbeResult, message: String, duration: Duration) -> Self {
        Self { pathway: pathway.to_string(), result, message, duration, timestamp: Utc::now() }
    }

    pub fn success(pathway: &str, duration: Duration) -> Self {
        Self::new(pathway, ProbeResult::Success, String::new(), duration)
    }

    pub fn failure(pathway: &str, message: impl Into<String>, duration: Duration) -> Self {
        Self::new(pathway, ProbeResult::Failure, message.into(), duration)
    }

    pub fn non_starter(pathway: &str, message: impl Into<String>) -> Self {
        Self::new(pathway, ProbeResult::NonStarter, message.into(), Duration::ZERO)
    }

    pub fn is_success(&self) -> bool {
        self.result == ProbeResult::Success
    }
}
