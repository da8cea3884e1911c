//! Latest report per pathway, served over HTTP.

use std::collections::{BTreeMap, HashMap};
use std::convert::Infallible;
use std::str::FromStr;

use parking_lot::RwLock;
use serde_json::{Map, Value, json};

use super::Reporter;
use crate::report::Report;

/// Shape of the snapshot returned by [`HttpEndpointReporter::snapshot`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SnapshotFormat {
    /// The stored reports, keyed by pathway
    Raw,
    /// Health summary with one entry per pathway
    #[default]
    Json,
    /// Health summary flattened into dot-separated keys
    JsonFlat,
}

impl FromStr for SnapshotFormat {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "raw" => Self::Raw,
            "json_flat" => Self::JsonFlat,
            _ => Self::Json,
        })
    }
}

/// Keeps the most recent report of every pathway in memory
#[derive(Debug, Default)]
pub struct HttpEndpointReporter {
    reports: RwLock<HashMap<String, Report>>,
}

impl HttpEndpointReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self, pathway: &str) -> Option<Report> {
        self.reports.read().get(pathway).cloned()
    }

    pub fn snapshot(&self, format: SnapshotFormat) -> Value {
        match format {
            SnapshotFormat::Raw => {
                let reports = self.reports.read();
                let sorted: BTreeMap<_, _> = reports.iter().collect();
                json!(sorted)
            }
            SnapshotFormat::Json => self.summary(),
            SnapshotFormat::JsonFlat => {
                let mut flat = Map::new();
                flatten_into(&mut flat, None, self.summary());
                Value::Object(flat)
            }
        }
    }

    fn summary(&self) -> Value {
        let reports = self.reports.read();
        let healthy = reports.values().all(Report::is_success);

        let mut summary = Map::new();
        summary.insert("status".into(), json!(if healthy { "healthy" } else { "unhealthy" }));
        for report in reports.values() {
            // messages produced by JSON-speaking endpoints stay structured
            let message = serde_json::from_str::<Value>(&report.message)
                .unwrap_or_else(|_| Value::String(report.message.clone()));
            summary.insert(
                report.pathway.clone(),
                json!({
                    "result": report.result,
                    "message": message,
                    "timestamp": report.timestamp,
                }),
            );
        }
        Value::Object(summary)
    }
}

impl Reporter for HttpEndpointReporter {
    fn probe_started(&self, _pathway: &str) {}

    fn probe_finished(&self, report: &Report) {
        self.reports.write().insert(report.pathway.clone(), report.clone());
    }

    fn name(&self) -> &'static str {
        "http-endpoint"
    }
}

fn flatten_into(out: &mut Map<String, Value>, prefix: Option<&str>, value: Value) {
    let key = |k: &str| prefix.map_or_else(|| k.to_string(), |p| format!("{p}.{k}"));
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                flatten_into(out, Some(&key(&k)), v);
            }
        }
        Value::Array(items) => {
            for (i, v) in items.into_iter().enumerate() {
                flatten_into(out, Some(&key(&i.to_string())), v);
            }
        }
        leaf => {
            out.insert(prefix.unwrap_or_default().to_string(), leaf);
        }
    }
}
