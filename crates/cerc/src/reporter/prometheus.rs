//! Prometheus counters per pathway.
//!
//! Every pathway gets four counters, `cerc_<pathway>_total`,
//! `cerc_<pathway>_success`, `cerc_<pathway>_failure` and
//! `cerc_<pathway>_nonstarter`, registered in a registry owned by the
//! reporter and rendered by [`PrometheusReporter::render`].

use std::collections::HashMap;

use prometheus::{Encoder, IntCounter, Opts, Registry, TextEncoder};
use tracing::warn;

use super::Reporter;
use crate::pathway::Pathway;
use crate::report::{ProbeResult, Report};

const NAMESPACE: &str = "cerc";

struct PathwayCounters {
    total: IntCounter,
    success: IntCounter,
    failure: IntCounter,
    nonstarter: IntCounter,
}

impl PathwayCounters {
    fn register(registry: &Registry, pathway: &str) -> prometheus::Result<Self> {
        let subsystem = metric_safe(pathway);
        let counter = |name: &str, help: &str| -> prometheus::Result<IntCounter> {
            let counter = IntCounter::with_opts(
                Opts::new(name, format!("{help} for pathway {pathway}"))
                    .namespace(NAMESPACE)
                    .subsystem(subsystem.as_str()),
            )?;
            registry.register(Box::new(counter.clone()))?;
            Ok(counter)
        };

        Ok(Self {
            total: counter("total", "Probes started")?,
            success: counter("success", "Probes that completed the circle")?,
            failure: counter("failure", "Probes that failed")?,
            nonstarter: counter("nonstarter", "Probes that could not be started")?,
        })
    }
}

/// Counts probe outcomes per pathway
pub struct PrometheusReporter {
    registry: Registry,
    counters: HashMap<String, PathwayCounters>,
}

impl PrometheusReporter {
    /// Register counters for every pathway in a fresh registry
    pub fn new(pathways: &[Pathway]) -> prometheus::Result<Self> {
        Self::with_registry(Registry::new(), pathways)
    }

    pub fn with_registry(registry: Registry, pathways: &[Pathway]) -> prometheus::Result<Self> {
        let mut counters = HashMap::with_capacity(pathways.len());
        for pathway in pathways {
            counters.insert(pathway.name.clone(), PathwayCounters::register(&registry, &pathway.name)?);
        }
        Ok(Self { registry, counters })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Current metrics in the Prometheus text exposition format
    pub fn render(&self) -> prometheus::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }

    pub fn content_type(&self) -> &'static str {
        prometheus::TEXT_FORMAT
    }

    fn counters(&self, pathway: &str) -> Option<&PathwayCounters> {
        let counters = self.counters.get(pathway);
        if counters.is_none() {
            warn!(pathway, "cannot find metrics for pathway - we might be reporting incorrectly");
        }
        counters
    }
}

impl Reporter for PrometheusReporter {
    fn probe_started(&self, pathway: &str) {
        if let Some(counters) = self.counters(pathway) {
            counters.total.inc();
        }
    }

    fn probe_finished(&self, report: &Report) {
        let Some(counters) = self.counters(&report.pathway) else {
            return;
        };
        match report.result {
            ProbeResult::Success => counters.success.inc(),
            ProbeResult::Failure => counters.failure.inc(),
            ProbeResult::NonStarter => counters.nonstarter.inc(),
        }
    }

    fn name(&self) -> &'static str {
        "prometheus"
    }
}

/// Replace everything a metric name cannot contain with `_`
fn metric_safe(name: &str) -> String {
    name.chars().map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' }).collect()
}
