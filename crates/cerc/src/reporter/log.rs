use tracing::{debug, info, warn};

use super::Reporter;
use crate::report::{ProbeResult, Report};

/// Writes every outcome to the tracing log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl LogReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Reporter for LogReporter {
    fn probe_started(&self, pathway: &str) {
        debug!(pathway, "probe started");
    }

    fn probe_finished(&self, report: &Report) {
        let duration = humantime::format_duration(report.duration);
        match report.result {
            ProbeResult::Success => {
                info!(pathway = %report.pathway, %duration, "circle complete");
            }
            ProbeResult::Failure => {
                warn!(pathway = %report.pathway, %duration, reason = %report.message, "pathway probe failed");
            }
            ProbeResult::NonStarter => {
                warn!(pathway = %report.pathway, reason = %report.message, "pathway probe failed to start");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
