//! Helpers shared by the unit tests.

use std::time::Duration;

use parking_lot::Mutex;

use crate::report::Report;
use crate::reporter::Reporter;

/// Keeps every event it receives
#[derive(Default)]
pub struct RecordingReporter {
    started: Mutex<Vec<String>>,
    finished: Mutex<Vec<Report>>,
}

impl RecordingReporter {
    pub fn started(&self) -> Vec<String> {
        self.started.lock().clone()
    }

    pub fn finished(&self) -> Vec<Report> {
        self.finished.lock().clone()
    }

    /// Poll until `count` reports arrived or `within` elapsed
    pub async fn wait_for_reports(&self, count: usize, within: Duration) -> Vec<Report> {
        let deadline = tokio::time::Instant::now() + within;
        loop {
            let finished = self.finished();
            if finished.len() >= count || tokio::time::Instant::now() >= deadline {
                return finished;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

impl Reporter for RecordingReporter {
    fn probe_started(&self, pathway: &str) {
        self.started.lock().push(pathway.to_string());
    }

    fn probe_finished(&self, report: &Report) {
        self.finished.lock().push(report.clone());
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
