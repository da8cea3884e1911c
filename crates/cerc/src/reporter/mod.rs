//! Where probe outcomes go.
//!
//! The runner and the callback resolver only know [`Reporter`]. Backends:
//! - [`LogReporter`] writes outcomes to the tracing log
//! - [`PrometheusReporter`] counts them per pathway
//! - [`HttpEndpointReporter`] keeps the latest report per pathway for `/reports`
//!
//! [`CompositeReporter`] fans one event stream out to several backends.

mod http_endpoint;
mod log;
mod prometheus;

pub use self::http_endpoint::{HttpEndpointReporter, SnapshotFormat};
pub use self::log::LogReporter;
pub use self::prometheus::PrometheusReporter;

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use tracing::error;

use crate::report::Report;

/// Receives probe lifecycle events.
///
/// Called concurrently from many probe attempts and callback handlers, so
/// implementations must be thread safe. Calls happen on async worker
/// threads: keep them short and never block on I/O.
pub trait Reporter: Send + Sync {
    /// A probe attempt on `pathway` is about to start
    fn probe_started(&self, pathway: &str);

    /// A probe attempt finished. Called exactly once per attempt.
    fn probe_finished(&self, report: &Report);

    /// Name used in logs
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Broadcasts every event to all member reporters.
///
/// A panicking member is logged and skipped; the others still get the event.
#[derive(Default, Clone)]
pub struct CompositeReporter {
    reporters: Vec<Arc<dyn Reporter>>,
}

impl CompositeReporter {
    pub fn new(reporters: Vec<Arc<dyn Reporter>>) -> Self {
        Self { reporters }
    }

    pub fn push(&mut self, reporter: Arc<dyn Reporter>) {
        self.reporters.push(reporter);
    }

    pub fn len(&self) -> usize {
        self.reporters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reporters.is_empty()
    }

    fn each(&self, event: &'static str, call: impl Fn(&dyn Reporter)) {
        for reporter in &self.reporters {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| call(reporter.as_ref()))) {
                error!(
                    reporter = reporter.name(),
                    event,
                    "reporter panicked: {}",
                    panic_message(panic.as_ref())
                );
            }
        }
    }
}

impl Reporter for CompositeReporter {
    fn probe_started(&self, pathway: &str) {
        self.each("probe_started", |r| r.probe_started(pathway));
    }

    fn probe_finished(&self, report: &Report) {
        self.each("probe_finished", |r| r.probe_finished(report));
    }

    fn name(&self) -> &'static str {
        "composite"
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&'static str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
