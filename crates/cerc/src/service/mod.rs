//! The cerc service: validated options, one runner per pathway, and the
//! HTTP routes callbacks arrive on.

#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use actix_web::web;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{info, warn};

use crate::callback::{self, RunnerMap};
use crate::error::StartError;
use crate::options::Options;
use crate::reporter::Reporter;
use crate::runner::Runner;
use crate::selftest::{self, Receiver};

/// Timeout of the self-test receiver's callbacks
const SELFTEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A cerc service instance - create with [`Cerc::new`]
pub struct Cerc {
    options: Options,
    runners: Arc<RunnerMap>,
    receiver: Receiver,
    shutdown: CancellationToken,
    tasks: TaskTracker,
    started: AtomicBool,
}

impl Cerc {
    /// Fill in defaults, validate the options and prepare one runner per
    /// pathway. Nothing runs until [`Cerc::start`].
    pub fn new(mut options: Options, reporter: Arc<dyn Reporter>) -> Result<Self, StartError> {
        options.fill_in_defaults();
        options.validate()?;

        let response_url = Arc::new(options.response_url_builder()?);
        let mut runners = RunnerMap::with_capacity(options.pathways.len());
        for pathway in &options.pathways {
            let name = pathway.name.clone();
            let runner = Runner::new(pathway.clone(), Arc::clone(&reporter), Arc::clone(&response_url))
                .map_err(|source| StartError::Client { pathway: name.clone(), source })?;
            runners.insert(name, Arc::new(runner));
        }

        let receiver = Receiver::new(SELFTEST_TIMEOUT)
            .map_err(|source| StartError::Client { pathway: "selftest".into(), source })?;

        Ok(Self {
            options,
            runners: Arc::new(runners),
            receiver,
            shutdown: CancellationToken::new(),
            tasks: TaskTracker::new(),
            started: AtomicBool::new(false),
        })
    }

    /// The effective options, defaults filled in
    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn runner(&self, pathway: &str) -> Option<&Arc<Runner>> {
        self.runners.get(pathway)
    }

    /// Spawn the runner loops. Must be called within a tokio runtime;
    /// later calls are no-ops.
    pub fn start(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            warn!("cerc service already started");
            return;
        }

        for runner in self.runners.values() {
            self.tasks.spawn(Arc::clone(runner).run(self.shutdown.clone(), self.tasks.clone()));
        }
        info!(pathways = self.runners.len(), address = %self.options.address, "cerc service started");
    }

    /// Routes to mount on the HTTP server
    pub fn router(&self) -> CercRouter {
        CercRouter {
            runners: web::Data::from(Arc::clone(&self.runners)),
            receiver: web::Data::new(self.receiver.clone()),
        }
    }

    /// Stop all runners, fail probes still in their grace window and wait
    /// for the attempts to wind down. In-flight requests still finish within their timeout.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        self.tasks.close();
        self.tasks.wait().await;
        info!("cerc service stopped");
    }
}

/// Callback and self-test routes, cheap to clone into every server worker
#[derive(Clone)]
pub struct CercRouter {
    runners: web::Data<RunnerMap>,
    receiver: web::Data<Receiver>,
}

impl CercRouter {
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.runners.clone())
            .app_data(self.receiver.clone())
            .service(web::resource("/callback/{name:.*}").to(callback::callback))
            .service(web::resource("/selftest/positive").to(selftest::positive))
            .service(web::resource("/selftest/resp-timeout").to(selftest::resp_timeout));
    }
}
