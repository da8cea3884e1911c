//! The per-pathway scheduling loop and the probe attempt.
//!
//! Every tick of a [`Runner`] spawns one attempt with a fresh token. The
//! attempt sends the pathway's request and, once the endpoint accepted it
//! with a 200, waits out the grace window. Resolution goes through
//! [`ActiveProbes::take`]: the callback handler ([`Runner::answer`]) and the
//! attempt race for the token and only the winner reports.

use std::error::Error as StdError;
use std::sync::Arc;

use reqwest::StatusCode;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info};

use crate::error::ProbeSetupError;
use crate::pathway::Pathway;
use crate::report::Report;
use crate::reporter::Reporter;
use crate::response_url::ResponseUrlBuilder;
use crate::token::Token;
use crate::tracker::ActiveProbes;

/// Header carrying the correlation token of the attempt
pub const HEADER_TOKEN: &str = "X-Cerc-Token";

/// Header carrying the URL the callee must call back
pub const HEADER_URL: &str = "X-Cerc-URL";

/// Probes one pathway periodically
pub struct Runner {
    pathway: Pathway,
    active: ActiveProbes,
    client: reqwest::Client,
    reporter: Arc<dyn Reporter>,
    response_url: Arc<ResponseUrlBuilder>,
}

impl Runner {
    /// Create a runner for a pathway that passed `Options::validate`
    pub(crate) fn new(
        pathway: Pathway,
        reporter: Arc<dyn Reporter>,
        response_url: Arc<ResponseUrlBuilder>,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(pathway.timeouts.request).build()?;

        Ok(Self { pathway, active: ActiveProbes::new(), client, reporter, response_url })
    }

    pub fn name(&self) -> &str {
        &self.pathway.name
    }

    pub fn pathway(&self) -> &Pathway {
        &self.pathway
    }

    /// Number of attempts waiting for resolution
    pub fn pending(&self) -> usize {
        self.active.len()
    }

    /// Tick until `shutdown` is cancelled. The first probe starts one period in.
    pub async fn run(self: Arc<Self>, shutdown: CancellationToken, tasks: TaskTracker) {
        let period = self.pathway.period;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(pathway = %self.name(), period = %humantime::format_duration(period), "pathway runner started");
        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    self.launch(&shutdown, &tasks);
                }
            }
        }
        info!(pathway = %self.name(), pending = self.pending(), "pathway runner stopped");
    }

    /// Start one probe attempt in the background
    pub fn launch(self: &Arc<Self>, shutdown: &CancellationToken, tasks: &TaskTracker) {
        let token = Token::generate();
        self.reporter.probe_started(self.name());

        let runner = Arc::clone(self);
        let shutdown = shutdown.clone();
        tasks.spawn(async move { runner.probe(token, shutdown).await });
    }

    /// One probe attempt, from dispatch to resolution
    pub async fn probe(&self, token: Token, shutdown: CancellationToken) {
        let request = match self.prepare(&token) {
            Ok(request) => request,
            Err(e) => {
                debug!(pathway = %self.name(), error = %e, "cannot prepare probe request");
                self.reporter.probe_finished(&Report::non_starter(self.name(), e.to_string()));
                return;
            }
        };

        self.active.register(token.clone());
        debug!(pathway = %self.name(), %token, "probe dispatched");

        match self.client.execute(request).await {
            Err(e) => {
                self.fail_if_unresolved(&token, error_chain(&e));
                return;
            }
            Ok(response) if response.status() != StatusCode::OK => {
                let reason = format!("expected 200 status code, got {}", response.status().as_u16());
                self.fail_if_unresolved(&token, reason);
                return;
            }
            Ok(_) => {}
        }

        // the endpoint accepted the probe, give the circle time to close
        tokio::select! {
            () = tokio::time::sleep(self.pathway.timeouts.response) => {
                self.fail_if_unresolved(&token, "response timeout");
            }
            () = shutdown.cancelled() => {
                self.fail_if_unresolved(&token, "probe cancelled by shutdown");
            }
        }
    }

    /// Resolve `token` as a completed circle. Returns false for unknown or
    /// already resolved tokens.
    pub fn answer(&self, token: &str) -> bool {
        let Some(probe) = self.active.take(token) else {
            return false;
        };

        self.reporter.probe_finished(&Report::success(self.name(), probe.elapsed()));
        true
    }

    #[cfg(test)]
    pub(crate) fn register(&self, token: Token) {
        self.active.register(token);
    }

    fn fail_if_unresolved(&self, token: &Token, reason: impl Into<String>) -> bool {
        let Some(probe) = self.active.take(token.as_str()) else {
            debug!(pathway = %self.name(), %token, "probe was resolved earlier");
            return false;
        };

        self.reporter.probe_finished(&Report::failure(self.name(), reason, probe.elapsed()));
        true
    }

    fn prepare(&self, token: &Token) -> Result<reqwest::Request, ProbeSetupError> {
        let response_url = self.response_url.build(self.name(), token.as_str())?;

        let mut request = self
            .client
            .request(self.pathway.http_method(), &self.pathway.endpoint)
            .header(HEADER_TOKEN, token.as_str())
            .header(HEADER_URL, response_url.as_str());
        if let Some(auth) = &self.pathway.auth {
            request = request.basic_auth(&auth.username, Some(&auth.password));
        }
        if let Some(payload) = &self.pathway.payload {
            request = request.body(payload.clone());
        }

        request.build().map_err(ProbeSetupError::Request)
    }
}

/// `error: cause: root cause`
fn error_chain(error: &dyn StdError) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let cause_message = cause.to_string();
        if !message.ends_with(&cause_message) {
            message.push_str(": ");
            message.push_str(&cause_message);
        }
        source = cause.source();
    }
    message
}
