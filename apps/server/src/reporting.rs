use std::sync::Arc;

use actix_web::http::header::WWW_AUTHENTICATE;
use actix_web::{HttpRequest, HttpResponse};
use cerc::reporter::{HttpEndpointReporter, LogReporter, PrometheusReporter};
use cerc::{BasicAuth, BasicCredentials, CompositeReporter, Options};

use crate::config::{Config, ReportingConfig};
use crate::error::AppError;

/// Reporter backends, shared between the probes and the reporting routes
#[derive(Default)]
pub struct Reporting {
    pub prometheus: Option<Arc<PrometheusReporter>>,
    pub http: Option<Arc<HttpEndpointReporter>>,
    auth: Option<BasicAuth>,
}

impl Reporting {
    /// Validate `config`, then create its reporting backends. Metric
    /// registration never sees pathways that failed validation.
    pub fn for_config(config: &mut Config) -> Result<(Self, CompositeReporter), AppError> {
        config.check()?;
        Ok(Self::build(&config.reporting, &config.service)?)
    }

    /// Create the enabled backends for `options`' pathways. The returned
    /// reporter fans out to all of them.
    pub fn build(config: &ReportingConfig, options: &Options) -> prometheus::Result<(Self, CompositeReporter)> {
        let mut composite = CompositeReporter::default();
        if config.log {
            composite.push(Arc::new(LogReporter::new()));
        }

        let prometheus = if config.prometheus {
            let reporter = Arc::new(PrometheusReporter::new(&options.pathways)?);
            composite.push(reporter.clone());
            Some(reporter)
        } else {
            None
        };

        let http = config.http.then(|| {
            let reporter = Arc::new(HttpEndpointReporter::new());
            composite.push(reporter.clone());
            reporter
        });

        Ok((Self { prometheus, http, auth: options.auth.clone() }, composite))
    }

    /// The rejection for `req` if the reporting endpoints are guarded and it
    /// does not carry the right credentials
    pub fn deny(&self, req: &HttpRequest) -> Option<HttpResponse> {
        let expected = self.auth.as_ref()?;
        match BasicCredentials::from_request(req) {
            Some(credentials) if credentials.matches(expected) => None,
            _ => Some(HttpResponse::Unauthorized().insert_header((WWW_AUTHENTICATE, "Basic realm=\"cerc\"")).finish()),
        }
    }
}
