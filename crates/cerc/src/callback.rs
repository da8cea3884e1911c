//! Inbound callbacks that close a probe's circle.
//!
//! The callee authenticates with HTTP Basic auth, username `Bearer` and the
//! probe token as password, on `/callback/<pathway>`. Failed callbacks are
//! answered with a status code only; they are not probe outcomes and never
//! reach the reporters.

use std::collections::HashMap;
use std::sync::Arc;

use actix_web::http::header::WWW_AUTHENTICATE;
use actix_web::{HttpRequest, HttpResponse, web};
use tracing::debug;

use crate::auth::BasicCredentials;
use crate::runner::Runner;

/// Username callbacks must present
pub const CALLBACK_USERNAME: &str = "Bearer";

/// Runners by pathway name. Built once at startup, never changed afterwards.
pub type RunnerMap = HashMap<String, Arc<Runner>>;

pub(crate) async fn callback(
    req: HttpRequest,
    name: web::Path<String>,
    runners: web::Data<RunnerMap>,
) -> HttpResponse {
    let Some(credentials) = BasicCredentials::from_request(&req) else {
        debug!(pathway = %name, "callback without basic auth");
        return HttpResponse::Unauthorized().insert_header((WWW_AUTHENTICATE, "Basic realm=\"cerc\"")).finish();
    };
    if credentials.username != CALLBACK_USERNAME {
        debug!(pathway = %name, username = %credentials.username, "callback with wrong username");
        return HttpResponse::Forbidden().finish();
    }

    let Some(runner) = runners.get(name.as_str()) else {
        debug!(pathway = %name, "callback for unknown pathway");
        return HttpResponse::NotFound().finish();
    };

    // unknown and already resolved tokens look the same as forged ones
    if !runner.answer(&credentials.password) {
        debug!(pathway = %name, "callback with unknown or stale token");
        return HttpResponse::Forbidden().finish();
    }

    HttpResponse::Ok().finish()
}
