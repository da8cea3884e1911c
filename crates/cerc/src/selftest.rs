//! Probe targets served by cerc itself.
//!
//! Pointing a pathway at `/selftest/positive` closes the circle right away,
//! `/selftest/resp-timeout` closes it after [`DELAYED_ANSWER`]. Useful to
//! check a deployment end to end without an external system.

use std::time::Duration;

use actix_web::{HttpRequest, HttpResponse, web};
use tracing::{debug, warn};

use crate::callback::CALLBACK_USERNAME;
use crate::runner::{HEADER_TOKEN, HEADER_URL};

/// How long `/selftest/resp-timeout` waits before calling back
pub const DELAYED_ANSWER: Duration = Duration::from_secs(1);

/// HTTP client used to call back
#[derive(Clone)]
pub(crate) struct Receiver {
    client: reqwest::Client,
}

impl Receiver {
    pub(crate) fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self { client: reqwest::Client::builder().timeout(timeout).build()? })
    }

    /// Accept the probe and call back after `delay`
    fn receive(&self, req: &HttpRequest, delay: Duration) -> HttpResponse {
        let header = |name: &str| req.headers().get(name).and_then(|v| v.to_str().ok()).map(str::to_string);
        let (Some(url), Some(token)) = (header(HEADER_URL), header(HEADER_TOKEN)) else {
            return HttpResponse::BadRequest().body(format!("missing {HEADER_URL} or {HEADER_TOKEN} header"));
        };

        let client = self.client.clone();
        actix_web::rt::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            answer(&client, &url, &token).await;
        });

        HttpResponse::Ok().finish()
    }
}

async fn answer(client: &reqwest::Client, url: &str, token: &str) {
    match client.post(url).basic_auth(CALLBACK_USERNAME, Some(token)).send().await {
        Ok(response) if response.status().is_success() => {
            debug!(%url, "self-test callback accepted");
        }
        Ok(response) => {
            warn!(%url, status = response.status().as_u16(), "self-test callback rejected");
        }
        Err(e) => {
            warn!(%url, error = %e, "self-test callback failed");
        }
    }
}

pub(crate) async fn positive(req: HttpRequest, receiver: web::Data<Receiver>) -> HttpResponse {
    receiver.receive(&req, Duration::ZERO)
}

pub(crate) async fn resp_timeout(req: HttpRequest, receiver: web::Data<Receiver>) -> HttpResponse {
    receiver.receive(&req, DELAYED_ANSWER)
}
