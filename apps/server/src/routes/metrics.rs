use actix_web::{HttpRequest, HttpResponse, Responder, get, web};
use tracing::error;

use crate::reporting::Reporting;

macros_utils::routes! {
    route metrics_route,
}

/// Probe counters in the Prometheus text format
#[get("/metrics")]
pub async fn metrics_route(req: HttpRequest, reporting: web::Data<Reporting>) -> impl Responder {
    if let Some(denied) = reporting.deny(&req) {
        return denied;
    }
    let Some(prometheus) = &reporting.prometheus else {
        return HttpResponse::NotFound().finish();
    };

    match prometheus.render() {
        Ok(body) => HttpResponse::Ok().content_type(prometheus.content_type()).body(body),
        Err(e) => {
            error!(error = %e, "cannot encode metrics");
            HttpResponse::InternalServerError().finish()
        }
    }
}
