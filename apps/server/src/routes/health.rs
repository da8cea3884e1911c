use actix_web::{HttpResponse, Responder, get};

macros_utils::routes! {
    route health_route,
}

/// Liveness of the probe process, not of the monitored pathways.
/// Their outcomes are on `/metrics` and `/reports`.
#[get("/")]
pub async fn health_route() -> impl Responder {
    HttpResponse::Ok()
}
