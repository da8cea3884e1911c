use actix_web::web::ServiceConfig;

mod health;
mod metrics;
mod reports;

/// Server routes besides the ones mounted by the cerc router
pub fn routes(cfg: &mut ServiceConfig) {
    health::routes(cfg);
    metrics::routes(cfg);
    reports::routes(cfg);
}
