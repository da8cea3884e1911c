use actix_web::{HttpRequest, HttpResponse, Responder, get, web};
use cerc::reporter::SnapshotFormat;
use serde::Deserialize;

use crate::reporting::Reporting;

macros_utils::routes! {
    route reports_route,
}

#[derive(Debug, Deserialize)]
pub struct ReportsQuery {
    #[serde(default)]
    format: Option<String>,
}

/// Latest outcome of every pathway; `?format=raw|json|json_flat`
#[get("/reports")]
pub async fn reports_route(
    req: HttpRequest,
    query: web::Query<ReportsQuery>,
    reporting: web::Data<Reporting>,
) -> impl Responder {
    if let Some(denied) = reporting.deny(&req) {
        return denied;
    }
    let Some(http) = &reporting.http else {
        return HttpResponse::NotFound().finish();
    };

    let format = query.format.as_deref().map(str::parse::<SnapshotFormat>).and_then(Result::ok).unwrap_or_default();
    HttpResponse::Ok().json(http.snapshot(format))
}
