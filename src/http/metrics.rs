use std::sync::Arc;

use actix_web::{web, HttpResponse};

use crate::{
    errors::UdError,
    metrics::{manager::MetricsManager, registry},
};

pub const METRICS_ROUTE: &str = "/metrics";

// Scrapes do not count themselves unless instrument_exposition is set; the
// two observed deployments disagreed, so both stay representable.
pub async fn metrics_handler(metrics_manager: web::Data<Arc<MetricsManager>>) -> Result<HttpResponse, UdError> {
    if metrics_manager.instrument_exposition {
        metrics_manager.http_metrics.observe_request("GET", METRICS_ROUTE, 200)?;
    }

    let body = metrics_manager.registry.snapshot()?;

    Ok(HttpResponse::Ok().content_type(registry::CONTENT_TYPE).body(body))
}

pub fn init_metrics_service(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/metrics").route(web::get().to(metrics_handler)));
}
