use actix_web::{web, HttpResponse};

use crate::domain::catalog::catalog_stats;
use crate::error::AppError;

/// GET /api/catalog/stats
async fn stats() -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(catalog_stats()))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/stats", web::get().to(stats));
}
