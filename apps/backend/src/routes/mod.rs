use actix_web::web;

pub mod catalog;
pub mod health;
pub mod rankings;
pub mod rooms;
pub mod sessions;

/// Register every route. `main.rs` and the integration tests share this, so
/// tests exercise the same paths the server exposes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::configure_routes);
    cfg.service(web::scope("/api/sessions").configure(sessions::configure_routes));
    cfg.service(web::scope("/api/rooms").configure(rooms::configure_routes));
    cfg.service(web::scope("/api/rankings").configure(rankings::configure_routes));
    cfg.service(web::scope("/api/catalog").configure(catalog::configure_routes));
}
