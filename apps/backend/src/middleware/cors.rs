use std::env;

use actix_cors::Cors;
use actix_web::http::header;

use crate::extractors::current_player::{PLAYER_ID_HEADER, PLAYER_NAME_HEADER};

/// Origins from `CORS_ALLOWED_ORIGINS` (comma separated, http/https only).
///
/// Empty or `null` entries are ignored; with nothing valid configured only
/// the local dev client is allowed.
pub fn allowed_origins() -> Vec<String> {
    let raw = env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default();
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "null")
        .filter(|s| s.starts_with("http://") || s.starts_with("https://"))
        .map(str::to_string)
        .collect();

    if origins.is_empty() {
        vec![
            "http://localhost:3000".to_string(),
            "http://127.0.0.1:3000".to_string(),
        ]
    } else {
        origins
    }
}

pub fn cors_middleware() -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::HeaderName::from_static(PLAYER_ID_HEADER),
            header::HeaderName::from_static(PLAYER_NAME_HEADER),
        ])
        .expose_headers(vec![
            header::HeaderName::from_static("x-trace-id"),
            header::HeaderName::from_static("x-request-id"),
        ])
        .max_age(3600);

    for origin in allowed_origins() {
        cors = cors.allowed_origin(&origin);
    }
    cors
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn filters_invalid_origins() {
        env::set_var(
            "CORS_ALLOWED_ORIGINS",
            " https://sorter.example , null, ftp://x, ,http://localhost:5173",
        );
        assert_eq!(
            allowed_origins(),
            vec!["https://sorter.example", "http://localhost:5173"]
        );
        env::remove_var("CORS_ALLOWED_ORIGINS");
    }

    #[test]
    #[serial]
    fn falls_back_to_localhost() {
        env::remove_var("CORS_ALLOWED_ORIGINS");
        assert_eq!(allowed_origins().len(), 2);
    }
}
