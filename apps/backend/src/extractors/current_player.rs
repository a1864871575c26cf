//! Player identity from gateway-supplied headers.
//!
//! Authentication happens upstream; the gateway forwards the verified uid in
//! `x-player-id` and, optionally, a display name in `x-player-name`.

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use serde::Serialize;

use crate::domain::session::display_name_or_guest;
use crate::error::AppError;
use crate::errors::ErrorCode;

pub const PLAYER_ID_HEADER: &str = "x-player-id";
pub const PLAYER_NAME_HEADER: &str = "x-player-name";

const MAX_PLAYER_ID_LEN: usize = 128;
const MAX_DISPLAY_NAME_CHARS: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentPlayer {
    pub uid: String,
    /// Header name, or the `Guest-` fallback
    pub display_name: String,
}

fn header_str<'a>(req: &'a HttpRequest, name: &str) -> Result<Option<&'a str>, AppError> {
    match req.headers().get(name) {
        None => Ok(None),
        Some(v) => v.to_str().map(Some).map_err(|_| {
            AppError::bad_request(ErrorCode::InvalidHeader, format!("{name} must be visible ASCII"))
        }),
    }
}

fn parse_player(req: &HttpRequest) -> Result<Option<CurrentPlayer>, AppError> {
    let Some(uid) = header_str(req, PLAYER_ID_HEADER)?.map(str::trim) else {
        return Ok(None);
    };
    if uid.is_empty() {
        return Ok(None);
    }
    if uid.len() > MAX_PLAYER_ID_LEN {
        return Err(AppError::bad_request(
            ErrorCode::InvalidPlayerId,
            format!("{PLAYER_ID_HEADER} must be at most {MAX_PLAYER_ID_LEN} characters"),
        ));
    }

    let name: Option<String> = header_str(req, PLAYER_NAME_HEADER)?
        .map(|n| n.chars().take(MAX_DISPLAY_NAME_CHARS).collect());
    Ok(Some(CurrentPlayer {
        uid: uid.to_owned(),
        display_name: display_name_or_guest(uid, name.as_deref()),
    }))
}

impl FromRequest for CurrentPlayer {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(parse_player(req).and_then(|p| p.ok_or_else(AppError::unauthorized)))
    }
}

/// Identity for endpoints that also serve anonymous callers.
#[derive(Debug, Clone)]
pub struct MaybePlayer(pub Option<CurrentPlayer>);

impl FromRequest for MaybePlayer {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(parse_player(req).map(MaybePlayer))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    #[test]
    fn reads_id_and_name() {
        let req = TestRequest::default()
            .insert_header((PLAYER_ID_HEADER, "uid-12345"))
            .insert_header((PLAYER_NAME_HEADER, "Aiko"))
            .to_http_request();
        let p = parse_player(&req).unwrap().unwrap();
        assert_eq!(p.uid, "uid-12345");
        assert_eq!(p.display_name, "Aiko");
    }

    #[test]
    fn missing_name_falls_back_to_guest() {
        let req = TestRequest::default()
            .insert_header((PLAYER_ID_HEADER, "abcdefgh"))
            .to_http_request();
        assert_eq!(parse_player(&req).unwrap().unwrap().display_name, "Guest-abcde");
    }

    #[test]
    fn blank_id_is_anonymous() {
        let req = TestRequest::default()
            .insert_header((PLAYER_ID_HEADER, "   "))
            .to_http_request();
        assert!(parse_player(&req).unwrap().is_none());
    }

    #[test]
    fn overlong_id_is_rejected() {
        let req = TestRequest::default()
            .insert_header((PLAYER_ID_HEADER, "x".repeat(129)))
            .to_http_request();
        let err = parse_player(&req).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidPlayerId);
    }
}
