use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};

use crate::error::AppError;
use crate::errors::ErrorCode;

const MAX_ID_LEN: usize = 64;

/// Session (or room) id from the `{id}` path segment.
///
/// Only the shape is checked here; existence is the service's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(pub String);

fn parse_id(raw: Option<&str>) -> Result<SessionId, AppError> {
    let raw = raw.ok_or_else(|| {
        AppError::bad_request(ErrorCode::InvalidSessionId, "Missing id parameter")
    })?;
    let valid = !raw.is_empty()
        && raw.len() <= MAX_ID_LEN
        && raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(AppError::bad_request(
            ErrorCode::InvalidSessionId,
            format!("Invalid id: {raw}"),
        ));
    }
    Ok(SessionId(raw.to_owned()))
}

impl FromRequest for SessionId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(parse_id(req.match_info().get("id")))
    }
}
