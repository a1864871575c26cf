use std::ops::{Deref, DerefMut};

use actix_web::dev::Payload;
use actix_web::web::BytesMut;
use actix_web::{FromRequest, HttpRequest};
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use serde_json::Error as JsonError;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::logging::pii::Redacted;
use crate::trace_ctx;

/// JSON body extractor whose failures render as `BAD_REQUEST` Problem Details
/// with a sanitized detail instead of actix's plain-text error.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T> ValidatedJson<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for ValidatedJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for ValidatedJson<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// Request bodies here are a few fields; anything larger is rejected unread.
const MAX_BODY_BYTES: usize = 16 * 1024;

impl<T> FromRequest for ValidatedJson<T>
where
    T: DeserializeOwned + 'static,
{
    type Error = AppError;
    type Future = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let mut payload = payload.take();
        let content_type = req
            .headers()
            .get("content-type")
            .and_then(|ct| ct.to_str().ok())
            .unwrap_or("")
            .to_string();

        Box::pin(async move {
            let trace_id = trace_ctx::trace_id();

            let mut body = BytesMut::new();
            while let Some(chunk) = payload.next().await {
                let chunk = chunk.map_err(|e| {
                    warn!(trace_id = %trace_id, error = %e, "failed to read request body chunk");
                    AppError::bad_request(ErrorCode::BadRequest, "Failed to read request body")
                })?;
                if body.len() + chunk.len() > MAX_BODY_BYTES {
                    return Err(AppError::bad_request(
                        ErrorCode::BadRequest,
                        format!("Request body exceeds {MAX_BODY_BYTES} bytes"),
                    ));
                }
                body.extend_from_slice(&chunk);
            }

            parse_body(&body, &trace_id, &content_type).map(ValidatedJson)
        })
    }
}

fn parse_body<T: DeserializeOwned>(
    body: &[u8],
    trace_id: &str,
    content_type: &str,
) -> Result<T, AppError> {
    serde_json::from_slice::<T>(body).map_err(|e| {
        debug!(
            trace_id,
            error = %Redacted(&e.to_string()),
            content_type,
            body_size = body.len(),
            "JSON parsing failed"
        );
        AppError::bad_request(ErrorCode::BadRequest, classify_json_error(&e))
    })
}

/// Sanitized detail for a serde_json failure; never echoes the body.
fn classify_json_error(error: &JsonError) -> String {
    match error.classify() {
        serde_json::error::Category::Syntax => {
            let line = error.line();
            format!("Invalid JSON at line {line}")
        }
        serde_json::error::Category::Eof => "Invalid JSON: unexpected end of input".to_string(),
        serde_json::error::Category::Data => {
            "Invalid JSON: wrong types for one or more fields".to_string()
        }
        serde_json::error::Category::Io => "Invalid JSON: I/O error while reading body".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct SwipeBody {
        direction: String,
    }

    fn detail_of<T: DeserializeOwned + std::fmt::Debug>(body: &str) -> String {
        let err = parse_body::<T>(body.as_bytes(), "t", "application/json").unwrap_err();
        assert_eq!(err.code(), ErrorCode::BadRequest);
        classify_json_error(&serde_json::from_str::<T>(body).unwrap_err())
    }

    #[test]
    fn parses_valid_body() {
        let body: SwipeBody = parse_body(br#"{"direction":"up"}"#, "t", "").unwrap();
        assert_eq!(body.direction, "up");
    }

    #[test]
    fn syntax_error_reports_line() {
        let detail = detail_of::<SwipeBody>("{\n\"direction\": }");
        assert_eq!(detail, "Invalid JSON at line 2");
    }

    #[test]
    fn truncated_body_is_eof() {
        assert!(detail_of::<SwipeBody>(r#"{"direction": "up""#).contains("unexpected end of input"));
    }

    #[test]
    fn wrong_type_does_not_echo_value() {
        let detail = detail_of::<SwipeBody>(r#"{"direction": 12345}"#);
        assert!(detail.contains("wrong types"));
        assert!(!detail.contains("12345"));
    }

    #[test]
    fn missing_field_is_data_error() {
        assert!(detail_of::<SwipeBody>("{}").contains("wrong types"));
    }
}
