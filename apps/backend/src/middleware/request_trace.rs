//! Assigns each request a trace id.
//!
//! A well-formed `x-request-id` from the gateway is reused, otherwise a fresh
//! UUID is minted. The id is stored as [`TraceId`] in request extensions, set
//! as the task-local `trace_ctx` id and echoed back as `x-request-id`.

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::HttpMessage;
use futures_util::future::{ready, LocalBoxFuture, Ready};
use uuid::Uuid;

use crate::trace_ctx;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const MAX_INCOMING_ID_LEN: usize = 64;

/// Trace id of the current request, readable from request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceId(pub String);

fn incoming_id(req: &ServiceRequest) -> Option<String> {
    let raw = req.headers().get(REQUEST_ID_HEADER)?.to_str().ok()?.trim();
    let usable = !raw.is_empty()
        && raw.len() <= MAX_INCOMING_ID_LEN
        && raw
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    usable.then(|| raw.to_owned())
}

pub struct RequestTrace;

impl<S, B> Transform<S, ServiceRequest> for RequestTrace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = RequestTraceMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestTraceMiddleware { service }))
    }
}

pub struct RequestTraceMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestTraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let trace_id = incoming_id(&req).unwrap_or_else(|| Uuid::new_v4().to_string());
        req.extensions_mut().insert(TraceId(trace_id.clone()));

        let fut = self.service.call(req);
        Box::pin(trace_ctx::with_trace_id(trace_id.clone(), async move {
            let mut res = fut.await?;
            // Incoming ids are filtered to header-safe bytes, UUIDs always are
            if let Ok(value) = HeaderValue::from_str(&trace_id) {
                res.headers_mut()
                    .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
            }
            Ok(res)
        }))
    }
}
