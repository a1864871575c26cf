//! Per-request `request` span: trace id, method, route pattern and player tag.
//!
//! Reads the [`TraceId`] stored by `RequestTrace`, so it must sit inside it
//! (registered before it with `.wrap`).

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error, HttpMessage};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use tracing::{info_span, Instrument};

use super::request_trace::TraceId;
use crate::extractors::PLAYER_ID_HEADER;
use crate::logging::pii::player_tag;

/// Trace id set by `RequestTrace`, or `"unknown"` outside it.
pub(crate) fn trace_id_of(req: &ServiceRequest) -> String {
    req.extensions()
        .get::<TraceId>()
        .map(|t| t.0.clone())
        .unwrap_or_else(|| "unknown".to_owned())
}

/// Short tag of the calling player, empty for anonymous requests.
pub(crate) fn player_of(req: &ServiceRequest) -> String {
    req.headers()
        .get(PLAYER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|uid| player_tag(uid.trim()))
        .unwrap_or_default()
}

#[derive(Clone, Default)]
pub struct TraceSpan;

impl<S, B> Transform<S, ServiceRequest> for TraceSpan
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = TraceSpanMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TraceSpanMiddleware { service }))
    }
}

pub struct TraceSpanMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for TraceSpanMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Route patterns keep session ids and room codes out of span names
        let route = req
            .match_pattern()
            .unwrap_or_else(|| req.path().to_owned());
        let span = info_span!(
            "request",
            trace_id = %trace_id_of(&req),
            method = %req.method(),
            route = %route,
            player = %player_of(&req),
        );

        Box::pin(self.service.call(req).instrument(span))
    }
}
