//! One `request_completed` line per request, leveled by status class.

use std::time::Instant;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::Error as ActixError;
use futures_util::future::{ready, LocalBoxFuture, Ready};
use tracing::Level;

use super::trace_span::{player_of, trace_id_of};

pub struct StructuredLogger;

impl<S, B> Transform<S, ServiceRequest> for StructuredLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type InitError = ();
    type Transform = StructuredLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(StructuredLoggerMiddleware { service }))
    }
}

pub struct StructuredLoggerMiddleware<S> {
    service: S,
}

/// Fields of one completed request.
struct Completion {
    method: String,
    path: String,
    player: String,
    trace_id: String,
    status: u16,
    duration_us: u64,
}

macro_rules! completion_event {
    ($level:expr, $c:ident) => {
        tracing::event!(
            $level,
            http.method = %$c.method,
            url.path = %$c.path,
            http.status_code = $c.status,
            duration_us = $c.duration_us,
            player = %$c.player,
            trace_id = %$c.trace_id,
            "request_completed"
        )
    };
}

fn log_completion(c: &Completion) {
    match c.status {
        500.. => completion_event!(Level::ERROR, c),
        400..=499 => completion_event!(Level::WARN, c),
        _ => completion_event!(Level::INFO, c),
    }
}

impl<S, B> Service<ServiceRequest> for StructuredLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let method = req.method().to_string();
        let path = req.path().to_owned();
        let player = player_of(&req);
        let trace_id = trace_id_of(&req);

        let fut = self.service.call(req);
        Box::pin(async move {
            let result = fut.await;
            let status = match &result {
                Ok(res) => res.status(),
                Err(err) => err.as_response_error().status_code(),
            };
            log_completion(&Completion {
                method,
                path,
                player,
                trace_id,
                status: status.as_u16(),
                duration_us: u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX),
            });
            result
        })
    }
}
