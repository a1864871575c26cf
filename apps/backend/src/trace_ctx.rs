//! Task-local trace context.
//!
//! `RequestTrace` opens a scope per request; error responses and log lines
//! read the id back from here. Outside a request (scheduler, CLI jobs) the
//! id is `"unknown"` unless a job opens its own scope.

use std::cell::RefCell;

use tokio::task_local;

task_local! {
    static TRACE_ID: RefCell<Option<String>>;
}

const UNKNOWN: &str = "unknown";

/// Trace id for the current task, or `"unknown"`.
pub fn trace_id() -> String {
    TRACE_ID
        .try_with(|cell| cell.borrow().clone())
        .ok()
        .flatten()
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Run `future` with `trace_id` installed as the task-local id.
pub async fn with_trace_id<F, R>(trace_id: String, future: F) -> R
where
    F: std::future::Future<Output = R>,
{
    TRACE_ID.scope(RefCell::new(Some(trace_id)), future).await
}
