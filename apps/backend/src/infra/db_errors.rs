//! SeaORM -> DomainError translation.
//!
//! Adapters return `sea_orm::DbErr`; repos call [`map_db_err`] so that
//! services and handlers only ever see `DomainError`.

use tracing::{error, warn};

use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind, NotFoundKind};
use crate::logging::pii::Redacted;
use crate::trace_ctx;

/// Prefix of the structured optimistic-lock payload raised by adapters.
pub const OPTIMISTIC_LOCK_PREFIX: &str = "OPTIMISTIC_LOCK:";
/// Prefix raised when a stored JSON column fails to decode.
pub const CORRUPT_PREFIX: &str = "CORRUPT:";

fn mentions_sqlstate(msg: &str, code: &str) -> bool {
    msg.contains(code) || msg.contains(&format!("SQLSTATE({code})"))
}

fn is_unique_violation(msg: &str) -> bool {
    mentions_sqlstate(msg, "23505")
        || msg.contains("duplicate key value violates unique constraint")
        || msg.contains("UNIQUE constraint failed")
}

/// Room codes are the only unique column a client can collide on.
fn is_room_code_violation(msg: &str) -> bool {
    msg.contains("custom_rooms.code") || msg.contains("custom_rooms_code_key")
}

fn optimistic_lock(msg: &str) -> DomainError {
    #[derive(serde::Deserialize)]
    struct LockInfo {
        expected: i32,
        actual: i32,
    }

    let trace_id = trace_ctx::trace_id();
    match msg
        .strip_prefix(OPTIMISTIC_LOCK_PREFIX)
        .and_then(|json| serde_json::from_str::<LockInfo>(json).ok())
    {
        Some(info) => {
            warn!(
                trace_id = %trace_id,
                expected = info.expected,
                actual = info.actual,
                "optimistic lock conflict"
            );
            DomainError::conflict(
                ConflictKind::OptimisticLock,
                format!(
                    "Session was modified concurrently (expected version {}, actual version {}); retry",
                    info.expected, info.actual
                ),
            )
        }
        None => {
            warn!(trace_id = %trace_id, "optimistic lock conflict without version info");
            DomainError::conflict(
                ConflictKind::OptimisticLock,
                "Session was modified concurrently; retry",
            )
        }
    }
}

/// Translate a `DbErr` into a `DomainError` with sanitized detail.
pub fn map_db_err(e: sea_orm::DbErr) -> DomainError {
    let msg = e.to_string();
    let trace_id = trace_ctx::trace_id();

    match &e {
        sea_orm::DbErr::RecordNotFound(what) => {
            return DomainError::not_found(NotFoundKind::Other(what.clone()), "Record not found");
        }
        sea_orm::DbErr::Custom(m) if m.starts_with(OPTIMISTIC_LOCK_PREFIX) => {
            return optimistic_lock(m);
        }
        sea_orm::DbErr::Custom(m) if m.starts_with(CORRUPT_PREFIX) => {
            error!(trace_id = %trace_id, raw_error = %Redacted(m), "stored data failed to decode");
            return DomainError::infra(InfraErrorKind::DataCorruption, "Stored data is corrupt");
        }
        sea_orm::DbErr::ConnectionAcquire(_) | sea_orm::DbErr::Conn(_) => {
            warn!(trace_id = %trace_id, raw_error = %Redacted(&msg), "database unavailable");
            return DomainError::infra(InfraErrorKind::DbUnavailable, "Database unavailable");
        }
        _ => {}
    }

    if is_unique_violation(&msg) {
        warn!(trace_id = %trace_id, raw_error = %Redacted(&msg), "unique constraint violation");
        if is_room_code_violation(&msg) {
            return DomainError::conflict(ConflictKind::RoomCodeConflict, "Room code already exists");
        }
        return DomainError::conflict(
            ConflictKind::Other("Unique".into()),
            "Unique constraint violation",
        );
    }

    if mentions_sqlstate(&msg, "23503") || msg.contains("FOREIGN KEY constraint failed") {
        warn!(trace_id = %trace_id, raw_error = %Redacted(&msg), "foreign key violation");
        return DomainError::validation_other("Foreign key constraint violation");
    }

    if msg.contains("timeout") || msg.contains("timed out") {
        warn!(trace_id = %trace_id, raw_error = %Redacted(&msg), "database timeout");
        return DomainError::infra(InfraErrorKind::Timeout, "Database timeout");
    }

    error!(trace_id = %trace_id, raw_error = %Redacted(&msg), "unhandled database error");
    DomainError::infra(
        InfraErrorKind::Other("DbErr".into()),
        "Database operation failed",
    )
}

#[cfg(test)]
mod tests {
    use sea_orm::DbErr;

    use super::*;

    #[test]
    fn optimistic_lock_payload_is_parsed() {
        let err = map_db_err(DbErr::Custom(format!(
            "{OPTIMISTIC_LOCK_PREFIX}{{\"expected\":3,\"actual\":4}}"
        )));
        match err {
            DomainError::Conflict(ConflictKind::OptimisticLock, detail) => {
                assert!(detail.contains("expected version 3"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn sqlite_room_code_violation() {
        let err = map_db_err(DbErr::Custom(
            "error returned from database: UNIQUE constraint failed: custom_rooms.code".into(),
        ));
        assert!(matches!(
            err,
            DomainError::Conflict(ConflictKind::RoomCodeConflict, _)
        ));
    }

    #[test]
    fn postgres_room_code_violation() {
        let err = map_db_err(DbErr::Custom(
            "duplicate key value violates unique constraint \"custom_rooms_code_key\"".into(),
        ));
        assert!(matches!(
            err,
            DomainError::Conflict(ConflictKind::RoomCodeConflict, _)
        ));
    }

    #[test]
    fn corrupt_payload_maps_to_data_corruption() {
        let err = map_db_err(DbErr::Custom(format!("{CORRUPT_PREFIX}cards")));
        assert!(matches!(
            err,
            DomainError::Infra(InfraErrorKind::DataCorruption, _)
        ));
    }

    #[test]
    fn record_not_found() {
        let err = map_db_err(DbErr::RecordNotFound("session".into()));
        assert!(matches!(err, DomainError::NotFound(NotFoundKind::Other(_), _)));
    }
}
