// Domain-to-HTTP error mapping, without HTTP or database
use crate::errors::domain::{
    ConflictKind, DomainError, InfraErrorKind, NotFoundKind, ValidationKind,
};
use crate::{AppError, ErrorCode};

fn mapped(de: DomainError) -> (ErrorCode, u16) {
    let app: AppError = de.into();
    (app.code(), app.status().as_u16())
}

#[test]
fn rule_violations_are_422() {
    let cases = [
        (ValidationKind::InvalidDirection, ErrorCode::InvalidDirection),
        (ValidationKind::SessionInactive, ErrorCode::SessionInactive),
        (ValidationKind::PlayerAlreadyComplete, ErrorCode::PlayerAlreadyComplete),
        (ValidationKind::RoomNotJoinable, ErrorCode::RoomNotJoinable),
        (ValidationKind::Other("x".into()), ErrorCode::ValidationError),
    ];
    for (kind, code) in cases {
        assert_eq!(mapped(DomainError::validation(kind, "bad")), (code, 422));
    }
}

#[test]
fn non_host_is_forbidden() {
    assert_eq!(
        mapped(DomainError::validation(ValidationKind::NotRoomHost, "host only")),
        (ErrorCode::NotRoomHost, 403)
    );
}

#[test]
fn conflicts_are_409() {
    assert_eq!(
        mapped(DomainError::conflict(ConflictKind::RoomFull, "full")),
        (ErrorCode::RoomFull, 409)
    );
    assert_eq!(
        mapped(DomainError::conflict(ConflictKind::OptimisticLock, "stale")),
        (ErrorCode::OptimisticLock, 409)
    );
    assert_eq!(
        mapped(DomainError::conflict(ConflictKind::Other("x".into()), "x")),
        (ErrorCode::Conflict, 409)
    );
}

#[test]
fn not_found_kinds() {
    assert_eq!(
        mapped(DomainError::not_found(NotFoundKind::Session, "gone")),
        (ErrorCode::SessionNotFound, 404)
    );
    assert_eq!(
        mapped(DomainError::not_found(NotFoundKind::Room, "gone")),
        (ErrorCode::RoomNotFound, 404)
    );
}

#[test]
fn infra_kinds() {
    assert_eq!(
        mapped(DomainError::infra(InfraErrorKind::Timeout, "slow")),
        (ErrorCode::DbTimeout, 504)
    );
    assert_eq!(
        mapped(DomainError::infra(InfraErrorKind::DbUnavailable, "down")),
        (ErrorCode::DbUnavailable, 503)
    );
    assert_eq!(
        mapped(DomainError::infra(InfraErrorKind::DataCorruption, "bad json")),
        (ErrorCode::DataCorruption, 500)
    );
}
