//! Domain-level error type used across services and adapters.
//!
//! This error type is HTTP- and DB-agnostic. Handlers return
//! `Result<T, crate::error::AppError>` and convert from `DomainError`
//! through `From<DomainError> for AppError`.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Business-rule and input violations
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationKind {
    InvalidSessionId,
    InvalidPlayerId,
    InvalidDirection,
    InvalidRankingType,
    InvalidScore,
    InvalidMaxPlayers,
    SessionInactive,
    PlayerAlreadyComplete,
    NotInSession,
    NotRoomHost,
    RoomNotJoinable,
    Other(String),
}

/// Infra error kinds to distinguish operational failures
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InfraErrorKind {
    Timeout,
    DbUnavailable,
    DataCorruption,
    Other(String),
}

/// Domain-level not found entities
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    Session,
    Room,
    Player,
    Other(String),
}

/// Domain-level conflict kinds
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConflictKind {
    RoomFull,
    RoomCodeConflict,
    OptimisticLock,
    Other(String),
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Input/user validation or business rule violation
    Validation(ValidationKind, String),
    /// Semantic conflict
    Conflict(ConflictKind, String),
    /// Missing resource in domain terms
    NotFound(NotFoundKind, String),
    /// Infrastructure/operational failures
    Infra(InfraErrorKind, String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::Validation(kind, d) => write!(f, "validation error {kind:?}: {d}"),
            DomainError::Conflict(kind, d) => write!(f, "conflict {kind:?}: {d}"),
            DomainError::NotFound(kind, d) => write!(f, "not found {kind:?}: {d}"),
            DomainError::Infra(kind, d) => write!(f, "infra {kind:?}: {d}"),
        }
    }
}

impl Error for DomainError {}

impl DomainError {
    pub fn validation(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self::Validation(kind, detail.into())
    }
    pub fn validation_other(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self::Validation(ValidationKind::Other(detail.clone()), detail)
    }
    pub fn conflict(kind: ConflictKind, detail: impl Into<String>) -> Self {
        Self::Conflict(kind, detail.into())
    }
    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }
    pub fn infra(kind: InfraErrorKind, detail: impl Into<String>) -> Self {
        Self::Infra(kind, detail.into())
    }
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        crate::infra::db_errors::map_db_err(e)
    }
}
