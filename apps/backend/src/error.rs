use actix_web::error::ResponseError;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;
use thiserror::Error;

use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind, NotFoundKind, ValidationKind};
use crate::errors::ErrorCode;
use crate::trace_ctx;

/// RFC 7807 body returned for every error response.
#[derive(Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub code: String,
    pub trace_id: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {detail}")]
    Validation {
        code: ErrorCode,
        detail: String,
        status: StatusCode,
    },
    #[error("Database error: {detail}")]
    Db { detail: String },
    #[error("Not found: {detail}")]
    NotFound { code: ErrorCode, detail: String },
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden: {detail}")]
    Forbidden { code: ErrorCode, detail: String },
    #[error("Bad request: {detail}")]
    BadRequest { code: ErrorCode, detail: String },
    #[error("Internal error: {detail}")]
    Internal { detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
    #[error("Conflict: {detail}")]
    Conflict { code: ErrorCode, detail: String },
    #[error("Database unavailable: {detail}")]
    DbUnavailable { detail: String },
    #[error("Timeout: {detail}")]
    Timeout { detail: String },
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { code, .. } => *code,
            AppError::Db { .. } => ErrorCode::DbError,
            AppError::NotFound { code, .. } => *code,
            AppError::Unauthorized => ErrorCode::Unauthorized,
            AppError::Forbidden { code, .. } => *code,
            AppError::BadRequest { code, .. } => *code,
            AppError::Internal { .. } => ErrorCode::Internal,
            AppError::Config { .. } => ErrorCode::ConfigError,
            AppError::Conflict { code, .. } => *code,
            AppError::DbUnavailable { .. } => ErrorCode::DbUnavailable,
            AppError::Timeout { .. } => ErrorCode::DbTimeout,
        }
    }

    fn detail(&self) -> String {
        match self {
            AppError::Validation { detail, .. }
            | AppError::Db { detail }
            | AppError::NotFound { detail, .. }
            | AppError::Forbidden { detail, .. }
            | AppError::BadRequest { detail, .. }
            | AppError::Internal { detail }
            | AppError::Config { detail }
            | AppError::Conflict { detail, .. }
            | AppError::DbUnavailable { detail }
            | AppError::Timeout { detail } => detail.clone(),
            AppError::Unauthorized => "Player identity required".to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { status, .. } => *status,
            AppError::Db { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::DbUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    pub fn invalid(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Validation {
            code,
            detail: detail.into(),
            status: StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }

    pub fn bad_request(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            detail: detail.into(),
        }
    }

    pub fn not_found(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            detail: detail.into(),
        }
    }

    pub fn unauthorized() -> Self {
        Self::Unauthorized
    }

    pub fn forbidden(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Forbidden {
            code,
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    pub fn conflict(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            detail: detail.into(),
        }
    }

    fn humanize_code(code: &str) -> String {
        code.split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => first
                        .to_uppercase()
                        .chain(chars.flat_map(char::to_lowercase))
                        .collect(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(kind, detail) => {
                let code = match kind {
                    ValidationKind::InvalidSessionId => ErrorCode::InvalidSessionId,
                    ValidationKind::InvalidPlayerId => ErrorCode::InvalidPlayerId,
                    ValidationKind::InvalidDirection => ErrorCode::InvalidDirection,
                    ValidationKind::InvalidRankingType => ErrorCode::InvalidRankingType,
                    ValidationKind::InvalidScore => ErrorCode::InvalidScore,
                    ValidationKind::InvalidMaxPlayers => ErrorCode::InvalidMaxPlayers,
                    ValidationKind::SessionInactive => ErrorCode::SessionInactive,
                    ValidationKind::PlayerAlreadyComplete => ErrorCode::PlayerAlreadyComplete,
                    ValidationKind::NotInSession => ErrorCode::NotInSession,
                    ValidationKind::RoomNotJoinable => ErrorCode::RoomNotJoinable,
                    ValidationKind::NotRoomHost => {
                        return AppError::forbidden(ErrorCode::NotRoomHost, detail)
                    }
                    ValidationKind::Other(_) => ErrorCode::ValidationError,
                };
                AppError::invalid(code, detail)
            }
            DomainError::Conflict(kind, detail) => {
                let code = match kind {
                    ConflictKind::RoomFull => ErrorCode::RoomFull,
                    ConflictKind::RoomCodeConflict => ErrorCode::RoomCodeConflict,
                    ConflictKind::OptimisticLock => ErrorCode::OptimisticLock,
                    ConflictKind::Other(_) => ErrorCode::Conflict,
                };
                AppError::conflict(code, detail)
            }
            DomainError::NotFound(kind, detail) => {
                let code = match kind {
                    NotFoundKind::Session => ErrorCode::SessionNotFound,
                    NotFoundKind::Room => ErrorCode::RoomNotFound,
                    NotFoundKind::Player => ErrorCode::PlayerNotFound,
                    NotFoundKind::Other(_) => ErrorCode::NotFound,
                };
                AppError::not_found(code, detail)
            }
            DomainError::Infra(kind, detail) => match kind {
                InfraErrorKind::Timeout => AppError::Timeout { detail },
                InfraErrorKind::DbUnavailable => AppError::DbUnavailable { detail },
                InfraErrorKind::DataCorruption => AppError::Validation {
                    code: ErrorCode::DataCorruption,
                    detail,
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                },
                InfraErrorKind::Other(_) => AppError::internal(detail),
            },
        }
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(e: sea_orm::DbErr) -> Self {
        crate::infra::db_errors::map_db_err(e).into()
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        let code = self.code().as_str();
        let trace_id = trace_ctx::trace_id();

        let problem_details = ProblemDetails {
            type_: format!("https://sorter-master.app/errors/{code}"),
            title: Self::humanize_code(code),
            status: status.as_u16(),
            detail: self.detail(),
            code: code.to_string(),
            trace_id: trace_id.clone(),
        };

        HttpResponse::build(status)
            .content_type("application/problem+json")
            .insert_header(("x-trace-id", trace_id))
            .json(problem_details)
    }
}
