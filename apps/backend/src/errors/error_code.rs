//! Error codes for the Sorter Master API.
//!
//! Add new codes here; never pass ad-hoc strings as error codes.
//! All codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings that appear
//! in HTTP responses.

use core::fmt;

/// Centralized error codes for the Sorter Master API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Identity
    /// Player identity header missing
    Unauthorized,
    /// Caller is not allowed to perform this action
    Forbidden,
    /// Only the room host may do this
    NotRoomHost,

    // Request Validation
    /// Invalid or missing HTTP header
    InvalidHeader,
    /// Invalid session ID provided
    InvalidSessionId,
    /// Invalid player ID provided
    InvalidPlayerId,
    /// Unknown swipe direction
    InvalidDirection,
    /// Unknown ranking type
    InvalidRankingType,
    /// Score fields are inconsistent
    InvalidScore,
    /// Room size out of range
    InvalidMaxPlayers,
    /// Session no longer accepts swipes
    SessionInactive,
    /// Player already swiped the whole deck
    PlayerAlreadyComplete,
    /// Player does not belong to the session
    NotInSession,
    /// Room is not accepting players
    RoomNotJoinable,
    /// General validation error
    ValidationError,
    /// General bad request error
    BadRequest,

    // Resource Not Found
    /// Session not found
    SessionNotFound,
    /// Custom room not found
    RoomNotFound,
    /// Player not found
    PlayerNotFound,
    /// General not found error
    NotFound,

    // Business Logic Conflicts
    /// Room already has its maximum number of players
    RoomFull,
    /// Room code already exists
    RoomCodeConflict,
    /// Optimistic lock conflict
    OptimisticLock,
    /// Generic conflict
    Conflict,

    // System Errors
    /// Database error
    DbError,
    /// Database unavailable
    DbUnavailable,
    /// Database timeout
    DbTimeout,
    /// Stored data could not be decoded
    DataCorruption,
    /// Internal server error
    Internal,
    /// Configuration error
    ConfigError,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotRoomHost => "NOT_ROOM_HOST",

            Self::InvalidHeader => "INVALID_HEADER",
            Self::InvalidSessionId => "INVALID_SESSION_ID",
            Self::InvalidPlayerId => "INVALID_PLAYER_ID",
            Self::InvalidDirection => "INVALID_DIRECTION",
            Self::InvalidRankingType => "INVALID_RANKING_TYPE",
            Self::InvalidScore => "INVALID_SCORE",
            Self::InvalidMaxPlayers => "INVALID_MAX_PLAYERS",
            Self::SessionInactive => "SESSION_INACTIVE",
            Self::PlayerAlreadyComplete => "PLAYER_ALREADY_COMPLETE",
            Self::NotInSession => "NOT_IN_SESSION",
            Self::RoomNotJoinable => "ROOM_NOT_JOINABLE",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::BadRequest => "BAD_REQUEST",

            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::RoomNotFound => "ROOM_NOT_FOUND",
            Self::PlayerNotFound => "PLAYER_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",

            Self::RoomFull => "ROOM_FULL",
            Self::RoomCodeConflict => "ROOM_CODE_CONFLICT",
            Self::OptimisticLock => "OPTIMISTIC_LOCK",
            Self::Conflict => "CONFLICT",

            Self::DbError => "DB_ERROR",
            Self::DbUnavailable => "DB_UNAVAILABLE",
            Self::DbTimeout => "DB_TIMEOUT",
            Self::DataCorruption => "DATA_CORRUPTION",
            Self::Internal => "INTERNAL",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_strings() {
        assert_eq!(ErrorCode::Unauthorized.as_str(), "UNAUTHORIZED");
        assert_eq!(ErrorCode::InvalidDirection.as_str(), "INVALID_DIRECTION");
        assert_eq!(ErrorCode::SessionNotFound.as_str(), "SESSION_NOT_FOUND");
        assert_eq!(ErrorCode::RoomCodeConflict.as_str(), "ROOM_CODE_CONFLICT");
        assert_eq!(
            ErrorCode::PlayerAlreadyComplete.as_str(),
            "PLAYER_ALREADY_COMPLETE"
        );
        assert_eq!(ErrorCode::DbUnavailable.as_str(), "DB_UNAVAILABLE");
    }

    #[test]
    fn test_display_trait() {
        assert_eq!(format!("{}", ErrorCode::RoomFull), "ROOM_FULL");
        assert_eq!(format!("{}", ErrorCode::OptimisticLock), "OPTIMISTIC_LOCK");
    }
}
