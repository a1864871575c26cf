pub mod txn;

use sea_orm::DatabaseConnection;

use crate::error::AppError;
use crate::state::app_state::AppState;

/// Borrow the connection from `AppState`, or fail with `DB_UNAVAILABLE`.
pub fn require_db(state: &AppState) -> Result<&DatabaseConnection, AppError> {
    state.db().ok_or_else(|| AppError::DbUnavailable {
        detail: "Database not configured".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use actix_web::ResponseError;

    use super::*;
    use crate::config::game::GameConfig;
    use crate::config::retention::RetentionConfig;

    #[test]
    fn require_db_without_db_is_unavailable() {
        let state = AppState::without_db(GameConfig::default(), RetentionConfig::default());
        let err = require_db(&state).unwrap_err();
        assert!(matches!(err, AppError::DbUnavailable { .. }));
        assert_eq!(
            err.error_response().status(),
            actix_web::http::StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
