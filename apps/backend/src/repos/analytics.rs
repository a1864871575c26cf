//! Analytics archive repository functions.

use sea_orm::ConnectionTrait;

use crate::adapters::analytics_sea;
use crate::domain::retention::SessionAnalytics;
use crate::domain::time_util::from_millis;
use crate::entities::game_analytics;
use crate::errors::domain::DomainError;

impl From<game_analytics::Model> for SessionAnalytics {
    fn from(m: game_analytics::Model) -> Self {
        Self {
            session_id: m.session_id,
            player_count: u32::try_from(m.player_count).unwrap_or(0),
            max_players: u8::try_from(m.max_players).unwrap_or(u8::MAX),
            game_completed: m.game_completed,
            duration_seconds: m.duration_seconds,
            created_at: from_millis(m.created_at),
            archived_at: from_millis(m.archived_at),
        }
    }
}

pub async fn archive<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    analytics: &SessionAnalytics,
) -> Result<(), DomainError> {
    analytics_sea::upsert(conn, analytics).await?;
    Ok(())
}

pub async fn find_archived<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<Option<SessionAnalytics>, DomainError> {
    Ok(analytics_sea::find_by_session(conn, session_id)
        .await?
        .map(SessionAnalytics::from))
}
