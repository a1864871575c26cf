//! SeaORM adapter for the `game_analytics` archive.

use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, Set};

use crate::domain::retention::SessionAnalytics;
use crate::domain::time_util::to_millis;
use crate::entities::game_analytics;

/// Insert or overwrite the archive row keyed by session id.
pub async fn upsert<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    analytics: &SessionAnalytics,
) -> Result<(), DbErr> {
    let row = game_analytics::ActiveModel {
        session_id: Set(analytics.session_id.clone()),
        player_count: Set(i16::try_from(analytics.player_count).unwrap_or(i16::MAX)),
        max_players: Set(i16::from(analytics.max_players)),
        game_completed: Set(analytics.game_completed),
        duration_seconds: Set(analytics.duration_seconds),
        created_at: Set(to_millis(analytics.created_at)),
        archived_at: Set(to_millis(analytics.archived_at)),
    };

    game_analytics::Entity::insert(row)
        .on_conflict(
            OnConflict::column(game_analytics::Column::SessionId)
                .update_columns([
                    game_analytics::Column::PlayerCount,
                    game_analytics::Column::MaxPlayers,
                    game_analytics::Column::GameCompleted,
                    game_analytics::Column::DurationSeconds,
                    game_analytics::Column::CreatedAt,
                    game_analytics::Column::ArchivedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

pub async fn find_by_session<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    session_id: &str,
) -> Result<Option<game_analytics::Model>, DbErr> {
    game_analytics::Entity::find_by_id(session_id.to_owned())
        .one(conn)
        .await
}
