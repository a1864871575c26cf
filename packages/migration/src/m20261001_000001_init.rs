use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::{ColumnDef, ForeignKey, ForeignKeyAction, Index, Table};

#[derive(DeriveMigrationName)]
pub struct Migration;

// ----- Iden enums for tables & columns -----
// Timestamps are epoch milliseconds (BIGINT) so both backends compare them numerically.

#[derive(Iden)]
enum GameSessions {
    Table,
    Id,
    Mode,
    DirectionMap,
    Cards,
    RngSeed,
    MaxPlayers,
    IsActive,
    StartedAt,
    LastActiveAt,
    EndedAt,
    LockVersion,
}

#[derive(Iden)]
enum SessionPlayers {
    Table,
    Id,
    SessionId,
    Uid,
    DisplayName,
    Score,
    Progress,
    CardIndex,
    IsComplete,
    JoinedAt,
    FinishedAt,
}

#[derive(Iden)]
enum CustomRooms {
    Table,
    Id,
    Code,
    HostId,
    MaxPlayers,
    Status,
    CreatedAt,
}

#[derive(Iden)]
enum Matchmaking {
    Table,
    SessionId,
    CreatorId,
    PlayerCount,
    MaxPlayers,
    Status,
    CreatedAt,
}

#[derive(Iden)]
enum GameAnalytics {
    Table,
    SessionId,
    PlayerCount,
    MaxPlayers,
    GameCompleted,
    DurationSeconds,
    CreatedAt,
    ArchivedAt,
}

#[derive(Iden)]
enum Rankings {
    Table,
    Id,
    UserId,
    DisplayName,
    Score,
    CorrectAnswers,
    TotalCards,
    TimeElapsed,
    RankingType,
    CreatedAt,
    RetentionLevel,
    Rank,
}

#[derive(Iden)]
enum RankingStatistics {
    Table,
    Id,
    RankingType,
    Date,
    DeletedEntries,
    DeletedScoreSum,
    Runs,
    LastCleanupAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // game_sessions
        manager
            .create_table(
                Table::create()
                    .table(GameSessions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GameSessions::Id)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GameSessions::Mode).string_len(16).not_null())
                    .col(ColumnDef::new(GameSessions::DirectionMap).text().not_null())
                    .col(ColumnDef::new(GameSessions::Cards).text().not_null())
                    .col(ColumnDef::new(GameSessions::RngSeed).big_integer().not_null())
                    .col(
                        ColumnDef::new(GameSessions::MaxPlayers)
                            .small_integer()
                            .not_null()
                            .default(4),
                    )
                    .col(
                        ColumnDef::new(GameSessions::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(GameSessions::StartedAt).big_integer().not_null())
                    .col(
                        ColumnDef::new(GameSessions::LastActiveAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GameSessions::EndedAt).big_integer().null())
                    .col(
                        ColumnDef::new(GameSessions::LockVersion)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_game_sessions_last_active_at")
                    .table(GameSessions::Table)
                    .col(GameSessions::LastActiveAt)
                    .to_owned(),
            )
            .await?;

        // session_players
        manager
            .create_table(
                Table::create()
                    .table(SessionPlayers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SessionPlayers::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(
                        ColumnDef::new(SessionPlayers::SessionId)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(SessionPlayers::Uid).string_len(128).not_null())
                    .col(ColumnDef::new(SessionPlayers::DisplayName).string().not_null())
                    .col(
                        ColumnDef::new(SessionPlayers::Score)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SessionPlayers::Progress)
                            .small_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SessionPlayers::CardIndex)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(SessionPlayers::IsComplete)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(SessionPlayers::JoinedAt).big_integer().not_null())
                    .col(ColumnDef::new(SessionPlayers::FinishedAt).big_integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_session_players_session_id")
                            .from(SessionPlayers::Table, SessionPlayers::SessionId)
                            .to(GameSessions::Table, GameSessions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_session_players_session_uid_unique")
                    .table(SessionPlayers::Table)
                    .col(SessionPlayers::SessionId)
                    .col(SessionPlayers::Uid)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // custom_rooms (id is the session id of the room's game)
        manager
            .create_table(
                Table::create()
                    .table(CustomRooms::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CustomRooms::Id)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CustomRooms::Code).string_len(16).not_null())
                    .col(ColumnDef::new(CustomRooms::HostId).string_len(128).not_null())
                    .col(
                        ColumnDef::new(CustomRooms::MaxPlayers)
                            .small_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CustomRooms::Status).string_len(16).not_null())
                    .col(ColumnDef::new(CustomRooms::CreatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("custom_rooms_code_key")
                    .table(CustomRooms::Table)
                    .col(CustomRooms::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_custom_rooms_created_at")
                    .table(CustomRooms::Table)
                    .col(CustomRooms::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // matchmaking (keyed by session id)
        manager
            .create_table(
                Table::create()
                    .table(Matchmaking::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Matchmaking::SessionId)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Matchmaking::CreatorId).string_len(128).not_null())
                    .col(
                        ColumnDef::new(Matchmaking::PlayerCount)
                            .small_integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Matchmaking::MaxPlayers)
                            .small_integer()
                            .not_null()
                            .default(4),
                    )
                    .col(ColumnDef::new(Matchmaking::Status).string_len(16).not_null())
                    .col(ColumnDef::new(Matchmaking::CreatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_matchmaking_status_created_at")
                    .table(Matchmaking::Table)
                    .col(Matchmaking::Status)
                    .col(Matchmaking::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // game_analytics (archive of expired sessions)
        manager
            .create_table(
                Table::create()
                    .table(GameAnalytics::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GameAnalytics::SessionId)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(GameAnalytics::PlayerCount)
                            .small_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GameAnalytics::MaxPlayers)
                            .small_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GameAnalytics::GameCompleted)
                            .boolean()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GameAnalytics::DurationSeconds).double().null())
                    .col(ColumnDef::new(GameAnalytics::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(GameAnalytics::ArchivedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // rankings
        manager
            .create_table(
                Table::create()
                    .table(Rankings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Rankings::Id)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Rankings::UserId).string_len(128).not_null())
                    .col(ColumnDef::new(Rankings::DisplayName).string().not_null())
                    .col(ColumnDef::new(Rankings::Score).integer().not_null())
                    .col(ColumnDef::new(Rankings::CorrectAnswers).integer().not_null())
                    .col(ColumnDef::new(Rankings::TotalCards).integer().not_null())
                    .col(ColumnDef::new(Rankings::TimeElapsed).integer().not_null())
                    .col(ColumnDef::new(Rankings::RankingType).string_len(16).not_null())
                    .col(ColumnDef::new(Rankings::CreatedAt).big_integer().not_null())
                    .col(
                        ColumnDef::new(Rankings::RetentionLevel)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Rankings::Rank).integer().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rankings_type_score")
                    .table(Rankings::Table)
                    .col(Rankings::RankingType)
                    .col(Rankings::Score)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rankings_type_created_at")
                    .table(Rankings::Table)
                    .col(Rankings::RankingType)
                    .col(Rankings::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // ranking_statistics (per-day increment documents)
        manager
            .create_table(
                Table::create()
                    .table(RankingStatistics::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RankingStatistics::Id)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RankingStatistics::RankingType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(RankingStatistics::Date).string_len(10).not_null())
                    .col(
                        ColumnDef::new(RankingStatistics::DeletedEntries)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(RankingStatistics::DeletedScoreSum)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(RankingStatistics::Runs)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(RankingStatistics::LastCleanupAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RankingStatistics::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Rankings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GameAnalytics::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Matchmaking::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CustomRooms::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SessionPlayers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GameSessions::Table).to_owned())
            .await?;
        Ok(())
    }
}
