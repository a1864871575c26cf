//! SeaORM adapter for custom rooms.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, Set,
};
use time::OffsetDateTime;

use crate::domain::matchmaking::RoomStatus;
use crate::domain::time_util::to_millis;
use crate::entities::custom_rooms;

pub async fn create_room<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    id: &str,
    code: &str,
    host_id: &str,
    max_players: u8,
    created_at: OffsetDateTime,
) -> Result<custom_rooms::Model, DbErr> {
    custom_rooms::ActiveModel {
        id: Set(id.to_owned()),
        code: Set(code.to_owned()),
        host_id: Set(host_id.to_owned()),
        max_players: Set(i16::from(max_players)),
        status: Set(RoomStatus::Waiting.as_str().to_owned()),
        created_at: Set(to_millis(created_at)),
    }
    .insert(conn)
    .await
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: &str,
) -> Result<Option<custom_rooms::Model>, DbErr> {
    custom_rooms::Entity::find_by_id(room_id.to_owned())
        .one(conn)
        .await
}

pub async fn find_by_code<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    code: &str,
) -> Result<Option<custom_rooms::Model>, DbErr> {
    custom_rooms::Entity::find()
        .filter(custom_rooms::Column::Code.eq(code))
        .one(conn)
        .await
}

pub async fn update_status<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: &str,
    status: RoomStatus,
) -> Result<(), DbErr> {
    let result = custom_rooms::Entity::update_many()
        .col_expr(custom_rooms::Column::Status, Expr::value(status.as_str()))
        .filter(custom_rooms::Column::Id.eq(room_id))
        .exec(conn)
        .await?;
    if result.rows_affected == 0 {
        return Err(DbErr::RecordNotFound(format!("custom_rooms {room_id}")));
    }
    Ok(())
}

/// Rooms created at or before `cutoff_ms`.
pub async fn find_created_before<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    cutoff_ms: i64,
) -> Result<Vec<custom_rooms::Model>, DbErr> {
    custom_rooms::Entity::find()
        .filter(custom_rooms::Column::CreatedAt.lte(cutoff_ms))
        .all(conn)
        .await
}

pub async fn delete_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    room_id: &str,
) -> Result<u64, DbErr> {
    let res = custom_rooms::Entity::delete_by_id(room_id.to_owned())
        .exec(conn)
        .await?;
    Ok(res.rows_affected)
}
