use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::db::require_db;
use crate::db::txn::with_txn;
use crate::domain::time_util::now_millis;
use crate::error::AppError;
use crate::extractors::{CurrentPlayer, SessionId, ValidatedJson};
use crate::services::{RoomService, SessionService};
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateRoomRequest {
    #[serde(alias = "max_players")]
    max_players: u8,
}

#[derive(Debug, Deserialize)]
struct JoinRoomRequest {
    code: String,
}

fn room_service(app_state: &AppState) -> RoomService {
    RoomService::new(SessionService::new(app_state.game))
}

/// POST /api/rooms
async fn create_room(
    player: CurrentPlayer,
    body: ValidatedJson<CreateRoomRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let service = room_service(&app_state);
    let max_players = body.max_players;
    let view = with_txn(db, move |txn| {
        Box::pin(async move {
            service
                .create_room(txn, &player.uid, &player.display_name, max_players, now_millis())
                .await
        })
    })
    .await?;
    Ok(HttpResponse::Created().json(view))
}

/// POST /api/rooms/join
async fn join_room(
    player: CurrentPlayer,
    body: ValidatedJson<JoinRoomRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let service = room_service(&app_state);
    let code = body.into_inner().code;
    let view = with_txn(db, move |txn| {
        Box::pin(async move {
            service
                .join_room(txn, &player.uid, &player.display_name, &code, now_millis())
                .await
        })
    })
    .await?;
    Ok(HttpResponse::Ok().json(view))
}

/// POST /api/rooms/{id}/start
async fn start_room(
    player: CurrentPlayer,
    room_id: SessionId,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let service = room_service(&app_state);
    let view = with_txn(db, move |txn| {
        Box::pin(async move { service.start_room(txn, &player.uid, &room_id.0).await })
    })
    .await?;
    Ok(HttpResponse::Ok().json(view))
}

/// POST /api/rooms/{id}/close
async fn close_room(
    player: CurrentPlayer,
    room_id: SessionId,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let service = room_service(&app_state);
    let view = with_txn(db, move |txn| {
        Box::pin(async move {
            service
                .close_room(txn, &player.uid, &room_id.0, now_millis())
                .await
        })
    })
    .await?;
    Ok(HttpResponse::Ok().json(view))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::post().to(create_room))
        .route("/join", web::post().to(join_room))
        .route("/{id}/start", web::post().to(start_room))
        .route("/{id}/close", web::post().to(close_room));
}
