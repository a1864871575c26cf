//! Session routes: starting, matchmaking, swiping and leaving.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::db::require_db;
use crate::db::txn::with_txn;
use crate::domain::direction::Direction;
use crate::domain::scoring::SwipeOutcome;
use crate::domain::time_util::now_millis;
use crate::error::AppError;
use crate::extractors::{CurrentPlayer, SessionId, ValidatedJson};
use crate::services::SessionService;
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
struct SwipeRequest {
    direction: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SwipeResponse {
    #[serde(flatten)]
    outcome: SwipeOutcome,
    lock_version: i32,
}

/// POST /api/sessions/single
async fn start_single(
    player: CurrentPlayer,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let service = SessionService::new(app_state.game);
    let session = with_txn(db, move |txn| {
        Box::pin(async move {
            service
                .start_single(txn, &player.uid, &player.display_name, now_millis())
                .await
        })
    })
    .await?;
    Ok(HttpResponse::Created().json(session))
}

/// POST /api/sessions/multi
async fn create_multi(
    player: CurrentPlayer,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let service = SessionService::new(app_state.game);
    let session = with_txn(db, move |txn| {
        Box::pin(async move {
            service
                .create_multi(txn, &player.uid, &player.display_name, now_millis())
                .await
        })
    })
    .await?;
    Ok(HttpResponse::Created().json(session))
}

/// POST /api/sessions/join
///
/// Joins the oldest open multiplayer session, creating one when none fits.
async fn join_multi(
    player: CurrentPlayer,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let service = SessionService::new(app_state.game);
    let session = with_txn(db, move |txn| {
        Box::pin(async move {
            service
                .join_multi(txn, &player.uid, &player.display_name, now_millis())
                .await
        })
    })
    .await?;
    Ok(HttpResponse::Ok().json(session))
}

/// GET /api/sessions/{id}
async fn get_session(
    session_id: SessionId,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let session = SessionService::new(app_state.game)
        .get(db, &session_id.0)
        .await?;
    Ok(HttpResponse::Ok().json(session))
}

/// POST /api/sessions/{id}/swipe
async fn swipe(
    player: CurrentPlayer,
    session_id: SessionId,
    body: ValidatedJson<SwipeRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let direction: Direction = body.direction.parse()?;
    let db = require_db(&app_state)?;
    let service = SessionService::new(app_state.game);
    let result = with_txn(db, move |txn| {
        Box::pin(async move {
            service
                .swipe(txn, &session_id.0, &player.uid, direction, now_millis())
                .await
        })
    })
    .await?;
    Ok(HttpResponse::Ok().json(SwipeResponse {
        outcome: result.outcome,
        lock_version: result.lock_version,
    }))
}

/// POST /api/sessions/{id}/leave
async fn leave(
    player: CurrentPlayer,
    session_id: SessionId,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let service = SessionService::new(app_state.game);
    let session = with_txn(db, move |txn| {
        Box::pin(async move {
            service
                .leave(txn, &session_id.0, &player.uid, now_millis())
                .await
        })
    })
    .await?;
    Ok(HttpResponse::Ok().json(session))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/single", web::post().to(start_single))
        .route("/multi", web::post().to(create_multi))
        .route("/join", web::post().to(join_multi))
        .route("/{id}", web::get().to(get_session))
        .route("/{id}/swipe", web::post().to(swipe))
        .route("/{id}/leave", web::post().to(leave));
}
