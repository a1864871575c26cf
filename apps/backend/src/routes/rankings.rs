use actix_web::{web, HttpResponse};

use crate::db::require_db;
use crate::db::txn::with_txn;
use crate::domain::ranking::{RankingType, ScoreSubmission};
use crate::domain::time_util::now_millis;
use crate::error::AppError;
use crate::extractors::{CurrentPlayer, MaybePlayer, ValidatedJson};
use crate::services::RankingService;
use crate::state::app_state::AppState;

/// POST /api/rankings
async fn submit(
    player: CurrentPlayer,
    body: ValidatedJson<ScoreSubmission>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let db = require_db(&app_state)?;
    let service = RankingService::new(app_state.retention.ranking.clone());
    let submission = body.into_inner();
    let outcome = with_txn(db, move |txn| {
        Box::pin(async move {
            service
                .submit_score(txn, &player.uid, &player.display_name, submission, now_millis())
                .await
        })
    })
    .await?;
    Ok(HttpResponse::Created().json(outcome))
}

/// GET /api/rankings/{type}
///
/// Anonymous callers get the top list only; an identified caller also gets
/// their rank and neighbourhood.
async fn view(
    path: web::Path<String>,
    player: MaybePlayer,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let kind: RankingType = path.into_inner().parse()?;
    let db = require_db(&app_state)?;
    let uid = player.0.map(|p| p.uid);
    let view = RankingService::new(app_state.retention.ranking.clone())
        .ranking_view(db, kind, uid.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(view))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::post().to(submit))
        .route("/{type}", web::get().to(view));
}
