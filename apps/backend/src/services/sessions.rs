//! Session lifecycle: starting games, matchmaking, swipes and leaving.

use rand::Rng;
use sea_orm::{ConnectionTrait, DatabaseTransaction};
use time::OffsetDateTime;
use tracing::{debug, info, warn};
use ulid::Ulid;

use crate::config::game::GameConfig;
use crate::domain::deck::layout_for_seed;
use crate::domain::direction::Direction;
use crate::domain::matchmaking::{pick_entry, MatchStatus, MatchmakingEntry};
use crate::domain::scoring::SwipeOutcome;
use crate::domain::session::{apply_swipe, GameSession, SessionMode, SessionPlayer};
use crate::error::AppError;
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};
use crate::logging::pii::player_tag;
use crate::repos::{rooms, sessions};

/// Swipe result together with the session version it produced.
#[derive(Debug, Clone)]
pub struct SwipeResult {
    pub outcome: SwipeOutcome,
    pub lock_version: i32,
}

/// Session service; every mutation runs on the caller's transaction.
#[derive(Debug, Clone, Copy)]
pub struct SessionService {
    game: GameConfig,
}

impl SessionService {
    pub fn new(game: GameConfig) -> Self {
        Self { game }
    }

    /// Insert a fresh session with `uid` as its only player.
    pub(crate) async fn insert_session(
        &self,
        txn: &DatabaseTransaction,
        mode: SessionMode,
        max_players: u8,
        uid: &str,
        display_name: &str,
        now: OffsetDateTime,
    ) -> Result<GameSession, AppError> {
        let rng_seed: i64 = rand::rng().random();
        let (direction_map, cars) = layout_for_seed(rng_seed, self.game.deck_size);
        let dto = sessions::SessionCreate {
            id: Ulid::new().to_string(),
            mode,
            direction_map_json: serde_json::to_string(&direction_map)
                .map_err(|e| AppError::internal(format!("encode direction map: {e}")))?,
            cards_json: serde_json::to_string(&cars)
                .map_err(|e| AppError::internal(format!("encode deck: {e}")))?,
            rng_seed,
            max_players,
            started_at: now,
        };
        let first = SessionPlayer::new(uid, display_name, now);
        let session = sessions::create_session(txn, dto, &first).await?;
        info!(
            session_id = %session.id,
            mode = %mode,
            player = %player_tag(uid),
            cards = session.cars.len(),
            "session created"
        );
        Ok(session)
    }

    /// Add `uid` to `session` and bump its version. Members are returned unchanged.
    pub(crate) async fn add_player(
        &self,
        txn: &DatabaseTransaction,
        session: GameSession,
        uid: &str,
        display_name: &str,
        now: OffsetDateTime,
    ) -> Result<GameSession, AppError> {
        if session.has_player(uid) {
            return Ok(session);
        }
        if !session.is_active {
            return Err(DomainError::validation(
                ValidationKind::SessionInactive,
                format!("Session {} is no longer active", session.id),
            )
            .into());
        }
        if session.is_full() {
            return Err(DomainError::conflict(
                ConflictKind::RoomFull,
                format!("Session {} is full", session.id),
            )
            .into());
        }

        let player = SessionPlayer::new(uid, display_name, now);
        sessions::add_player(txn, &session.id, &player).await?;
        sessions::update_session(
            txn,
            sessions::SessionUpdate::touch(&session.id, session.lock_version, now),
        )
        .await?;
        debug!(session_id = %session.id, player = %player_tag(uid), "player joined");
        Ok(sessions::require_session(txn, &session.id).await?)
    }

    pub async fn start_single(
        &self,
        txn: &DatabaseTransaction,
        uid: &str,
        display_name: &str,
        now: OffsetDateTime,
    ) -> Result<GameSession, AppError> {
        self.insert_session(txn, SessionMode::Single, 1, uid, display_name, now)
            .await
    }

    /// New multiplayer session advertised in the matchmaking queue.
    pub async fn create_multi(
        &self,
        txn: &DatabaseTransaction,
        uid: &str,
        display_name: &str,
        now: OffsetDateTime,
    ) -> Result<GameSession, AppError> {
        let max_players = self.game.max_players;
        let session = self
            .insert_session(txn, SessionMode::Multi, max_players, uid, display_name, now)
            .await?;
        let entry = MatchmakingEntry {
            session_id: session.id.clone(),
            creator_id: uid.to_owned(),
            player_count: 1,
            max_players,
            status: MatchStatus::Waiting,
            created_at: now,
        };
        rooms::create_entry(txn, &entry).await?;
        Ok(session)
    }

    /// Join the oldest waiting session, or create one when none fits.
    ///
    /// A player already seated in a running session gets that session back.
    /// Entries whose session has ended are dropped from the queue on the way.
    pub async fn join_multi(
        &self,
        txn: &DatabaseTransaction,
        uid: &str,
        display_name: &str,
        now: OffsetDateTime,
    ) -> Result<GameSession, AppError> {
        let mut open = rooms::open_entries(txn, uid).await?;
        let ids: Vec<String> = open.iter().map(|e| e.session_id.clone()).collect();
        for seated_id in sessions::sessions_with_player(txn, uid, &ids).await? {
            let seated = sessions::require_session(txn, &seated_id).await?;
            if seated.is_active {
                return Ok(seated);
            }
        }

        loop {
            let Some(entry) = pick_entry(&open, uid).cloned() else {
                debug!(player = %player_tag(uid), "no open session, creating one");
                return self.create_multi(txn, uid, display_name, now).await;
            };

            let session = sessions::require_session(txn, &entry.session_id).await?;
            if !session.is_active {
                warn!(session_id = %session.id, "queue entry points at an ended session, dropping it");
                rooms::delete_entry(txn, &entry.session_id).await?;
                open.retain(|e| e.session_id != entry.session_id);
                continue;
            }

            let session = self.add_player(txn, session, uid, display_name, now).await?;
            let next = entry.with_joined_player();
            rooms::advance_entry(txn, &entry, &next).await?;
            if next.status == MatchStatus::Starting {
                info!(session_id = %session.id, players = next.player_count, "session full, starting");
            }
            return Ok(session);
        }
    }

    pub async fn swipe(
        &self,
        txn: &DatabaseTransaction,
        session_id: &str,
        uid: &str,
        direction: Direction,
        now: OffsetDateTime,
    ) -> Result<SwipeResult, AppError> {
        let session = sessions::require_session(txn, session_id).await?;
        let (player, outcome) = apply_swipe(&session, uid, direction, now)?;

        sessions::save_player_progress(txn, session_id, &player).await?;
        let lock_version = sessions::update_session(
            txn,
            sessions::SessionUpdate::touch(session_id, session.lock_version, now),
        )
        .await?;

        if outcome.completed {
            info!(
                session_id,
                player = %player_tag(uid),
                score = outcome.score,
                total = session.cars.len(),
                "player finished deck"
            );
        }
        Ok(SwipeResult {
            outcome,
            lock_version,
        })
    }

    /// Mark `uid` complete; the session ends once every player is complete.
    pub async fn leave(
        &self,
        txn: &DatabaseTransaction,
        session_id: &str,
        uid: &str,
        now: OffsetDateTime,
    ) -> Result<GameSession, AppError> {
        let mut session = sessions::require_session(txn, session_id).await?;
        let Some(idx) = session.players.iter().position(|p| p.uid == uid) else {
            return Err(DomainError::validation(
                ValidationKind::NotInSession,
                format!("Player is not part of session {session_id}"),
            )
            .into());
        };
        if !session.is_active {
            return Ok(session);
        }

        if !session.players[idx].is_complete {
            let player = &mut session.players[idx];
            player.is_complete = true;
            player.finished_at = Some(now);
            sessions::save_player_progress(txn, session_id, &session.players[idx]).await?;
        }

        let mut update = sessions::SessionUpdate::touch(session_id, session.lock_version, now);
        let ending = session.all_complete();
        if ending {
            update = update.ended(now);
        }
        sessions::update_session(txn, update).await?;
        if ending {
            // An ended session must not stay in the matchmaking queue
            rooms::delete_entry(txn, session_id).await?;
            info!(session_id, "all players complete, session ended");
        }
        Ok(sessions::require_session(txn, session_id).await?)
    }

    pub async fn get<C: ConnectionTrait + Send + Sync>(
        &self,
        conn: &C,
        session_id: &str,
    ) -> Result<GameSession, AppError> {
        Ok(sessions::require_session(conn, session_id).await?)
    }
}
