#![allow(dead_code)]

use sea_orm::DatabaseConnection;
use sorter_backend::config::game::GameConfig;
use sorter_backend::config::retention::{RankingConfig, RetentionConfig};
use sorter_backend::domain::direction::Direction;
use sorter_backend::domain::session::GameSession;
use sorter_backend::{build_state, AppState, DbProfile};

// Logging is auto-installed for every test binary
#[ctor::ctor]
fn init_logging() {
    backend_test_support::logging::init();
}

/// Fresh state over a private, migrated SQLite in-memory database.
pub async fn test_state() -> AppState {
    test_state_with(GameConfig::default(), RetentionConfig::default()).await
}

pub async fn test_state_with(game: GameConfig, retention: RetentionConfig) -> AppState {
    build_state()
        .with_db(DbProfile::InMemory)
        .with_game(game)
        .with_retention(retention)
        .build()
        .await
        .expect("build in-memory state")
}

pub fn db(state: &AppState) -> &DatabaseConnection {
    state.db().expect("state has a database")
}

/// Ranking limits small enough to exercise trimming with a handful of rows.
pub fn small_ranking(cleanup_probability: f64) -> RankingConfig {
    RankingConfig {
        keep_top: 3,
        context_range: 1,
        older_keep_top: 2,
        archive_keep_top: 1,
        cleanup_threshold: 6,
        cleanup_probability,
        cleanup_batch_size: 50,
        fetch_limit: 100,
        ..RankingConfig::default()
    }
}

/// Direction that sorts `uid`'s current card correctly.
pub fn correct_direction(session: &GameSession, uid: &str) -> Direction {
    let idx = session.player(uid).expect("player in session").card_index as usize;
    session
        .direction_map
        .direction_for(session.cars[idx].category)
        .expect("deck only holds mapped categories")
}

pub fn wrong_direction(session: &GameSession, uid: &str) -> Direction {
    let right = correct_direction(session, uid);
    Direction::ALL
        .into_iter()
        .find(|d| *d != right)
        .expect("four directions")
}

/// Build the production app over `state`, minus CORS.
#[macro_export]
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(sorter_backend::StructuredLogger)
                .wrap(sorter_backend::TraceSpan)
                .wrap(sorter_backend::RequestTrace)
                .app_data(actix_web::web::Data::new($state))
                .configure(sorter_backend::routes::configure),
        )
        .await
    };
}
