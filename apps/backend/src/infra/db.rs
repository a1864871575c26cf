use std::future::Future;
use std::time::Duration;

use migration::{migrate, MigrationCommand};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::{debug, info, warn};

use crate::config::db::{db_url, DbProfile};
use crate::error::AppError;
use crate::logging::pii::Redacted;

const CONNECT_ATTEMPTS: u32 = 5;
const CONNECT_INTERVAL_MS: u64 = 500;

fn engine(profile: &DbProfile) -> &'static str {
    if profile.is_sqlite() {
        "sqlite"
    } else {
        "postgresql"
    }
}

/// Retry a connection attempt with a fixed delay; returns the last error.
async fn retry_connection<T, F, Fut>(
    mut connect_fn: F,
    max_attempts: u32,
    interval_ms: u64,
) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let mut attempt = 1;
    loop {
        match connect_fn().await {
            Ok(result) => {
                if attempt > 1 {
                    info!(attempts = attempt, interval_ms, "connection_retry=success");
                }
                return Ok(result);
            }
            Err(e) if attempt >= max_attempts => return Err(e),
            Err(_) => {
                warn!(attempt, max_attempts, interval_ms, "connection_retry=failed");
                tokio::time::sleep(Duration::from_millis(interval_ms)).await;
                attempt += 1;
            }
        }
    }
}

fn connect_options(profile: &DbProfile, url: String) -> ConnectOptions {
    let mut opts = ConnectOptions::new(url);
    opts.sqlx_logging(false)
        .acquire_timeout(Duration::from_secs(5));

    match profile {
        // One connection per in-memory database; it must never be recycled
        // or the schema disappears with it.
        DbProfile::InMemory => {
            opts.max_connections(1)
                .min_connections(1)
                .idle_timeout(Duration::from_secs(24 * 3600))
                .max_lifetime(Duration::from_secs(24 * 3600));
        }
        DbProfile::SqliteFile(_) => {
            opts.max_connections(1);
        }
        DbProfile::Prod | DbProfile::Test => {
            opts.max_connections(16).min_connections(1);
        }
    }
    opts
}

/// Connect without running migrations.
///
/// A `.env` in the working directory or one of its parents is loaded first;
/// variables already set in the process win.
pub async fn connect_db(profile: &DbProfile) -> Result<DatabaseConnection, AppError> {
    if let Ok(path) = dotenvy::dotenv() {
        debug!(path = %path.display(), "loaded .env");
    }
    let url = db_url(profile)?;
    retry_connection(
        || {
            let opts = connect_options(profile, url.clone());
            async move {
                Database::connect(opts).await.map_err(|e| {
                    warn!(error = %Redacted(&e.to_string()), "database connect failed");
                    AppError::from(e)
                })
            }
        },
        if matches!(profile, DbProfile::InMemory) {
            1
        } else {
            CONNECT_ATTEMPTS
        },
        CONNECT_INTERVAL_MS,
    )
    .await
}

/// Single entrypoint used by the state builder: connect, then migrate up.
pub async fn bootstrap_db(profile: DbProfile) -> Result<DatabaseConnection, AppError> {
    let conn = connect_db(&profile).await?;
    info!(engine = engine(&profile), "database connected");

    migrate(&conn, MigrationCommand::Up)
        .await
        .map_err(|e| AppError::config(format!("migration failed: {e}")))?;

    Ok(conn)
}
