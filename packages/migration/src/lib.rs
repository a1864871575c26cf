//! Schema migrations for the Sorter Master store (Postgres and SQLite).

pub use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm;
use sea_orm_migration::sea_orm::Statement;
pub use sea_orm_migration::sea_orm::{ConnectionTrait, DatabaseConnection};

mod m20261001_000001_init;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20261001_000001_init::Migration)]
    }
}

/// Operation requested by the migration CLI or the backend bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationCommand {
    Up,
    Down,
    Fresh,
    Reset,
    Refresh,
    Status,
}

/// Run `command` against `db`, logging applied counts before and after.
pub async fn migrate(db: &DatabaseConnection, command: MigrationCommand) -> Result<(), DbErr> {
    let before = snapshot(db).await?;
    tracing::info!(
        command = ?command,
        backend = %before.backend,
        database = %before.database,
        defined = before.defined,
        applied = before.applied,
        "migration starting"
    );

    let result = match command {
        MigrationCommand::Up => Migrator::up(db, None).await,
        MigrationCommand::Down => Migrator::down(db, None).await,
        MigrationCommand::Fresh => Migrator::fresh(db).await,
        MigrationCommand::Reset => Migrator::reset(db).await,
        MigrationCommand::Refresh => Migrator::refresh(db).await,
        MigrationCommand::Status => Migrator::status(db).await,
    };

    if let Err(e) = result {
        tracing::error!(command = ?command, backend = %before.backend, error = %e, "migration failed");
        return Err(e);
    }

    if command != MigrationCommand::Status {
        let after = snapshot(db).await?;
        tracing::info!(command = ?command, applied = after.applied, "migration finished");
    }
    Ok(())
}

struct Snapshot {
    backend: String,
    database: String,
    applied: usize,
    defined: usize,
}

async fn database_name(db: &DatabaseConnection) -> Result<String, DbErr> {
    let backend = db.get_database_backend();
    let sql = match backend {
        sea_orm::DatabaseBackend::Postgres => "SELECT current_database() AS name",
        sea_orm::DatabaseBackend::Sqlite => {
            "SELECT file AS name FROM pragma_database_list WHERE name = 'main'"
        }
        _ => return Ok("<unsupported>".to_string()),
    };

    let row = db
        .query_one(Statement::from_string(backend, sql.to_string()))
        .await?;
    let name = row
        .and_then(|r| r.try_get::<String>("", "name").ok())
        .unwrap_or_else(|| "<unknown>".to_string());

    // SQLite reports an empty file name for in-memory databases
    Ok(if name.is_empty() {
        ":memory:".to_string()
    } else {
        name
    })
}

async fn snapshot(db: &DatabaseConnection) -> Result<Snapshot, DbErr> {
    Ok(Snapshot {
        backend: format!("{:?}", db.get_database_backend()),
        database: database_name(db).await?,
        applied: count_applied_migrations(db).await.unwrap_or(0),
        defined: Migrator::migrations().len(),
    })
}

/// Number of applied migrations; 0 before the tracking table exists.
pub async fn count_applied_migrations(db: &DatabaseConnection) -> Result<usize, DbErr> {
    match Migrator::get_applied_migrations(db).await {
        Ok(applied) => Ok(applied.len()),
        Err(DbErr::Exec(_)) => Ok(0),
        Err(e) => Err(e),
    }
}

/// Name of the most recently applied migration, if any.
pub async fn get_latest_migration_version(
    db: &DatabaseConnection,
) -> Result<Option<String>, DbErr> {
    match Migrator::get_applied_migrations(db).await {
        Ok(applied) => Ok(applied.last().map(|m| m.name().to_string())),
        Err(DbErr::Exec(_)) => Ok(None),
        Err(e) => Err(e),
    }
}
