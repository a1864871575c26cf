use std::future::Future;
use std::pin::Pin;

use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};

use crate::error::AppError;

/// Boxed future borrowed from a transaction for the duration of `with_txn`.
pub type TxnFuture<'c, R> = Pin<Box<dyn Future<Output = Result<R, AppError>> + Send + 'c>>;

/// Run `f` inside a transaction on `db`; commit on `Ok`, roll back on `Err`.
///
/// ```ignore
/// with_txn(db, |txn| Box::pin(async move { sessions::swipe(txn, ..).await })).await
/// ```
pub async fn with_txn<R, F>(db: &DatabaseConnection, f: F) -> Result<R, AppError>
where
    R: Send,
    F: for<'c> FnOnce(&'c DatabaseTransaction) -> TxnFuture<'c, R> + Send,
{
    let txn = db.begin().await?;

    match f(&txn).await {
        Ok(val) => {
            txn.commit().await?;
            Ok(val)
        }
        Err(err) => {
            // Best effort; the closure's error is the one worth reporting
            let _ = txn.rollback().await;
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{ConnectOptions, ConnectionTrait, Database, Statement};

    use super::*;

    async fn scratch_db() -> DatabaseConnection {
        let mut opts = ConnectOptions::new("sqlite::memory:");
        opts.max_connections(1);
        let db = Database::connect(opts).await.unwrap();
        db.execute_unprepared("CREATE TABLE swipes (id INTEGER PRIMARY KEY)")
            .await
            .unwrap();
        db
    }

    async fn row_count(db: &DatabaseConnection) -> i64 {
        let row = db
            .query_one(Statement::from_string(
                db.get_database_backend(),
                "SELECT COUNT(*) AS n FROM swipes".to_owned(),
            ))
            .await
            .unwrap()
            .unwrap();
        row.try_get("", "n").unwrap()
    }

    #[tokio::test]
    async fn ok_commits() {
        let db = scratch_db().await;
        let out = with_txn(&db, |txn| {
            Box::pin(async move {
                txn.execute_unprepared("INSERT INTO swipes (id) VALUES (1)")
                    .await?;
                Ok(7)
            })
        })
        .await
        .unwrap();
        assert_eq!(out, 7);
        assert_eq!(row_count(&db).await, 1);
    }

    #[tokio::test]
    async fn err_rolls_back_and_is_returned() {
        let db = scratch_db().await;
        let err = with_txn(&db, |txn| {
            Box::pin(async move {
                txn.execute_unprepared("INSERT INTO swipes (id) VALUES (1)")
                    .await?;
                Err::<(), _>(AppError::internal("swipe rejected"))
            })
        })
        .await
        .unwrap_err();
        assert!(err.to_string().contains("swipe rejected"));
        assert_eq!(row_count(&db).await, 0);
    }
}
