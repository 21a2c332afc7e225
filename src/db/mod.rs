pub mod queries;
pub mod store;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use thiserror::Error;

pub use queries::categories::Category;
pub use queries::questions::{NewQuestion, Question};
pub use store::{DynStore, SqliteStore, Store};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{entity} {id} does not exist")]
    Missing { entity: &'static str, id: i64 },
}

pub type StoreResult<T> = Result<T, StoreError>;

pub async fn establish_connection(url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);
    SqlitePool::connect_with(options).await
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Fresh migrated in-memory database. A single long-lived connection keeps the
/// database alive for the whole test.
#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    use sqlx::sqlite::SqlitePoolOptions;

    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn import_upserts_by_id() {
        let pool = test_pool().await;
        queries::categories::import_categories(
            &pool,
            vec![
                Category {
                    id: 4,
                    kind: "Histroy".to_owned(),
                },
                Category {
                    id: 6,
                    kind: "Sports".to_owned(),
                },
            ],
        )
        .await
        .unwrap();
        queries::categories::import_categories(
            &pool,
            vec![Category {
                id: 4,
                kind: "History".to_owned(),
            }],
        )
        .await
        .unwrap();

        let all = queries::categories::get_all_categories(&pool).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].kind, "History");
    }

    #[tokio::test]
    async fn question_import_rejects_unknown_categories() {
        let pool = test_pool().await;
        let result = queries::questions::import_questions(
            &pool,
            vec![Question {
                id: 1,
                question: Some("Orphan?".to_owned()),
                answer: None,
                category: Some(77),
                difficulty: None,
            }],
        )
        .await;
        assert!(result.is_err());
        assert!(queries::questions::get_all_questions(&pool)
            .await
            .unwrap()
            .is_empty());
    }
}
