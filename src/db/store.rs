use std::sync::Arc;

use async_trait::async_trait;
use sqlx::SqlitePool;

use super::queries::{categories, questions};
use super::{Category, NewQuestion, Question, StoreError, StoreResult};

pub type DynStore = Arc<dyn Store>;

/// Persistence capabilities the request handlers rely on. Every listing is
/// ordered by id.
#[async_trait]
pub trait Store: Send + Sync {
    async fn get_category(&self, id: i64) -> StoreResult<Option<Category>>;
    async fn list_categories(&self) -> StoreResult<Vec<Category>>;
    async fn update_category(&self, category: &Category) -> StoreResult<()>;
    async fn delete_category(&self, id: i64) -> StoreResult<()>;

    async fn get_question(&self, id: i64) -> StoreResult<Option<Question>>;
    async fn list_questions(&self) -> StoreResult<Vec<Question>>;
    async fn search_questions(&self, term: &str) -> StoreResult<Vec<Question>>;
    async fn questions_in_category(&self, category: i64) -> StoreResult<Vec<Question>>;
    async fn insert_question(&self, question: &NewQuestion) -> StoreResult<i64>;
    async fn delete_question(&self, id: i64) -> StoreResult<()>;
}

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn expect_row(affected: u64, entity: &'static str, id: i64) -> StoreResult<()> {
    if affected == 0 {
        Err(StoreError::Missing { entity, id })
    } else {
        Ok(())
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn get_category(&self, id: i64) -> StoreResult<Option<Category>> {
        Ok(categories::get_category(&self.pool, id).await?)
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        Ok(categories::get_all_categories(&self.pool).await?)
    }

    async fn update_category(&self, category: &Category) -> StoreResult<()> {
        let affected = categories::update_category(&self.pool, category).await?;
        expect_row(affected, "category", category.id)
    }

    async fn delete_category(&self, id: i64) -> StoreResult<()> {
        let affected = categories::delete_category(&self.pool, id).await?;
        expect_row(affected, "category", id)
    }

    async fn get_question(&self, id: i64) -> StoreResult<Option<Question>> {
        Ok(questions::get_question_by_id(&self.pool, id).await?)
    }

    async fn list_questions(&self) -> StoreResult<Vec<Question>> {
        Ok(questions::get_all_questions(&self.pool).await?)
    }

    async fn search_questions(&self, term: &str) -> StoreResult<Vec<Question>> {
        Ok(questions::search_questions(&self.pool, term).await?)
    }

    async fn questions_in_category(&self, category: i64) -> StoreResult<Vec<Question>> {
        Ok(questions::get_questions_for_category(&self.pool, category).await?)
    }

    async fn insert_question(&self, question: &NewQuestion) -> StoreResult<i64> {
        Ok(questions::create_question(&self.pool, question).await?)
    }

    async fn delete_question(&self, id: i64) -> StoreResult<()> {
        let affected = questions::delete_question(&self.pool, id).await?;
        expect_row(affected, "question", id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    async fn seeded_store() -> SqliteStore {
        let pool = test_pool().await;
        let science = categories::create_category(&pool, "Science").await.unwrap();
        let art = categories::create_category(&pool, "Art").await.unwrap();
        for (text, category) in [
            ("What is the heaviest organ in the human body?", science),
            ("Who painted the MONA LISA?", art),
            ("What is 50% of 10?", science),
        ] {
            questions::create_question(
                &pool,
                &NewQuestion {
                    question: Some(text.to_owned()),
                    answer: Some("-".to_owned()),
                    category: Some(category),
                    difficulty: Some(1),
                },
            )
            .await
            .unwrap();
        }
        SqliteStore::new(pool)
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_ordered() {
        let store = seeded_store().await;
        let found = store.search_questions("mona").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 2);

        let found = store.search_questions("WHAT").await.unwrap();
        let ids: Vec<i64> = found.iter().map(|q| q.id).collect();
        assert_eq!(ids, [1, 3]);
    }

    #[tokio::test]
    async fn search_matches_wildcards_literally() {
        let store = seeded_store().await;
        let found = store.search_questions("50%").await.unwrap();
        assert_eq!(found.len(), 1);
        assert!(store.search_questions("%%").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_folds_non_ascii_case() {
        let store = seeded_store().await;
        let id = store
            .insert_question(&NewQuestion {
                question: Some("Who is PELÉ?".to_owned()),
                ..NewQuestion::default()
            })
            .await
            .unwrap();
        let found = store.search_questions("pelé").await.unwrap();
        let ids: Vec<i64> = found.iter().map(|q| q.id).collect();
        assert_eq!(ids, [id]);
        assert!(store.search_questions("ÉTAIT").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn filters_questions_by_category() {
        let store = seeded_store().await;
        let found = store.questions_in_category(1).await.unwrap();
        let ids: Vec<i64> = found.iter().map(|q| q.id).collect();
        assert_eq!(ids, [1, 3]);
        assert!(store.questions_in_category(42).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_unknown_rows_reports_missing() {
        let store = seeded_store().await;
        let err = store.delete_question(99).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Missing {
                entity: "question",
                id: 99
            }
        ));
        assert!(store.delete_category(99).await.is_err());
    }

    #[tokio::test]
    async fn deleting_a_category_detaches_its_questions() {
        let store = seeded_store().await;
        store.delete_category(2).await.unwrap();
        let question = store.get_question(2).await.unwrap().unwrap();
        assert_eq!(question.category, None);
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = seeded_store().await;
        store.delete_question(3).await.unwrap();
        let id = store.insert_question(&NewQuestion::default()).await.unwrap();
        assert_eq!(id, 4);
    }
}
