use std::collections::BTreeMap;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    db::{queries::categories::type_mapping, DynStore, NewQuestion, Question},
    pagination::{paginate, PageParams},
    server::{
        app::AppState,
        deserializers::deserialize_optional_int,
        error::{ApiError, ApiResponse, OrFailWith},
        extract::{IdPath, JsonBody, QueryParams},
    },
    telemetry::QUESTIONS_CREATED_CNTR,
};

// Fields stay raw JSON so that a well-formed body with a bad value is a
// creation failure rather than a bad request.
#[derive(Deserialize)]
struct NewQuestionBody {
    #[serde(default)]
    question: Value,
    #[serde(default)]
    answer: Value,
    #[serde(default)]
    category: Value,
    #[serde(default)]
    difficulty: Value,
}

impl TryFrom<NewQuestionBody> for NewQuestion {
    type Error = serde_json::Error;

    fn try_from(body: NewQuestionBody) -> Result<Self, Self::Error> {
        Ok(NewQuestion {
            question: Option::<String>::deserialize(body.question)?,
            answer: Option::<String>::deserialize(body.answer)?,
            category: deserialize_optional_int(body.category)?,
            difficulty: deserialize_optional_int(body.difficulty)?,
        })
    }
}

#[derive(Deserialize)]
struct SearchBody {
    #[serde(default, rename = "searchTerm")]
    search_term: Option<String>,
}

#[derive(Serialize)]
struct QuestionsPage {
    questions: Vec<Question>,
    total_questions: usize,
    categories: BTreeMap<i64, String>,
    // older clients read the category mapping under this key
    current_category: BTreeMap<i64, String>,
    success: bool,
}

#[derive(Serialize)]
struct SingleQuestion {
    question: Question,
    success: bool,
}

#[derive(Serialize)]
struct CreatedQuestion {
    success: bool,
    created: i64,
    questions: Vec<Question>,
    total_questions: usize,
}

#[derive(Serialize)]
struct DeletedQuestion {
    success: bool,
    deleted: i64,
    questions: Vec<Question>,
    total_questions: usize,
}

#[derive(Serialize)]
struct RelatedQuestions {
    success: bool,
    related_questions: Vec<Question>,
    total_questions: usize,
}

#[tracing::instrument(skip(store))]
async fn get_questions(
    State(store): State<DynStore>,
    QueryParams(params): QueryParams<PageParams>,
) -> ApiResponse<Json<QuestionsPage>> {
    let questions = store.list_questions().await.or_fail_with(ApiError::NotFound)?;
    let total_questions = questions.len();
    let current = paginate(questions, params.page);
    if current.is_empty() {
        return Err(ApiError::NotFound(None));
    }
    let categories = store.list_categories().await.or_fail_with(ApiError::NotFound)?;
    let categories = type_mapping(&categories);
    Ok(Json(QuestionsPage {
        questions: current,
        total_questions,
        current_category: categories.clone(),
        categories,
        success: true,
    }))
}

#[tracing::instrument(skip(store))]
async fn question(
    State(store): State<DynStore>,
    IdPath(id): IdPath<i64>,
) -> ApiResponse<Json<SingleQuestion>> {
    let question = store
        .get_question(id)
        .await
        .or_fail_with(ApiError::NotFound)?
        .ok_or_else(|| ApiError::NotFound(Some(format!("question {id}"))))?;
    Ok(Json(SingleQuestion {
        question,
        success: true,
    }))
}

// Creation failures answer 405, the status existing clients check for.
#[tracing::instrument(skip(store, body))]
async fn create_question(
    State(store): State<DynStore>,
    QueryParams(params): QueryParams<PageParams>,
    JsonBody(body): JsonBody<NewQuestionBody>,
) -> ApiResponse<Json<CreatedQuestion>> {
    let new_question = NewQuestion::try_from(body).map_err(|err| {
        tracing::debug!(%err, "rejected question fields");
        ApiError::MethodNotAllowed(Some(err.to_string()))
    })?;
    if let Some(category) = new_question.category {
        store
            .get_category(category)
            .await
            .or_fail_with(ApiError::MethodNotAllowed)?
            .ok_or_else(|| {
                ApiError::MethodNotAllowed(Some(format!("category {category} does not exist")))
            })?;
    }
    let created = store
        .insert_question(&new_question)
        .await
        .or_fail_with(ApiError::MethodNotAllowed)?;
    QUESTIONS_CREATED_CNTR.inc();
    tracing::info!(id = created, "question created");

    let questions = store
        .list_questions()
        .await
        .or_fail_with(ApiError::MethodNotAllowed)?;
    let total_questions = questions.len();
    let questions = paginate(questions, params.page);
    if questions.is_empty() {
        return Err(ApiError::MethodNotAllowed(None));
    }
    Ok(Json(CreatedQuestion {
        success: true,
        created,
        questions,
        total_questions,
    }))
}

#[tracing::instrument(skip(store))]
async fn delete_question(
    State(store): State<DynStore>,
    IdPath(id): IdPath<i64>,
    QueryParams(params): QueryParams<PageParams>,
) -> ApiResponse<Json<DeletedQuestion>> {
    store
        .get_question(id)
        .await
        .or_fail_with(ApiError::Unprocessable)?
        .ok_or_else(|| ApiError::NotFound(Some(format!("question {id}"))))?;
    store
        .delete_question(id)
        .await
        .or_fail_with(ApiError::Unprocessable)?;
    tracing::info!(id, "question deleted");

    let remaining = store
        .list_questions()
        .await
        .or_fail_with(ApiError::Unprocessable)?;
    let total_questions = remaining.len();
    // the row is already gone; an empty page still fails the request
    let questions = paginate(remaining, params.page);
    if questions.is_empty() {
        return Err(ApiError::Unprocessable(None));
    }
    Ok(Json(DeletedQuestion {
        success: true,
        deleted: id,
        questions,
        total_questions,
    }))
}

/// Total count next to a non-empty page of matches. The count is over all
/// questions, not over the matches.
async fn related_page(
    store: &DynStore,
    matches: Vec<Question>,
    page: i64,
) -> ApiResponse<Json<RelatedQuestions>> {
    let related_questions = paginate(matches, page);
    if related_questions.is_empty() {
        return Err(ApiError::NotFound(None));
    }
    let total_questions = store
        .list_questions()
        .await
        .or_fail_with(ApiError::NotFound)?
        .len();
    Ok(Json(RelatedQuestions {
        success: true,
        related_questions,
        total_questions,
    }))
}

#[tracing::instrument(skip(store, body))]
async fn search_questions(
    State(store): State<DynStore>,
    QueryParams(params): QueryParams<PageParams>,
    JsonBody(body): JsonBody<SearchBody>,
) -> ApiResponse<Json<RelatedQuestions>> {
    let term = body
        .search_term
        .ok_or_else(|| ApiError::NotFound(Some("searchTerm is required".to_owned())))?;
    tracing::debug!(term = %term, "searching questions");
    let matches = store
        .search_questions(&term)
        .await
        .or_fail_with(ApiError::NotFound)?;
    related_page(&store, matches, params.page).await
}

#[tracing::instrument(skip(store))]
async fn category_questions(
    State(store): State<DynStore>,
    IdPath(category): IdPath<i64>,
    QueryParams(params): QueryParams<PageParams>,
) -> ApiResponse<Json<RelatedQuestions>> {
    let matches = store
        .questions_in_category(category)
        .await
        .or_fail_with(ApiError::NotFound)?;
    related_page(&store, matches, params.page).await
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route("/questions", get(get_questions).post(create_question))
        .route("/questions/search", post(search_questions))
        .route("/questions/{id}", get(question).delete(delete_question))
        .route("/categories/{id}/questions", get(category_questions))
        .with_state(state)
}
