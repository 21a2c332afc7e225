use std::collections::BTreeMap;

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::{
    db::{queries::categories::type_mapping, Category, DynStore},
    pagination::{paginate, PageParams},
    server::{
        app::AppState,
        error::{ApiError, ApiResponse, OrFailWith},
        extract::{IdPath, JsonBody, QueryParams},
    },
};

#[derive(Deserialize)]
struct CategoryUpdate {
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

#[derive(Serialize)]
struct CategoriesPage {
    categories: BTreeMap<i64, String>,
    total_categories: usize,
    success: bool,
}

#[derive(Serialize)]
struct SingleCategory {
    category: Category,
    success: bool,
}

#[derive(Serialize)]
struct UpdatedCategory {
    success: bool,
    id: i64,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Serialize)]
struct DeletedCategory {
    success: bool,
    deleted: i64,
    categories: Vec<Category>,
    total_categories: usize,
}

#[tracing::instrument(skip(store))]
async fn get_categories(
    State(store): State<DynStore>,
    QueryParams(params): QueryParams<PageParams>,
) -> ApiResponse<Json<CategoriesPage>> {
    let categories = store.list_categories().await.or_fail_with(ApiError::NotFound)?;
    let total_categories = categories.len();
    let current = paginate(categories, params.page);
    if current.is_empty() {
        return Err(ApiError::NotFound(None));
    }
    Ok(Json(CategoriesPage {
        categories: type_mapping(&current),
        total_categories,
        success: true,
    }))
}

#[tracing::instrument(skip(store))]
async fn category(
    State(store): State<DynStore>,
    IdPath(id): IdPath<i64>,
) -> ApiResponse<Json<SingleCategory>> {
    let category = store
        .get_category(id)
        .await
        .or_fail_with(ApiError::NotFound)?
        .ok_or_else(|| ApiError::NotFound(Some(format!("category {id}"))))?;
    Ok(Json(SingleCategory {
        category,
        success: true,
    }))
}

#[tracing::instrument(skip(store, update))]
async fn update_category(
    State(store): State<DynStore>,
    IdPath(id): IdPath<i64>,
    JsonBody(update): JsonBody<CategoryUpdate>,
) -> ApiResponse<Json<UpdatedCategory>> {
    let mut category = store
        .get_category(id)
        .await
        .or_fail_with(ApiError::BadRequest)?
        .ok_or_else(|| ApiError::NotFound(Some(format!("category {id}"))))?;
    if let Some(kind) = update.kind {
        category.kind = kind;
    }
    store
        .update_category(&category)
        .await
        .or_fail_with(ApiError::BadRequest)?;
    tracing::info!(id, kind = %category.kind, "category updated");
    Ok(Json(UpdatedCategory {
        success: true,
        id: category.id,
        kind: category.kind,
    }))
}

#[tracing::instrument(skip(store))]
async fn delete_category(
    State(store): State<DynStore>,
    IdPath(id): IdPath<i64>,
    QueryParams(params): QueryParams<PageParams>,
) -> ApiResponse<Json<DeletedCategory>> {
    store
        .get_category(id)
        .await
        .or_fail_with(ApiError::Unprocessable)?
        .ok_or_else(|| ApiError::NotFound(Some(format!("category {id}"))))?;
    store
        .delete_category(id)
        .await
        .or_fail_with(ApiError::Unprocessable)?;
    tracing::info!(id, "category deleted");

    let remaining = store
        .list_categories()
        .await
        .or_fail_with(ApiError::Unprocessable)?;
    let total_categories = remaining.len();
    let categories = paginate(remaining, params.page);
    if categories.is_empty() {
        return Err(ApiError::Unprocessable(None));
    }
    Ok(Json(DeletedCategory {
        success: true,
        deleted: id,
        categories,
        total_categories,
    }))
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(get_categories))
        .route(
            "/categories/{id}",
            get(category).patch(update_category).delete(delete_category),
        )
        .with_state(state)
}
