use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{
            categories::{get_all_categories, get_category},
            questions::{count_questions, get_questions_for_category},
        },
        Category, Question,
    },
    server::{app::AppState, error::ApiError, pagination::paginate},
};

use super::{ApiResponse, PageQuery};

#[derive(Serialize)]
struct CategoriesList {
    success: bool,
    categories: BTreeMap<i64, String>,
}

#[derive(Serialize)]
struct CategoryQuestions {
    success: bool,
    questions: Vec<Question>,
    total_questions: i64,
    current_category: String,
}

pub(super) fn to_category_map(categories: Vec<Category>) -> BTreeMap<i64, String> {
    categories.into_iter().map(|c| (c.id, c.name)).collect()
}

async fn get_categories(State(pool): State<SqlitePool>) -> ApiResponse<CategoriesList> {
    let categories = to_category_map(get_all_categories(&pool).await?);
    if categories.is_empty() {
        return Err(ApiError::NotFound);
    }
    Ok(Json(CategoriesList {
        success: true,
        categories,
    }))
}

async fn get_category_questions(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Query(PageQuery { page }): Query<PageQuery>,
) -> ApiResponse<CategoryQuestions> {
    let category = get_category(&pool, id).await?;
    let questions = get_questions_for_category(&pool, category.id).await?;
    // counts every stored question, not just this category's
    let total_questions = count_questions(&pool).await?;

    Ok(Json(CategoryQuestions {
        success: true,
        questions: paginate(&questions, page).to_vec(),
        total_questions,
        current_category: category.name,
    }))
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(get_categories))
        .route("/categories/{id}/questions", get(get_category_questions))
        .with_state(state)
}
