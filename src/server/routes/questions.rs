use std::collections::BTreeMap;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_option_number_from_string;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{
            categories::get_all_categories,
            questions::{self, count_questions, get_all_questions, get_question_by_id},
        },
        NewQuestion, Question,
    },
    server::{
        app::AppState, deserializers::deserialize_non_blank_string, error::ApiError,
        pagination::paginate,
    },
    telemetry::{QUESTIONS_CREATED, QUESTIONS_DELETED},
};

use super::{categories::to_category_map, ApiResponse, PageQuery};

/// Body accepted by `POST /questions`: either a new question or a `searchTerm`.
#[derive(Deserialize)]
struct QuestionPayload {
    #[serde(default, deserialize_with = "deserialize_non_blank_string")]
    question: Option<String>,
    #[serde(default, deserialize_with = "deserialize_non_blank_string")]
    answer: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    difficulty: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    category: Option<i64>,
    #[serde(rename = "searchTerm")]
    #[serde(default, deserialize_with = "deserialize_non_blank_string")]
    search_term: Option<String>,
}

impl QuestionPayload {
    fn into_new_question(self) -> Option<NewQuestion> {
        Some(NewQuestion {
            question: self.question?,
            answer: self.answer?,
            category: self.category?,
            difficulty: self.difficulty?,
        })
    }
}

#[derive(Deserialize)]
struct SearchPayload {
    #[serde(rename = "searchTerm")]
    #[serde(default, deserialize_with = "deserialize_non_blank_string")]
    search_term: Option<String>,
}

#[derive(Serialize)]
struct QuestionsPage {
    success: bool,
    questions: Vec<Question>,
    total_questions: i64,
    categories: BTreeMap<i64, String>,
}

#[derive(Serialize)]
struct CreatedQuestion {
    success: bool,
    created: i64,
    question_created: String,
    questions: Vec<Question>,
    total_questions: i64,
}

#[derive(Serialize)]
struct DeletedQuestion {
    success: bool,
    deleted: i64,
}

#[derive(Serialize)]
struct SearchResults {
    success: bool,
    questions: Vec<Question>,
    total_questions: i64,
}

#[derive(Serialize)]
#[serde(untagged)]
enum SubmitResponse {
    Search(SearchResults),
    Created(CreatedQuestion),
}

fn parse_json<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        tracing::debug!(%rejection, "Rejected request body");
        ApiError::Unprocessable
    })
}

async fn get_questions(
    State(pool): State<SqlitePool>,
    Query(PageQuery { page }): Query<PageQuery>,
) -> ApiResponse<QuestionsPage> {
    let questions = get_all_questions(&pool).await?;
    let current = paginate(&questions, page);
    if current.is_empty() {
        return Err(ApiError::NotFound);
    }
    let categories = to_category_map(get_all_categories(&pool).await?);

    Ok(Json(QuestionsPage {
        success: true,
        questions: current.to_vec(),
        total_questions: questions.len() as i64,
        categories,
    }))
}

// Search and create share this endpoint, a non-empty `searchTerm` selects search.
async fn submit_question(
    State(pool): State<SqlitePool>,
    Query(PageQuery { page }): Query<PageQuery>,
    payload: Result<Json<QuestionPayload>, JsonRejection>,
) -> ApiResponse<SubmitResponse> {
    let mut payload = parse_json(payload)?;
    let response = match payload.search_term.take() {
        Some(term) => SubmitResponse::Search(search(&pool, &term, page).await?),
        None => SubmitResponse::Created(create(&pool, payload).await?),
    };
    Ok(Json(response))
}

async fn search_questions(
    State(pool): State<SqlitePool>,
    Query(PageQuery { page }): Query<PageQuery>,
    payload: Result<Json<SearchPayload>, JsonRejection>,
) -> ApiResponse<SearchResults> {
    let term = parse_json(payload)?
        .search_term
        .ok_or(ApiError::Unprocessable)?;
    search(&pool, &term, page).await.map(Json)
}

async fn search(pool: &SqlitePool, term: &str, page: i64) -> Result<SearchResults, ApiError> {
    let matches = questions::search_questions(pool, term).await?;
    if matches.is_empty() {
        return Err(ApiError::NotFound);
    }
    tracing::debug!(term, matches = matches.len(), "Search matched questions");

    Ok(SearchResults {
        success: true,
        questions: paginate(&matches, page).to_vec(),
        // counts every stored question, not just the matches
        total_questions: count_questions(pool).await?,
    })
}

async fn create(pool: &SqlitePool, payload: QuestionPayload) -> Result<CreatedQuestion, ApiError> {
    let new_question = payload
        .into_new_question()
        .ok_or(ApiError::Unprocessable)?;

    let id = questions::create_question(pool, &new_question)
        .await
        .map_err(|error| {
            tracing::warn!(%error, "Failed to create question");
            ApiError::Unprocessable
        })?;
    QUESTIONS_CREATED.inc();
    tracing::info!(id, category = new_question.category, "Question created");

    let all_questions = get_all_questions(pool).await?;
    Ok(CreatedQuestion {
        success: true,
        created: id,
        question_created: new_question.question,
        questions: paginate(&all_questions, 1).to_vec(),
        total_questions: all_questions.len() as i64,
    })
}

async fn create_question(
    State(pool): State<SqlitePool>,
    payload: Result<Json<QuestionPayload>, JsonRejection>,
) -> ApiResponse<CreatedQuestion> {
    create(&pool, parse_json(payload)?).await.map(Json)
}

async fn delete_question(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> ApiResponse<DeletedQuestion> {
    let question = get_question_by_id(&pool, id).await?;
    questions::delete_question(&pool, question.id)
        .await
        .map_err(|error| {
            tracing::warn!(%error, id, "Failed to delete question");
            ApiError::Unprocessable
        })?;
    QUESTIONS_DELETED.inc();
    tracing::info!(id, "Question deleted");

    Ok(Json(DeletedQuestion {
        success: true,
        deleted: question.id,
    }))
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route("/questions", get(get_questions).post(submit_question))
        .route("/questions/new", post(create_question))
        .route("/questions/search", post(search_questions))
        .route("/questions/{id}", delete(delete_question))
        .with_state(state)
}
