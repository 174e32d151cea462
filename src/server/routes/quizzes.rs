use std::collections::HashSet;

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use rand::{seq::IteratorRandom, Rng};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{
            categories::get_category,
            questions::{get_all_questions, get_questions_for_category},
        },
        Question,
    },
    server::{app::AppState, error::ApiError},
    telemetry::QUIZ_QUESTIONS_SERVED,
};

use super::ApiResponse;

/// The quiz category can arrive as a bare id or as the `{id, type}` object clients display.
/// Id 0 stands for "all categories".
#[derive(Deserialize, Debug, PartialEq)]
#[serde(untagged)]
enum QuizCategory {
    Id(i64),
    Object { id: i64 },
}

impl QuizCategory {
    fn id(&self) -> Option<i64> {
        let id = match self {
            QuizCategory::Id(id) | QuizCategory::Object { id } => *id,
        };
        (id != 0).then_some(id)
    }
}

#[derive(Deserialize)]
struct QuizRequest {
    #[serde(default)]
    previous_questions: Vec<i64>,
    #[serde(default)]
    quiz_category: Option<QuizCategory>,
}

#[derive(Serialize)]
struct QuizQuestion {
    success: bool,
    // None once every eligible question has been played
    question: Option<Question>,
}

/// Picks one of `candidates` uniformly at random, skipping ids listed in `previous`.
pub fn pick_quiz_question<R: Rng + ?Sized>(
    candidates: Vec<Question>,
    previous: &[i64],
    rng: &mut R,
) -> Option<Question> {
    let previous: HashSet<i64> = previous.iter().copied().collect();
    candidates
        .into_iter()
        .filter(|q| !previous.contains(&q.id))
        .choose(rng)
}

async fn next_quiz_question(
    State(pool): State<SqlitePool>,
    payload: Result<Json<QuizRequest>, JsonRejection>,
) -> ApiResponse<QuizQuestion> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(%rejection, "Rejected quiz request");
        ApiError::Unprocessable
    })?;

    let category = request.quiz_category.as_ref().and_then(QuizCategory::id);
    let candidates = match category {
        Some(id) => {
            let category = get_category(&pool, id).await?;
            get_questions_for_category(&pool, category.id).await?
        }
        None => get_all_questions(&pool).await?,
    };

    let question = pick_quiz_question(candidates, &request.previous_questions, &mut rand::rng());
    let label = category.map_or_else(|| "all".to_owned(), |id| id.to_string());
    match &question {
        Some(q) => {
            QUIZ_QUESTIONS_SERVED.with_label_values(&[label.as_str()]).inc();
            tracing::debug!(id = q.id, category = %label, "Serving quiz question");
        }
        None => tracing::info!(
            category = %label,
            played = request.previous_questions.len(),
            "Quiz exhausted"
        ),
    }

    Ok(Json(QuizQuestion {
        success: true,
        question,
    }))
}

pub fn quizzes_router(state: AppState) -> Router {
    Router::new()
        .route("/quizzes", post(next_quiz_question))
        .with_state(state)
}
