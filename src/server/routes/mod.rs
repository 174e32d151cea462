mod categories;
mod questions;
mod quizzes;

use axum::Json;
use serde::Deserialize;

use super::{
    deserializers::{deserialize_page, first_page},
    error::ApiError,
};

pub use categories::category_router;
pub use questions::questions_router;
pub use quizzes::{pick_quiz_question, quizzes_router};

pub type ApiResponse<T> = Result<Json<T>, ApiError>;

#[derive(Deserialize)]
struct PageQuery {
    #[serde(default = "first_page", deserialize_with = "deserialize_page")]
    page: i64,
}
