#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::ServiceExt;

use trivia_api::configuration::DatabaseSettings;
use trivia_api::db::queries::questions::create_question;
use trivia_api::db::{establish_connection, run_migrations, NewQuestion};
use trivia_api::server::app::{build_router, AppState};

/// A migrated database in a temporary directory plus the router serving it.
/// The six standard categories (ids 1..=6) are present, questions are not.
pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    _dir: TempDir,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let settings = DatabaseSettings {
            path: dir.path().join("trivia.db"),
            create_if_missing: true,
        };
        let pool = establish_connection(&settings)
            .await
            .expect("failed to open test database");
        run_migrations(&pool)
            .await
            .expect("failed to run migrations");
        let router = build_router(AppState::new(pool.clone()));
        Self {
            router,
            pool,
            _dir: dir,
        }
    }

    pub async fn add_question(&self, text: &str, category: i64) -> i64 {
        create_question(
            &self.pool,
            &NewQuestion {
                question: text.to_owned(),
                answer: format!("answer to {text}"),
                category,
                difficulty: 1,
            },
        )
        .await
        .expect("failed to insert question")
    }

    /// Inserts `count` questions spread over categories 1..=6, returns their ids in order.
    pub async fn seed_questions(&self, count: i64) -> Vec<i64> {
        let mut ids = Vec::new();
        for n in 0..count {
            ids.push(self.add_question(&format!("Question {n}?"), n % 6 + 1).await);
        }
        ids
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("failed to build request"))
            .await
            .expect("request failed");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None).await
    }
}

pub fn ids_of(questions: &Value) -> Vec<i64> {
    questions
        .as_array()
        .expect("questions should be an array")
        .iter()
        .map(|q| q["id"].as_i64().expect("question id should be an integer"))
        .collect()
}

pub fn assert_error(status: StatusCode, body: &Value, expected: StatusCode, message: &str) {
    assert_eq!(status, expected, "unexpected status, body: {body}");
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], expected.as_u16());
    assert_eq!(body["message"], message);
}
