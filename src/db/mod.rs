pub mod queries;
pub mod transfer;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};

pub use queries::categories::Category;
pub use queries::questions::{NewQuestion, Question};

use crate::configuration::DatabaseSettings;
use sqlx::Error;

pub async fn establish_connection(settings: &DatabaseSettings) -> Result<SqlitePool, Error> {
    // sqlx turns foreign keys on by default; question.category relies on it
    let options = SqliteConnectOptions::new()
        .filename(&settings.path)
        .create_if_missing(settings.create_if_missing);
    SqlitePool::connect_with(options).await
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
