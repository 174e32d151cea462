use std::path::PathBuf;

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    pub host: String,
    // env variables always arrive as strings
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

#[derive(Deserialize, Clone, Debug)]
pub struct DatabaseSettings {
    pub path: PathBuf,
    pub create_if_missing: bool,
}

/// Reads settings from defaults, an optional `trivia.{toml,yaml,json}` in the working directory
/// and `TRIVIA_*` environment variables, in that order of precedence.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    dotenv::dotenv().ok();
    load_configuration(
        Environment::with_prefix("TRIVIA")
            .prefix_separator("_")
            .separator("__"),
    )
}

fn load_configuration(env: Environment) -> Result<Settings, ConfigError> {
    config::Config::builder()
        .set_default("application.host", "0.0.0.0")?
        .set_default("application.port", 8080)?
        .set_default("database.path", "trivia.db")?
        .set_default("database.create_if_missing", true)?
        .add_source(File::with_name("trivia").required(false))
        .add_source(env)
        .build()?
        .try_deserialize()
}
