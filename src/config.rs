use std::net::SocketAddr;

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

const DEFAULT_DATABASE_URL: &str = "sqlite:trivia.db";
const DEFAULT_BIND: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database_url: String,
    pub bind: SocketAddr,
}

impl Settings {
    /// Defaults overlaid by `TRIVIA_*` environment variables. A `.env` file in
    /// the working directory is loaded first.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_env(Environment::with_prefix("TRIVIA"))
    }

    fn from_env(env: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("database_url", DEFAULT_DATABASE_URL)?
            .set_default("bind", DEFAULT_BIND)?
            .add_source(env)
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_with(vars: &[(&str, &str)]) -> Environment {
        let mut source = config::Map::new();
        for (key, value) in vars {
            source.insert((*key).to_owned(), (*value).to_owned());
        }
        Environment::with_prefix("TRIVIA").source(Some(source))
    }

    #[test]
    fn defaults_apply_without_environment() {
        let settings = Settings::from_env(env_with(&[])).unwrap();
        assert_eq!(settings.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(settings.bind, SocketAddr::from(([0, 0, 0, 0], 8080)));
    }

    #[test]
    fn environment_overrides_defaults() {
        let settings = Settings::from_env(env_with(&[
            ("TRIVIA_DATABASE_URL", "sqlite::memory:"),
            ("TRIVIA_BIND", "127.0.0.1:5000"),
        ]))
        .unwrap();
        assert_eq!(settings.database_url, "sqlite::memory:");
        assert_eq!(settings.bind, SocketAddr::from(([127, 0, 0, 1], 5000)));
    }

    #[test]
    fn rejects_malformed_bind_address() {
        assert!(Settings::from_env(env_with(&[("TRIVIA_BIND", "not-an-address")])).is_err());
    }
}
