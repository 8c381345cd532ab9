use std::sync::Arc;

use chrono::Duration;

use crate::error::{AppError, Result};
use crate::sweep::sweep_service::{
    ExpirationSweeper, DEFAULT_ALERT_CONCURRENCY, DEFAULT_EXPIRATION_MINUTES,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sweeper: ExpirationSweeper,
}

/// Where sweeps read and write.
#[derive(Clone)]
pub enum StoreBackend {
    /// The data platform's REST endpoint, authenticated with the service key.
    Rest { url: String, service_key: String },
    Postgres { database_url: String },
}

/// Longest accepted expiration window: one year.
const MAX_EXPIRATION_MINUTES: i64 = 60 * 24 * 365;

#[derive(Clone)]
pub struct Config {
    pub store: StoreBackend,
    pub expiration_window: Duration,
    pub alert_concurrency: usize,
    pub sweep_schedule: Option<String>,
    pub jwt_secret: Option<String>,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required =
            |key: &str| var(key).ok_or_else(|| AppError::Config(format!("{} must be set", key)));

        let store = match var("STORE_BACKEND").as_deref().unwrap_or("rest") {
            "rest" => StoreBackend::Rest {
                url: required("SUPABASE_URL")?,
                service_key: required("SUPABASE_SERVICE_ROLE_KEY")?,
            },
            "postgres" => StoreBackend::Postgres {
                database_url: required("DATABASE_URL")?,
            },
            other => {
                return Err(AppError::Config(format!(
                    "STORE_BACKEND must be `rest` or `postgres`, got `{}`",
                    other
                )))
            }
        };

        let expiration_minutes = parse_or(&var, "SWEEP_EXPIRATION_MINUTES", DEFAULT_EXPIRATION_MINUTES)?;
        if !(1..=MAX_EXPIRATION_MINUTES).contains(&expiration_minutes) {
            return Err(AppError::Config(format!(
                "SWEEP_EXPIRATION_MINUTES must be between 1 and {}, got {}",
                MAX_EXPIRATION_MINUTES, expiration_minutes
            )));
        }

        let alert_concurrency: usize =
            parse_or(&var, "SWEEP_ALERT_CONCURRENCY", DEFAULT_ALERT_CONCURRENCY)?;
        if alert_concurrency == 0 {
            return Err(AppError::Config(
                "SWEEP_ALERT_CONCURRENCY must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            store,
            expiration_window: Duration::minutes(expiration_minutes),
            alert_concurrency,
            sweep_schedule: var("SWEEP_SCHEDULE"),
            jwt_secret: var("SWEEP_JWT_SECRET"),
            host: var("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(&var, "PORT", 3000)?,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T> {
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Config(format!("{} must be a number, got `{}`", key, raw))),
        None => Ok(default),
    }
}
