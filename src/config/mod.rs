mod types;

pub use types::*;

use crate::{Error, Result};
use std::env;
use tracing::debug;

/// Resolves the full configuration from environment variables. Every
/// variable is optional; unset values take the documented defaults.
pub fn load() -> Result<Config> {
    debug!("Loading configuration from environment");

    let mut config = Config::default();

    if let Ok(host) = env::var("HOST") {
        config.server.host = host;
    }
    if let Ok(port) = env::var("PORT") {
        config.server.port = parse_port(&port)?;
    }
    if let Ok(debug_flag) = env::var("DEBUG") {
        config.server.debug = parse_bool(&debug_flag);
    }
    if let Ok(path) = env::var("DATABASE_PATH") {
        config.database.path = path;
    }
    if let Ok(path) = env::var("MODEL_PATH") {
        config.model.model_path = path;
    }
    if let Ok(path) = env::var("SCALER_PATH") {
        config.model.scaler_path = path;
    }
    if let Ok(path) = env::var("TRAINING_DATA_PATH") {
        config.model.training_data_path = path;
    }
    if let Ok(secret) = env::var("SECRET_KEY") {
        // The JWT secret tracks the app secret unless set on its own.
        config.security.secret_key = secret.clone();
        config.security.jwt_secret_key = secret;
    }
    if let Ok(secret) = env::var("JWT_SECRET_KEY") {
        config.security.jwt_secret_key = secret;
    }
    if let Ok(level) = env::var("LOG_LEVEL") {
        config.logs.level = level;
    }

    Ok(config)
}

fn parse_port(value: &str) -> Result<u16> {
    value
        .parse::<u16>()
        .map_err(|e| Error::config(format!("Invalid PORT value '{}': {}", value, e)))
}

fn parse_bool(value: &str) -> bool {
    value.trim().to_lowercase() == "true"
}
