//! Engine and server configuration, read from environment variables with defaults.

use crate::logic::{DEFAULT_RATING, K_FACTOR};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Rating settings used when recording results.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub k_factor: f64,
    /// Rating assumed for participants the store has no rating for.
    pub default_rating: i32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            k_factor: K_FACTOR,
            default_rating: DEFAULT_RATING,
        }
    }
}

impl EngineConfig {
    /// Override defaults with `BRACKET_K_FACTOR` and `BRACKET_DEFAULT_RATING`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            k_factor: env_or("BRACKET_K_FACTOR", defaults.k_factor),
            default_rating: env_or("BRACKET_DEFAULT_RATING", defaults.default_rating),
        }
    }
}

/// Bind address for the web binary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// Override defaults with `HOST` and `PORT`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: env_or("PORT", defaults.port),
        }
    }
}
