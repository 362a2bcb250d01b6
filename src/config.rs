//! Configuration management for Tensaku Server

use serde::Deserialize;
use std::env;

use crate::document::HighlightConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub review: ReviewConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewConfig {
    /// CSS class for highlighted excerpts in rendered HTML
    pub highlight_class: String,
    /// CSS class for the focused excerpt in rendered HTML
    pub selection_class: String,
    /// Maximum number of live review sessions
    pub max_sessions: usize,
    /// Maximum document length accepted for review, in characters
    pub max_document_chars: usize,
}

impl ReviewConfig {
    pub fn highlight_config(&self) -> HighlightConfig {
        HighlightConfig {
            highlight_class: self.highlight_class.clone(),
            selection_class: self.selection_class.clone(),
            ..HighlightConfig::default()
        }
    }
}

impl Default for ReviewConfig {
    fn default() -> Self {
        ReviewConfig {
            highlight_class: "tensaku-highlight".to_string(),
            selection_class: "tensaku-selection".to_string(),
            max_sessions: 256,
            max_document_chars: 20_000,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: "sqlite:./tensaku.db".to_string(),
            },
            review: ReviewConfig::default(),
        }
    }
}

/// Parse a numeric variable, keeping `default` when unset or invalid
fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        let defaults = ReviewConfig::default();
        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_var("SERVER_PORT", 3000),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")?,
            },
            review: ReviewConfig {
                highlight_class: env::var("REVIEW_HIGHLIGHT_CLASS")
                    .unwrap_or(defaults.highlight_class),
                selection_class: env::var("REVIEW_SELECTION_CLASS")
                    .unwrap_or(defaults.selection_class),
                max_sessions: parse_var("REVIEW_MAX_SESSIONS", defaults.max_sessions),
                max_document_chars: parse_var(
                    "REVIEW_MAX_DOCUMENT_CHARS",
                    defaults.max_document_chars,
                ),
            },
        })
    }
}
