// src/config.rs

use chrono::{FixedOffset, Offset, Utc};
use dotenvy::dotenv;
use std::env;

/// Default number of entries on the daily leaderboard.
pub const DEFAULT_LEADERBOARD_SIZE: usize = 3;

/// Upper bound for the `limit` query parameter on leaderboards.
pub const MAX_LEADERBOARD_SIZE: usize = 100;

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. `None` runs against the in-memory store.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub rust_log: String,
    pub port: u16,
    /// Origins allowed by CORS.
    pub cors_origins: Vec<String>,
    /// Reference timezone used to decide which calendar day "today" is.
    pub utc_offset: FixedOffset,
    pub leaderboard_size: usize,
    /// Reject daily submissions outside a configured live window.
    pub enforce_session_window: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let mut cors_origins = vec![
            "http://localhost:5173".to_string(),
            "http://localhost:3000".to_string(),
        ];
        if let Ok(client_url) = env::var("CLIENT_URL") {
            cors_origins.push(client_url);
        }

        let utc_offset = env::var("QUIZ_UTC_OFFSET_MINUTES")
            .ok()
            .and_then(|m| m.parse::<i32>().ok())
            .and_then(|minutes| FixedOffset::east_opt(minutes * 60))
            .unwrap_or_else(utc);

        let leaderboard_size = env::var("LEADERBOARD_SIZE")
            .ok()
            .and_then(|n| n.parse::<usize>().ok())
            .map(|n| n.clamp(1, MAX_LEADERBOARD_SIZE))
            .unwrap_or(DEFAULT_LEADERBOARD_SIZE);

        let enforce_session_window = env::var("ENFORCE_SESSION_WINDOW")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            database_url,
            jwt_secret,
            rust_log,
            port,
            cors_origins,
            utc_offset,
            leaderboard_size,
            enforce_session_window,
        }
    }

    /// Configuration for tests and local tooling: in-memory store, UTC, advisory gating.
    pub fn for_tests(jwt_secret: &str) -> Self {
        Self {
            database_url: None,
            jwt_secret: jwt_secret.to_string(),
            rust_log: "error".to_string(),
            port: 0,
            cors_origins: vec!["http://localhost:5173".to_string()],
            utc_offset: utc(),
            leaderboard_size: DEFAULT_LEADERBOARD_SIZE,
            enforce_session_window: false,
        }
    }
}

fn utc() -> FixedOffset {
    Utc.fix()
}
