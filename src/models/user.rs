// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Name shown for students the directory does not know.
pub const UNKNOWN_NAME: &str = "Unknown";
pub const UNKNOWN_USERNAME: &str = "unknown";

/// A row of the externally managed 'users' table, as far as this service reads it.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct DirectoryUser {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    /// 'student', 'instructor' or 'admin'.
    pub role: String,
    pub is_approved: bool,
}

impl DirectoryUser {
    pub fn identity(&self) -> UserIdentity {
        UserIdentity {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            username: self.username.clone(),
        }
    }
}

/// Display data joined into leaderboards.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct UserIdentity {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
}

impl UserIdentity {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Display pair for an optional identity.
pub fn display_fields(identity: Option<&UserIdentity>) -> (String, String) {
    match identity {
        Some(identity) => (identity.display_name(), identity.username.clone()),
        None => (UNKNOWN_NAME.to_string(), UNKNOWN_USERNAME.to_string()),
    }
}

/// The authenticated caller, injected into request extensions by the auth middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
    pub role: String,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}
