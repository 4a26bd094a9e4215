// src/models/session.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::quiz_date::QuizDate;

/// Represents the 'daily_quiz_sessions' table: the live window of one daily quiz.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSession {
    #[serde(rename = "date")]
    pub quiz_date: QuizDate,
    /// Inclusive.
    pub start_at: DateTime<Utc>,
    /// Exclusive.
    pub end_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QuizSession {
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.start_at <= now && now < self.end_at
    }
}

#[derive(Debug, Clone)]
pub struct NewSession {
    pub quiz_date: QuizDate,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Response of the public session query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub date: QuizDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_at: Option<DateTime<Utc>>,
    pub now: DateTime<Utc>,
    pub is_live: bool,
}

/// DTO for the administrative session upsert.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpsertSessionRequest {
    #[validate(length(min = 1, message = "date is required."))]
    pub date: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}
