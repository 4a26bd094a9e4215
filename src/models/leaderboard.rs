// src/models/leaderboard.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use super::quiz_date::QuizDate;

/// Per-student sums over every daily attempt.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct StudentTotals {
    pub student_id: i64,
    pub total_points: i64,
    pub total_attempts: i64,
}

/// One row of the daily leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLeaderboardEntry {
    pub rank: u32,
    pub student_id: i64,
    pub name: String,
    pub username: String,
    pub score: i32,
    pub total: i32,
    pub time_taken: i32,
    pub points: i32,
    pub attempted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyLeaderboard {
    pub date: QuizDate,
    pub top: Vec<DailyLeaderboardEntry>,
}

/// One row of the all-time leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateEntry {
    pub rank: u32,
    pub student_id: i64,
    pub name: String,
    pub username: String,
    pub total_points: i64,
    pub total_attempts: i64,
}
