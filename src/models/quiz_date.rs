// src/models/quiz_date.rs

use std::{fmt, str::FromStr};

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A calendar day identifying one daily quiz.
///
/// Serialized as `YYYY-MM-DD` and stored in a `DATE` column.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct QuizDate(NaiveDate);

impl QuizDate {
    pub const FORMAT: &'static str = "%Y-%m-%d";

    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// The calendar day `now` falls on in the reference timezone.
    pub fn on(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self(now.with_timezone(&offset).date_naive())
    }

    /// Parses an optional query/body parameter, falling back to `today`.
    pub fn parse_or(raw: Option<&str>, today: QuizDate) -> Result<Self, AppError> {
        match raw.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => s.parse(),
            None => Ok(today),
        }
    }

    /// Stable per-day key used to scope advisory locks.
    pub fn lock_key(&self) -> i32 {
        self.0.num_days_from_ce()
    }
}

impl FromStr for QuizDate {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, Self::FORMAT)
            .map(Self)
            .map_err(|_| AppError::BadRequest(format!("Invalid date '{}', expected YYYY-MM-DD", s)))
    }
}

impl fmt::Display for QuizDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}
