// src/models/attempt.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::{answer::SubmittedAnswer, quiz_date::QuizDate};

/// Reserved topic value selecting the daily quiz.
pub const DAILY_TOPIC: &str = "daily";

/// Represents the 'quiz_attempts' table: ad-hoc topic quizzes.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicAttempt {
    pub id: i64,
    pub student_id: i64,
    pub topic: String,
    pub score: i32,
    pub total: i32,
    pub time_taken: i32,
    pub attempted_at: DateTime<Utc>,
}

/// Represents the 'daily_quiz_attempts' table.
/// Unique per (student, date); `points` is owned by rank recomputation.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAttempt {
    pub id: i64,
    pub student_id: i64,
    #[serde(rename = "date")]
    pub quiz_date: QuizDate,
    pub score: i32,
    pub total: i32,
    pub time_taken: i32,
    pub points: i32,
    pub attempted_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTopicAttempt {
    pub student_id: i64,
    pub topic: String,
    pub score: i32,
    pub total: i32,
    pub time_taken: i32,
    pub attempted_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewDailyAttempt {
    pub student_id: i64,
    pub quiz_date: QuizDate,
    pub score: i32,
    pub total: i32,
    pub time_taken: i32,
    pub attempted_at: DateTime<Utc>,
}

/// Result of the conditional daily insert.
#[derive(Debug, Clone, PartialEq)]
pub enum DailyInsert {
    Created(DailyAttempt),
    /// The (student, date) slot was already taken; carries the stored row.
    Existing(DailyAttempt),
}

/// Which quiz a submission belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizKind {
    Topic(String),
    Daily(QuizDate),
}

/// Missing, empty or `daily` topics select the daily quiz.
pub fn is_daily_topic(topic: Option<&str>) -> bool {
    matches!(topic.map(str::trim), None | Some("") | Some(DAILY_TOPIC))
}

impl QuizKind {
    pub fn classify(topic: Option<&str>, date: QuizDate) -> Self {
        match topic {
            Some(topic) if !is_daily_topic(Some(topic)) => QuizKind::Topic(topic.trim().to_string()),
            _ => QuizKind::Daily(date),
        }
    }

    /// Key under which answers of this quiz are stored.
    pub fn answer_key(&self) -> String {
        match self {
            QuizKind::Topic(topic) => topic.clone(),
            QuizKind::Daily(date) => date.to_string(),
        }
    }
}

/// Either kind of stored attempt, as returned by a submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttemptRecord {
    Topic(TopicAttempt),
    Daily(DailyAttempt),
}

/// DTO for batch submission.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitBatchRequest {
    #[validate(length(max = 200))]
    pub topic: Option<String>,

    #[serde(default)]
    #[validate(length(min = 1, message = "answers must be a non-empty array."), nested)]
    pub answers: Vec<SubmittedAnswer>,

    /// Seconds; anything that is not a usable number counts as 0.
    #[serde(default)]
    pub time_taken: Option<serde_json::Value>,

    pub date: Option<String>,
}

/// DTO for recording a precomputed topic attempt.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAttemptRequest {
    #[validate(
        length(min = 1, max = 200, message = "topic is required."),
        custom(function = validate_not_daily)
    )]
    pub topic: String,
    #[validate(range(min = 0))]
    pub score: i32,
    #[validate(range(min = 0))]
    pub total: i32,
    #[validate(range(min = 0))]
    pub time_taken: i32,
}

#[derive(Debug, Deserialize)]
pub struct DateParams {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardParams {
    pub date: Option<String>,
    pub limit: Option<usize>,
}

fn validate_not_daily(topic: &str) -> Result<(), validator::ValidationError> {
    if topic.trim() == DAILY_TOPIC {
        return Err(validator::ValidationError::new("topic_reserved_for_daily_quiz"));
    }
    Ok(())
}

/// Coerces a loosely typed duration into whole, non-negative seconds.
pub fn coerce_seconds(raw: Option<&serde_json::Value>) -> i32 {
    let seconds = match raw {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match seconds {
        Some(s) if s.is_finite() && s > 0.0 => s.round().min(i32::MAX as f64) as i32,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date() -> QuizDate {
        "2025-05-01".parse().unwrap()
    }

    #[test]
    fn classify_daily_sentinels() {
        assert_eq!(QuizKind::classify(None, date()), QuizKind::Daily(date()));
        assert_eq!(QuizKind::classify(Some(""), date()), QuizKind::Daily(date()));
        assert_eq!(QuizKind::classify(Some("daily"), date()), QuizKind::Daily(date()));
        assert_eq!(
            QuizKind::classify(Some("closures"), date()),
            QuizKind::Topic("closures".to_string())
        );
    }

    #[test]
    fn daily_answers_are_keyed_by_date() {
        assert_eq!(QuizKind::Daily(date()).answer_key(), "2025-05-01");
        assert_eq!(QuizKind::Topic("css".into()).answer_key(), "css");
    }

    #[test]
    fn time_taken_coercion() {
        assert_eq!(coerce_seconds(Some(&json!(42))), 42);
        assert_eq!(coerce_seconds(Some(&json!(41.6))), 42);
        assert_eq!(coerce_seconds(Some(&json!("17"))), 17);
        assert_eq!(coerce_seconds(Some(&json!("soon"))), 0);
        assert_eq!(coerce_seconds(Some(&json!(-5))), 0);
        assert_eq!(coerce_seconds(Some(&json!(null))), 0);
        assert_eq!(coerce_seconds(None), 0);
    }

    #[test]
    fn empty_batches_fail_validation() {
        let req: SubmitBatchRequest = serde_json::from_value(json!({"answers": []})).unwrap();
        assert!(req.validate().is_err());

        let req: SubmitBatchRequest = serde_json::from_value(json!({})).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn reserved_topic_rejected_for_plain_attempts() {
        let req = CreateAttemptRequest {
            topic: "daily".into(),
            score: 1,
            total: 2,
            time_taken: 3,
        };
        assert!(req.validate().is_err());
    }
}
