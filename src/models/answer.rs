// src/models/answer.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'student_answers' table.
/// One row per (student, topic, question); resubmissions overwrite it.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub id: i64,
    pub student_id: i64,
    /// Topic label, or the `YYYY-MM-DD` date for daily quiz answers.
    pub topic: String,
    pub question_id: String,
    pub question_text: String,
    pub selected_option: String,
    pub correct_answer: Option<String>,
    pub is_correct: bool,
    pub submitted_at: DateTime<Utc>,
}

/// Values written by an answer upsert.
#[derive(Debug, Clone)]
pub struct NewAnswer {
    pub student_id: i64,
    pub topic: String,
    pub question_id: String,
    pub question_text: String,
    pub selected_option: String,
    pub correct_answer: Option<String>,
    pub is_correct: bool,
    pub submitted_at: DateTime<Utc>,
}

/// One element of a batch submission.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    #[serde(default, deserialize_with = "string_or_number")]
    #[validate(length(min = 1, max = 200, message = "questionId is required."))]
    pub question_id: String,

    #[serde(default)]
    #[validate(length(max = 5000))]
    pub question_text: Option<String>,

    #[serde(default, deserialize_with = "text_or_number")]
    #[validate(length(min = 1, max = 1000, message = "selectedOption is required."))]
    pub selected_option: String,

    #[serde(default, deserialize_with = "optional_text_or_number")]
    #[validate(length(max = 1000))]
    pub correct_answer: Option<String>,
}

/// DTO for submitting a single answer outside of a batch.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerRequest {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "topic is required."))]
    pub topic: String,

    #[serde(flatten)]
    #[validate(nested)]
    pub answer: SubmittedAnswer,
}

#[derive(Debug, Deserialize)]
pub struct AnswerListParams {
    pub topic: Option<String>,
}

/// A JSON string or number, kept as text.
#[derive(Deserialize)]
#[serde(untagged)]
enum TextOrNumber {
    Text(String),
    Int(i64),
    Float(f64),
}

impl From<TextOrNumber> for String {
    fn from(raw: TextOrNumber) -> Self {
        match raw {
            TextOrNumber::Text(s) => s,
            TextOrNumber::Int(n) => n.to_string(),
            TextOrNumber::Float(n) => n.to_string(),
        }
    }
}

/// Accepts `"q1"` as well as `17` for identifiers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let id = String::from(TextOrNumber::deserialize(deserializer)?);
    Ok(id.trim().to_string())
}

/// Options are compared verbatim, so they are not trimmed.
fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    TextOrNumber::deserialize(deserializer).map(String::from)
}

fn optional_text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<TextOrNumber>::deserialize(deserializer).map(|raw| raw.map(String::from))
}
