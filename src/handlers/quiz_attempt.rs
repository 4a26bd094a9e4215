// src/handlers/quiz_attempt.rs

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::json;

use crate::{
    db::SharedStore,
    error::AppError,
    extractors::{AppQuery, ValidatedJson},
    models::{
        attempt::{
            CreateAttemptRequest, DateParams, QuizKind, SubmitBatchRequest, coerce_seconds,
            is_daily_topic,
        },
        quiz_date::QuizDate,
        user::CurrentUser,
    },
    services::{
        leaderboard,
        submission::{self, BatchSubmission, SubmitOutcome},
    },
    state::AppState,
};

/// Submits a batch of answers for a topic quiz or the daily quiz.
///
/// * 201 `{attempt, savedAnswers}` when recorded.
/// * 409 `{message, attempt}` when the caller already took that day's quiz.
pub async fn submit_batch(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(req): ValidatedJson<SubmitBatchRequest>,
) -> Result<Response, AppError> {
    let now = Utc::now();
    let today = QuizDate::on(now, state.config.utc_offset);

    let date = if is_daily_topic(req.topic.as_deref()) {
        QuizDate::parse_or(req.date.as_deref(), today)?
    } else {
        today
    };
    let kind = QuizKind::classify(req.topic.as_deref(), date);

    let outcome = submission::submit_batch(
        state.store.as_ref(),
        BatchSubmission {
            student_id: user.id,
            kind,
            answers: req.answers,
            time_taken: coerce_seconds(req.time_taken.as_ref()),
            submitted_at: now,
            enforce_session_window: state.config.enforce_session_window,
        },
    )
    .await?;

    let response = match outcome {
        SubmitOutcome::Recorded {
            attempt,
            saved_answers,
        } => (
            StatusCode::CREATED,
            Json(json!({
                "attempt": attempt,
                "savedAnswers": saved_answers,
            })),
        )
            .into_response(),
        SubmitOutcome::AlreadySubmitted(existing) => (
            StatusCode::CONFLICT,
            Json(json!({
                "message": "You have already attempted this daily quiz",
                "attempt": existing,
            })),
        )
            .into_response(),
    };

    Ok(response)
}

/// Records a topic attempt scored by the client.
pub async fn create_attempt(
    State(store): State<SharedStore>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(req): ValidatedJson<CreateAttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    let attempt = submission::record_attempt(store.as_ref(), user.id, &req, Utc::now()).await?;

    Ok((StatusCode::CREATED, Json(attempt)))
}

/// Lists the caller's topic attempts, newest first.
pub async fn list_my_attempts(
    State(store): State<SharedStore>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let attempts = store.list_topic_attempts(user.id).await?;

    Ok(Json(attempts))
}

/// The caller's daily attempt for `?date=` (today by default).
pub async fn my_daily_attempt(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    AppQuery(params): AppQuery<DateParams>,
) -> Result<impl IntoResponse, AppError> {
    let today = QuizDate::on(Utc::now(), state.config.utc_offset);
    let date = QuizDate::parse_or(params.date.as_deref(), today)?;

    let attempt = leaderboard::my_daily_attempt(state.store.as_ref(), user.id, date)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No daily quiz attempt found for {}", date)))?;

    Ok(Json(attempt))
}
