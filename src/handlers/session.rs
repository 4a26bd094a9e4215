// src/handlers/session.rs

use axum::{
    Json,
    extract::State,
    response::IntoResponse,
};
use chrono::Utc;

use crate::{
    error::AppError,
    extractors::{AppQuery, ValidatedJson},
    models::{attempt::DateParams, quiz_date::QuizDate, session::UpsertSessionRequest},
    services::session,
    state::AppState,
};

/// Live-window status of a day's quiz. Public.
pub async fn get_session(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<DateParams>,
) -> Result<impl IntoResponse, AppError> {
    let now = Utc::now();
    let today = QuizDate::on(now, state.config.utc_offset);
    let date = QuizDate::parse_or(params.date.as_deref(), today)?;

    let status = session::session_status(state.store.as_ref(), date, now).await?;

    Ok(Json(status))
}

/// Creates or replaces a day's live window.
/// Admin only.
pub async fn upsert_session(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<UpsertSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let date: QuizDate = req.date.trim().parse()?;

    let saved = session::upsert_session(
        state.store.as_ref(),
        date,
        req.start_at,
        req.end_at,
        Utc::now(),
    )
    .await?;

    Ok(Json(saved))
}
