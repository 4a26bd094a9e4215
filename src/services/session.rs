// src/services/session.rs

use chrono::{DateTime, Utc};

use crate::{
    db::QuizStore,
    error::{AppError, AppResult},
    models::{
        quiz_date::QuizDate,
        session::{NewSession, QuizSession, SessionStatus},
    },
};

/// Live-window status of `date` at `now`.
pub async fn session_status(
    store: &dyn QuizStore,
    date: QuizDate,
    now: DateTime<Utc>,
) -> AppResult<SessionStatus> {
    let session = store.find_session(date).await?;
    Ok(status_of(date, session.as_ref(), now))
}

pub fn status_of(date: QuizDate, session: Option<&QuizSession>, now: DateTime<Utc>) -> SessionStatus {
    SessionStatus {
        date,
        start_at: session.map(|s| s.start_at),
        end_at: session.map(|s| s.end_at),
        now,
        is_live: session.is_some_and(|s| s.is_live_at(now)),
    }
}

/// Creates or replaces the window of `date`. Empty or inverted windows are rejected.
pub async fn upsert_session(
    store: &dyn QuizStore,
    date: QuizDate,
    start_at: DateTime<Utc>,
    end_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> AppResult<QuizSession> {
    if start_at >= end_at {
        return Err(AppError::BadRequest(
            "startAt must be before endAt".to_string(),
        ));
    }

    let session = store
        .upsert_session(&NewSession {
            quiz_date: date,
            start_at,
            end_at,
            updated_at: now,
        })
        .await?;

    tracing::info!(
        "Daily quiz session for {} set to [{}, {})",
        date,
        session.start_at,
        session.end_at
    );

    Ok(session)
}

/// Gate for daily submissions when window enforcement is switched on.
/// Dates without a configured session are not gated.
pub async fn ensure_open(store: &dyn QuizStore, date: QuizDate, now: DateTime<Utc>) -> AppResult<()> {
    match store.find_session(date).await? {
        Some(session) if !session.is_live_at(now) => Err(AppError::Forbidden(format!(
            "The daily quiz for {} is not live",
            date
        ))),
        _ => Ok(()),
    }
}
