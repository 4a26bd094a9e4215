// src/handlers/leaderboard.rs

use axum::{
    Json,
    extract::State,
    response::IntoResponse,
};
use chrono::Utc;

use crate::{
    config::MAX_LEADERBOARD_SIZE,
    error::AppError,
    extractors::AppQuery,
    models::{attempt::LeaderboardParams, quiz_date::QuizDate},
    services::leaderboard,
    state::AppState,
};

/// Top attempts of one day. Public.
pub async fn daily_leaderboard(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<LeaderboardParams>,
) -> Result<impl IntoResponse, AppError> {
    let today = QuizDate::on(Utc::now(), state.config.utc_offset);
    let date = QuizDate::parse_or(params.date.as_deref(), today)?;
    let limit = params
        .limit
        .unwrap_or(state.config.leaderboard_size)
        .clamp(1, MAX_LEADERBOARD_SIZE);

    let board = leaderboard::top_n(
        state.store.as_ref(),
        state.directory.as_ref(),
        date,
        limit,
    )
    .await?;

    Ok(Json(board))
}

/// All-time points per student. Public.
pub async fn aggregate_leaderboard(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let entries = leaderboard::aggregate(state.store.as_ref(), state.directory.as_ref()).await?;

    Ok(Json(entries))
}
