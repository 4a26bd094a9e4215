// src/handlers/quiz_answer.rs

use axum::{
    Extension, Json,
    extract::State,
    response::IntoResponse,
};
use chrono::Utc;

use crate::{
    db::SharedStore,
    error::AppError,
    extractors::{AppQuery, ValidatedJson},
    models::{
        answer::{AnswerListParams, SubmitAnswerRequest},
        user::CurrentUser,
    },
    services::submission,
};

/// Saves one answer; resubmitting the same question overwrites it.
pub async fn submit_answer(
    State(store): State<SharedStore>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(req): ValidatedJson<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let answer = submission::submit_answer(store.as_ref(), user.id, &req, Utc::now()).await?;

    Ok(Json(answer))
}

/// Lists the caller's answers, optionally for one topic.
pub async fn list_my_answers(
    State(store): State<SharedStore>,
    Extension(user): Extension<CurrentUser>,
    AppQuery(params): AppQuery<AnswerListParams>,
) -> Result<impl IntoResponse, AppError> {
    let topic = params
        .topic
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let answers = store.list_answers(user.id, topic).await?;

    Ok(Json(answers))
}
