// src/services/submission.rs

use chrono::{DateTime, Utc};

use crate::{
    db::QuizStore,
    error::{AppError, AppResult},
    models::{
        answer::{AnswerRecord, NewAnswer, SubmitAnswerRequest, SubmittedAnswer},
        attempt::{
            AttemptRecord, CreateAttemptRequest, DailyAttempt, DailyInsert, NewDailyAttempt,
            NewTopicAttempt, QuizKind, TopicAttempt,
        },
    },
    services::{scoring, session},
    utils::html::clean_html,
};

/// A validated batch, ready to be applied.
#[derive(Debug, Clone)]
pub struct BatchSubmission {
    pub student_id: i64,
    pub kind: QuizKind,
    pub answers: Vec<SubmittedAnswer>,
    pub time_taken: i32,
    pub submitted_at: DateTime<Utc>,
    /// Reject daily submissions outside the date's live window.
    pub enforce_session_window: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Recorded {
        attempt: AttemptRecord,
        saved_answers: Vec<AnswerRecord>,
    },
    /// The student already has a daily attempt for the date; nothing was written.
    AlreadySubmitted(DailyAttempt),
}

/// Scores a batch, stores its answers and attempt, and re-ranks the date for
/// daily quizzes.
///
/// * Daily duplicates are detected before any answer is written, and before
///   the live-window gate, so a retry after closing still reports the stored attempt.
/// * Answers are upserted one by one; each upsert is idempotent on its own.
/// * The attempt's score is derived from the saved answers.
pub async fn submit_batch(
    store: &dyn QuizStore,
    submission: BatchSubmission,
) -> AppResult<SubmitOutcome> {
    if submission.answers.is_empty() {
        return Err(AppError::BadRequest(
            "answers must be a non-empty array".to_string(),
        ));
    }

    let student_id = submission.student_id;

    if let QuizKind::Daily(date) = submission.kind {
        if let Some(existing) = store.find_daily_attempt(student_id, date).await? {
            tracing::info!(
                "Student {} already attempted the daily quiz of {}",
                student_id,
                date
            );
            return Ok(SubmitOutcome::AlreadySubmitted(existing));
        }

        if submission.enforce_session_window {
            session::ensure_open(store, date, submission.submitted_at).await?;
        }
    }

    let answer_key = submission.kind.answer_key();
    let summary = scoring::score(&submission.answers);

    let mut saved_answers = Vec::with_capacity(submission.answers.len());
    for (answer, is_correct) in submission.answers.iter().zip(summary.per_answer) {
        let new = new_answer(
            student_id,
            &answer_key,
            answer,
            is_correct,
            submission.submitted_at,
        );
        saved_answers.push(store.upsert_answer(&new).await?);
    }

    let totals = scoring::tally(&saved_answers);

    let attempt = match submission.kind {
        QuizKind::Topic(topic) => {
            let attempt = store
                .insert_topic_attempt(&NewTopicAttempt {
                    student_id,
                    topic,
                    score: totals.score,
                    total: totals.total,
                    time_taken: submission.time_taken,
                    attempted_at: submission.submitted_at,
                })
                .await?;
            AttemptRecord::Topic(attempt)
        }
        QuizKind::Daily(date) => {
            let inserted = store
                .insert_daily_attempt(&NewDailyAttempt {
                    student_id,
                    quiz_date: date,
                    score: totals.score,
                    total: totals.total,
                    time_taken: submission.time_taken,
                    attempted_at: submission.submitted_at,
                })
                .await?;

            let created = match inserted {
                DailyInsert::Created(created) => created,
                DailyInsert::Existing(existing) => {
                    tracing::warn!(
                        "Concurrent daily submission for student {} on {} rejected by constraint",
                        student_id,
                        date
                    );
                    return Ok(SubmitOutcome::AlreadySubmitted(existing));
                }
            };

            let ranked = store.rerank_daily(date).await?;
            tracing::info!("Re-ranked {} daily attempts for {}", ranked.len(), date);

            let attempt = ranked
                .into_iter()
                .find(|a| a.id == created.id)
                .ok_or_else(|| {
                    AppError::InternalServerError(format!(
                        "daily attempt {} missing after re-ranking {}",
                        created.id, date
                    ))
                })?;
            AttemptRecord::Daily(attempt)
        }
    };

    Ok(SubmitOutcome::Recorded {
        attempt,
        saved_answers,
    })
}

/// Upserts one answer outside of a batch.
pub async fn submit_answer(
    store: &dyn QuizStore,
    student_id: i64,
    request: &SubmitAnswerRequest,
    submitted_at: DateTime<Utc>,
) -> AppResult<AnswerRecord> {
    let answer = &request.answer;
    let is_correct = scoring::is_correct(&answer.selected_option, answer.correct_answer.as_deref());
    let new = new_answer(
        student_id,
        request.topic.trim(),
        answer,
        is_correct,
        submitted_at,
    );

    store.upsert_answer(&new).await
}

/// Records an attempt whose score was computed by the client.
pub async fn record_attempt(
    store: &dyn QuizStore,
    student_id: i64,
    request: &CreateAttemptRequest,
    attempted_at: DateTime<Utc>,
) -> AppResult<TopicAttempt> {
    if request.score > request.total {
        return Err(AppError::BadRequest(
            "score cannot exceed total".to_string(),
        ));
    }

    store
        .insert_topic_attempt(&NewTopicAttempt {
            student_id,
            topic: request.topic.trim().to_string(),
            score: request.score,
            total: request.total,
            time_taken: request.time_taken,
            attempted_at,
        })
        .await
}

fn new_answer(
    student_id: i64,
    topic: &str,
    answer: &SubmittedAnswer,
    is_correct: bool,
    submitted_at: DateTime<Utc>,
) -> NewAnswer {
    NewAnswer {
        student_id,
        topic: topic.to_string(),
        question_id: answer.question_id.clone(),
        question_text: answer
            .question_text
            .as_deref()
            .map(clean_html)
            .unwrap_or_default(),
        selected_option: answer.selected_option.clone(),
        correct_answer: answer
            .correct_answer
            .clone()
            .filter(|c| !c.is_empty()),
        is_correct,
        submitted_at,
    }
}
