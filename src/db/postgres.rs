// src/db/postgres.rs

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;

use super::{QuizStore, UserDirectory};
use crate::{
    error::{AppError, AppResult},
    models::{
        answer::{AnswerRecord, NewAnswer},
        attempt::{DailyAttempt, DailyInsert, NewDailyAttempt, NewTopicAttempt, TopicAttempt},
        leaderboard::StudentTotals,
        quiz_date::QuizDate,
        session::{NewSession, QuizSession},
        user::{DirectoryUser, UserIdentity},
    },
    services::ranking,
};

/// First key of the two-key advisory lock taken while re-ranking a date.
const RERANK_LOCK_NAMESPACE: i32 = 0x5155_495A;

const ANSWER_COLUMNS: &str = "id, student_id, topic, question_id, question_text, \
     selected_option, correct_answer, is_correct, submitted_at";

const TOPIC_ATTEMPT_COLUMNS: &str = "id, student_id, topic, score, total, time_taken, attempted_at";

const DAILY_ATTEMPT_COLUMNS: &str =
    "id, student_id, quiz_date, score, total, time_taken, points, attempted_at";

/// Postgres-backed store. Cloning shares the pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QuizStore for PgStore {
    async fn upsert_answer(&self, answer: &NewAnswer) -> AppResult<AnswerRecord> {
        let sql = format!(
            r#"
            INSERT INTO student_answers
                (student_id, topic, question_id, question_text, selected_option,
                 correct_answer, is_correct, submitted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (student_id, topic, question_id) DO UPDATE SET
                question_text = EXCLUDED.question_text,
                selected_option = EXCLUDED.selected_option,
                correct_answer = EXCLUDED.correct_answer,
                is_correct = EXCLUDED.is_correct,
                submitted_at = EXCLUDED.submitted_at
            RETURNING {ANSWER_COLUMNS}
            "#
        );

        sqlx::query_as::<_, AnswerRecord>(&sql)
            .bind(answer.student_id)
            .bind(&answer.topic)
            .bind(&answer.question_id)
            .bind(&answer.question_text)
            .bind(&answer.selected_option)
            .bind(&answer.correct_answer)
            .bind(answer.is_correct)
            .bind(answer.submitted_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to upsert answer: {:?}", e);
                AppError::from(e)
            })
    }

    async fn list_answers(
        &self,
        student_id: i64,
        topic: Option<&str>,
    ) -> AppResult<Vec<AnswerRecord>> {
        let sql = format!(
            r#"
            SELECT {ANSWER_COLUMNS}
            FROM student_answers
            WHERE student_id = $1 AND ($2::TEXT IS NULL OR topic = $2)
            ORDER BY submitted_at DESC, id DESC
            "#
        );

        let answers = sqlx::query_as::<_, AnswerRecord>(&sql)
            .bind(student_id)
            .bind(topic)
            .fetch_all(&self.pool)
            .await?;

        Ok(answers)
    }

    async fn insert_topic_attempt(&self, attempt: &NewTopicAttempt) -> AppResult<TopicAttempt> {
        let sql = format!(
            r#"
            INSERT INTO quiz_attempts (student_id, topic, score, total, time_taken, attempted_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {TOPIC_ATTEMPT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, TopicAttempt>(&sql)
            .bind(attempt.student_id)
            .bind(&attempt.topic)
            .bind(attempt.score)
            .bind(attempt.total)
            .bind(attempt.time_taken)
            .bind(attempt.attempted_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert topic attempt: {:?}", e);
                AppError::from(e)
            })
    }

    async fn list_topic_attempts(&self, student_id: i64) -> AppResult<Vec<TopicAttempt>> {
        let sql = format!(
            r#"
            SELECT {TOPIC_ATTEMPT_COLUMNS}
            FROM quiz_attempts
            WHERE student_id = $1
            ORDER BY attempted_at DESC, id DESC
            "#
        );

        let attempts = sqlx::query_as::<_, TopicAttempt>(&sql)
            .bind(student_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(attempts)
    }

    async fn find_daily_attempt(
        &self,
        student_id: i64,
        date: QuizDate,
    ) -> AppResult<Option<DailyAttempt>> {
        let sql = format!(
            "SELECT {DAILY_ATTEMPT_COLUMNS} FROM daily_quiz_attempts \
             WHERE student_id = $1 AND quiz_date = $2"
        );

        let attempt = sqlx::query_as::<_, DailyAttempt>(&sql)
            .bind(student_id)
            .bind(date)
            .fetch_optional(&self.pool)
            .await?;

        Ok(attempt)
    }

    async fn insert_daily_attempt(&self, attempt: &NewDailyAttempt) -> AppResult<DailyInsert> {
        let sql = format!(
            r#"
            INSERT INTO daily_quiz_attempts
                (student_id, quiz_date, score, total, time_taken, attempted_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (student_id, quiz_date) DO NOTHING
            RETURNING {DAILY_ATTEMPT_COLUMNS}
            "#
        );

        let created = sqlx::query_as::<_, DailyAttempt>(&sql)
            .bind(attempt.student_id)
            .bind(attempt.quiz_date)
            .bind(attempt.score)
            .bind(attempt.total)
            .bind(attempt.time_taken)
            .bind(attempt.attempted_at)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert daily attempt: {:?}", e);
                AppError::from(e)
            })?;

        if let Some(created) = created {
            return Ok(DailyInsert::Created(created));
        }

        // Lost the race against a concurrent insert for the same slot.
        self.find_daily_attempt(attempt.student_id, attempt.quiz_date)
            .await?
            .map(DailyInsert::Existing)
            .ok_or_else(|| {
                AppError::InternalServerError(format!(
                    "daily attempt for student {} on {} vanished after conflict",
                    attempt.student_id, attempt.quiz_date
                ))
            })
    }

    async fn rerank_daily(&self, date: QuizDate) -> AppResult<Vec<DailyAttempt>> {
        let mut tx = self.pool.begin().await?;

        // Held until commit/rollback; serializes recomputation of one date across instances.
        sqlx::query("SELECT pg_advisory_xact_lock($1, $2)")
            .bind(RERANK_LOCK_NAMESPACE)
            .bind(date.lock_key())
            .execute(&mut *tx)
            .await?;

        let sql = format!(
            "SELECT {DAILY_ATTEMPT_COLUMNS} FROM daily_quiz_attempts \
             WHERE quiz_date = $1 FOR UPDATE"
        );
        let mut attempts = sqlx::query_as::<_, DailyAttempt>(&sql)
            .bind(date)
            .fetch_all(&mut *tx)
            .await?;

        ranking::assign_points(&mut attempts);

        let ids: Vec<i64> = attempts.iter().map(|a| a.id).collect();
        let points: Vec<i32> = attempts.iter().map(|a| a.points).collect();

        sqlx::query(
            r#"
            UPDATE daily_quiz_attempts AS d
            SET points = u.points
            FROM UNNEST($1::BIGINT[], $2::INTEGER[]) AS u(id, points)
            WHERE d.id = u.id
            "#,
        )
        .bind(&ids)
        .bind(&points)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to persist points for {}: {:?}", date, e);
            AppError::from(e)
        })?;

        tx.commit().await?;

        Ok(attempts)
    }

    async fn list_daily_attempts(&self, date: QuizDate) -> AppResult<Vec<DailyAttempt>> {
        let sql = format!("SELECT {DAILY_ATTEMPT_COLUMNS} FROM daily_quiz_attempts WHERE quiz_date = $1");

        let attempts = sqlx::query_as::<_, DailyAttempt>(&sql)
            .bind(date)
            .fetch_all(&self.pool)
            .await?;

        Ok(attempts)
    }

    async fn daily_totals(&self) -> AppResult<Vec<StudentTotals>> {
        let totals = sqlx::query_as::<_, StudentTotals>(
            r#"
            SELECT
                student_id,
                COALESCE(SUM(points), 0)::BIGINT AS total_points,
                COUNT(*) AS total_attempts
            FROM daily_quiz_attempts
            GROUP BY student_id
            ORDER BY total_points DESC, student_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(totals)
    }

    async fn find_session(&self, date: QuizDate) -> AppResult<Option<QuizSession>> {
        let session = sqlx::query_as::<_, QuizSession>(
            "SELECT quiz_date, start_at, end_at, updated_at FROM daily_quiz_sessions WHERE quiz_date = $1",
        )
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    async fn upsert_session(&self, session: &NewSession) -> AppResult<QuizSession> {
        sqlx::query_as::<_, QuizSession>(
            r#"
            INSERT INTO daily_quiz_sessions (quiz_date, start_at, end_at, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (quiz_date) DO UPDATE SET
                start_at = EXCLUDED.start_at,
                end_at = EXCLUDED.end_at,
                updated_at = EXCLUDED.updated_at
            RETURNING quiz_date, start_at, end_at, updated_at
            "#,
        )
        .bind(session.quiz_date)
        .bind(session.start_at)
        .bind(session.end_at)
        .bind(session.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to upsert session: {:?}", e);
            AppError::from(e)
        })
    }
}

#[async_trait]
impl UserDirectory for PgStore {
    async fn find_user(&self, user_id: i64) -> AppResult<Option<DirectoryUser>> {
        let user = sqlx::query_as::<_, DirectoryUser>(
            r#"
            SELECT id, first_name, last_name, username, role, is_approved
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn identities(&self, user_ids: &[i64]) -> AppResult<HashMap<i64, UserIdentity>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        #[derive(sqlx::FromRow)]
        struct IdentityRow {
            id: i64,
            #[sqlx(flatten)]
            identity: UserIdentity,
        }

        let rows = sqlx::query_as::<_, IdentityRow>(
            "SELECT id, first_name, last_name, username FROM users WHERE id = ANY($1)",
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| (r.id, r.identity)).collect())
    }
}
