// src/db/mod.rs

//! Storage for answers, attempts and sessions, plus the user directory the
//! leaderboards and the auth middleware read from.

pub mod memory;
pub mod postgres;

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;

use crate::{
    error::AppResult,
    models::{
        answer::{AnswerRecord, NewAnswer},
        attempt::{DailyAttempt, DailyInsert, NewDailyAttempt, NewTopicAttempt, TopicAttempt},
        leaderboard::StudentTotals,
        quiz_date::QuizDate,
        session::{NewSession, QuizSession},
        user::{DirectoryUser, UserIdentity},
    },
};

pub use memory::{MemoryDirectory, MemoryStore};
pub use postgres::PgStore;

pub type SharedStore = Arc<dyn QuizStore>;
pub type SharedDirectory = Arc<dyn UserDirectory>;

#[async_trait]
pub trait QuizStore: Send + Sync {
    /// Creates or overwrites the answer keyed by (student, topic, question).
    async fn upsert_answer(&self, answer: &NewAnswer) -> AppResult<AnswerRecord>;

    /// A student's answers, newest first, optionally limited to one topic.
    async fn list_answers(&self, student_id: i64, topic: Option<&str>)
    -> AppResult<Vec<AnswerRecord>>;

    async fn insert_topic_attempt(&self, attempt: &NewTopicAttempt) -> AppResult<TopicAttempt>;

    /// A student's topic attempts, newest first.
    async fn list_topic_attempts(&self, student_id: i64) -> AppResult<Vec<TopicAttempt>>;

    async fn find_daily_attempt(
        &self,
        student_id: i64,
        date: QuizDate,
    ) -> AppResult<Option<DailyAttempt>>;

    /// Inserts unless (student, date) already exists; the store's uniqueness
    /// constraint decides, not a prior read.
    async fn insert_daily_attempt(&self, attempt: &NewDailyAttempt) -> AppResult<DailyInsert>;

    /// Re-ranks every attempt of `date` and persists their points.
    /// Runs serialized per date. Returns the attempts in leaderboard order.
    async fn rerank_daily(&self, date: QuizDate) -> AppResult<Vec<DailyAttempt>>;

    /// All attempts of `date`, unordered.
    async fn list_daily_attempts(&self, date: QuizDate) -> AppResult<Vec<DailyAttempt>>;

    /// Points and attempt counts per student across every date,
    /// highest total first (ties by student id).
    async fn daily_totals(&self) -> AppResult<Vec<StudentTotals>>;

    async fn find_session(&self, date: QuizDate) -> AppResult<Option<QuizSession>>;

    /// Create-or-replace keyed by date.
    async fn upsert_session(&self, session: &NewSession) -> AppResult<QuizSession>;
}

/// Read access to the externally managed user accounts.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, user_id: i64) -> AppResult<Option<DirectoryUser>>;

    /// Display identities for the given ids; unknown ids are simply absent.
    async fn identities(&self, user_ids: &[i64]) -> AppResult<HashMap<i64, UserIdentity>>;
}
