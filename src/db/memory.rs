// src/db/memory.rs

//! In-memory store, used by tests and when no database is configured.
//! Uniqueness rules mirror the Postgres constraints.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use super::{QuizStore, UserDirectory};
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
    services::ranking,
};

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    answers: HashMap<(i64, String, String), AnswerRecord>,
    topic_attempts: Vec<TopicAttempt>,
    daily_attempts: BTreeMap<(QuizDate, i64), DailyAttempt>,
    sessions: HashMap<QuizDate, QuizSession>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// A single lock guards every table, so each operation is atomic and
/// re-ranking is naturally serialized.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuizStore for MemoryStore {
    async fn upsert_answer(&self, answer: &NewAnswer) -> AppResult<AnswerRecord> {
        let mut tables = self.tables.lock().await;
        let key = (
            answer.student_id,
            answer.topic.clone(),
            answer.question_id.clone(),
        );

        let id = match tables.answers.get(&key) {
            Some(existing) => existing.id,
            None => tables.next_id(),
        };

        let record = AnswerRecord {
            id,
            student_id: answer.student_id,
            topic: answer.topic.clone(),
            question_id: answer.question_id.clone(),
            question_text: answer.question_text.clone(),
            selected_option: answer.selected_option.clone(),
            correct_answer: answer.correct_answer.clone(),
            is_correct: answer.is_correct,
            submitted_at: answer.submitted_at,
        };
        tables.answers.insert(key, record.clone());

        Ok(record)
    }

    async fn list_answers(
        &self,
        student_id: i64,
        topic: Option<&str>,
    ) -> AppResult<Vec<AnswerRecord>> {
        let tables = self.tables.lock().await;
        let mut answers: Vec<AnswerRecord> = tables
            .answers
            .values()
            .filter(|a| a.student_id == student_id)
            .filter(|a| topic.is_none_or(|t| a.topic == t))
            .cloned()
            .collect();

        answers.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at).then(b.id.cmp(&a.id)));
        Ok(answers)
    }

    async fn insert_topic_attempt(&self, attempt: &NewTopicAttempt) -> AppResult<TopicAttempt> {
        let mut tables = self.tables.lock().await;
        let record = TopicAttempt {
            id: tables.next_id(),
            student_id: attempt.student_id,
            topic: attempt.topic.clone(),
            score: attempt.score,
            total: attempt.total,
            time_taken: attempt.time_taken,
            attempted_at: attempt.attempted_at,
        };
        tables.topic_attempts.push(record.clone());

        Ok(record)
    }

    async fn list_topic_attempts(&self, student_id: i64) -> AppResult<Vec<TopicAttempt>> {
        let tables = self.tables.lock().await;
        let mut attempts: Vec<TopicAttempt> = tables
            .topic_attempts
            .iter()
            .filter(|a| a.student_id == student_id)
            .cloned()
            .collect();

        attempts.sort_by(|a, b| b.attempted_at.cmp(&a.attempted_at).then(b.id.cmp(&a.id)));
        Ok(attempts)
    }

    async fn find_daily_attempt(
        &self,
        student_id: i64,
        date: QuizDate,
    ) -> AppResult<Option<DailyAttempt>> {
        let tables = self.tables.lock().await;
        Ok(tables.daily_attempts.get(&(date, student_id)).cloned())
    }

    async fn insert_daily_attempt(&self, attempt: &NewDailyAttempt) -> AppResult<DailyInsert> {
        let mut tables = self.tables.lock().await;
        let key = (attempt.quiz_date, attempt.student_id);

        if let Some(existing) = tables.daily_attempts.get(&key) {
            return Ok(DailyInsert::Existing(existing.clone()));
        }

        let record = DailyAttempt {
            id: tables.next_id(),
            student_id: attempt.student_id,
            quiz_date: attempt.quiz_date,
            score: attempt.score,
            total: attempt.total,
            time_taken: attempt.time_taken,
            points: 0,
            attempted_at: attempt.attempted_at,
        };
        tables.daily_attempts.insert(key, record.clone());

        Ok(DailyInsert::Created(record))
    }

    async fn rerank_daily(&self, date: QuizDate) -> AppResult<Vec<DailyAttempt>> {
        let mut tables = self.tables.lock().await;

        let mut attempts: Vec<DailyAttempt> = tables
            .daily_attempts
            .range((date, i64::MIN)..=(date, i64::MAX))
            .map(|(_, a)| a.clone())
            .collect();

        ranking::assign_points(&mut attempts);

        for attempt in &attempts {
            tables
                .daily_attempts
                .insert((date, attempt.student_id), attempt.clone());
        }

        Ok(attempts)
    }

    async fn list_daily_attempts(&self, date: QuizDate) -> AppResult<Vec<DailyAttempt>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .daily_attempts
            .range((date, i64::MIN)..=(date, i64::MAX))
            .map(|(_, a)| a.clone())
            .collect())
    }

    async fn daily_totals(&self) -> AppResult<Vec<StudentTotals>> {
        let tables = self.tables.lock().await;

        let mut by_student: BTreeMap<i64, StudentTotals> = BTreeMap::new();
        for attempt in tables.daily_attempts.values() {
            let totals = by_student
                .entry(attempt.student_id)
                .or_insert_with(|| StudentTotals {
                    student_id: attempt.student_id,
                    total_points: 0,
                    total_attempts: 0,
                });
            totals.total_points += i64::from(attempt.points);
            totals.total_attempts += 1;
        }

        let mut totals: Vec<StudentTotals> = by_student.into_values().collect();
        totals.sort_by(|a, b| {
            b.total_points
                .cmp(&a.total_points)
                .then(a.student_id.cmp(&b.student_id))
        });
        Ok(totals)
    }

    async fn find_session(&self, date: QuizDate) -> AppResult<Option<QuizSession>> {
        let tables = self.tables.lock().await;
        Ok(tables.sessions.get(&date).cloned())
    }

    async fn upsert_session(&self, session: &NewSession) -> AppResult<QuizSession> {
        let mut tables = self.tables.lock().await;
        let record = QuizSession {
            quiz_date: session.quiz_date,
            start_at: session.start_at,
            end_at: session.end_at,
            updated_at: session.updated_at,
        };
        tables.sessions.insert(session.quiz_date, record.clone());

        Ok(record)
    }
}

/// In-memory user directory.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    users: RwLock<HashMap<i64, DirectoryUser>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, user: DirectoryUser) {
        self.users.write().await.insert(user.id, user);
    }
}

#[async_trait]
impl UserDirectory for MemoryDirectory {
    async fn find_user(&self, user_id: i64) -> AppResult<Option<DirectoryUser>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }

    async fn identities(&self, user_ids: &[i64]) -> AppResult<HashMap<i64, UserIdentity>> {
        let users = self.users.read().await;
        Ok(user_ids
            .iter()
            .filter_map(|id| users.get(id).map(|u| (*id, u.identity())))
            .collect())
    }
}
