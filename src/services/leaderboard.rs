// src/services/leaderboard.rs

use crate::{
    db::{QuizStore, UserDirectory},
    error::AppResult,
    models::{
        attempt::DailyAttempt,
        leaderboard::{AggregateEntry, DailyLeaderboard, DailyLeaderboardEntry},
        quiz_date::QuizDate,
        user::display_fields,
    },
    services::ranking,
};

/// The `limit` best attempts of `date`, in ranking order.
pub async fn top_n(
    store: &dyn QuizStore,
    directory: &dyn UserDirectory,
    date: QuizDate,
    limit: usize,
) -> AppResult<DailyLeaderboard> {
    let mut attempts = store.list_daily_attempts(date).await?;
    ranking::order(&mut attempts);
    attempts.truncate(limit);

    let ids: Vec<i64> = attempts.iter().map(|a| a.student_id).collect();
    let identities = directory.identities(&ids).await?;

    let top = attempts
        .into_iter()
        .enumerate()
        .map(|(i, attempt)| {
            let (name, username) = display_fields(identities.get(&attempt.student_id));
            DailyLeaderboardEntry {
                rank: i as u32 + 1,
                student_id: attempt.student_id,
                name,
                username,
                score: attempt.score,
                total: attempt.total,
                time_taken: attempt.time_taken,
                points: attempt.points,
                attempted_at: attempt.attempted_at,
            }
        })
        .collect();

    Ok(DailyLeaderboard { date, top })
}

/// All-time points per student across every daily quiz.
/// Unpaginated; sized for a classroom.
pub async fn aggregate(
    store: &dyn QuizStore,
    directory: &dyn UserDirectory,
) -> AppResult<Vec<AggregateEntry>> {
    let totals = store.daily_totals().await?;

    let ids: Vec<i64> = totals.iter().map(|t| t.student_id).collect();
    let identities = directory.identities(&ids).await?;

    Ok(totals
        .into_iter()
        .enumerate()
        .map(|(i, totals)| {
            let (name, username) = display_fields(identities.get(&totals.student_id));
            AggregateEntry {
                rank: i as u32 + 1,
                student_id: totals.student_id,
                name,
                username,
                total_points: totals.total_points,
                total_attempts: totals.total_attempts,
            }
        })
        .collect())
}

/// The caller's own attempt, if any.
pub async fn my_daily_attempt(
    store: &dyn QuizStore,
    student_id: i64,
    date: QuizDate,
) -> AppResult<Option<DailyAttempt>> {
    store.find_daily_attempt(student_id, date).await
}
