// src/services/ranking.rs

//! Daily quiz ranking.
//!
//! Attempts of one date are ordered by score (high first), then time taken
//! (low first), then submission instant (early first). The top three earn a
//! rank bonus on top of their score.

use std::cmp::Ordering;

use crate::models::attempt::DailyAttempt;

/// Bonus points for ranks 1, 2 and 3.
pub const RANK_BONUSES: [i32; 3] = [5, 3, 1];

/// Bonus for a 1-based rank.
pub fn rank_bonus(rank: usize) -> i32 {
    rank.checked_sub(1)
        .and_then(|i| RANK_BONUSES.get(i))
        .copied()
        .unwrap_or(0)
}

/// Leaderboard ordering. The id comparison only makes the order total.
pub fn compare(a: &DailyAttempt, b: &DailyAttempt) -> Ordering {
    b.score
        .cmp(&a.score)
        .then(a.time_taken.cmp(&b.time_taken))
        .then(a.attempted_at.cmp(&b.attempted_at))
        .then(a.id.cmp(&b.id))
}

/// Sorts attempts into leaderboard order.
pub fn order(attempts: &mut [DailyAttempt]) {
    attempts.sort_by(compare);
}

/// Orders the full set of one date and rewrites every `points` value.
pub fn assign_points(attempts: &mut [DailyAttempt]) {
    order(attempts);
    for (i, attempt) in attempts.iter_mut().enumerate() {
        attempt.points = rank_bonus(i + 1) + attempt.score;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn attempt(id: i64, score: i32, time_taken: i32, offset_secs: i64) -> DailyAttempt {
        DailyAttempt {
            id,
            student_id: id * 10,
            quiz_date: "2025-06-01".parse().unwrap(),
            score,
            total: 10,
            time_taken,
            points: 0,
            attempted_at: Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
                + Duration::seconds(offset_secs),
        }
    }

    fn points_of(attempts: &[DailyAttempt], id: i64) -> i32 {
        attempts.iter().find(|a| a.id == id).unwrap().points
    }

    #[test]
    fn bonuses_for_top_three_only() {
        assert_eq!(rank_bonus(1), 5);
        assert_eq!(rank_bonus(2), 3);
        assert_eq!(rank_bonus(3), 1);
        assert_eq!(rank_bonus(4), 0);
        assert_eq!(rank_bonus(0), 0);
    }

    #[test]
    fn lower_time_breaks_score_ties() {
        let mut attempts = vec![attempt(1, 8, 50, 0), attempt(2, 8, 40, 1), attempt(3, 5, 30, 2)];
        assign_points(&mut attempts);

        let ids: Vec<i64> = attempts.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
        assert_eq!(points_of(&attempts, 2), 13);
        assert_eq!(points_of(&attempts, 1), 11);
        assert_eq!(points_of(&attempts, 3), 6);
    }

    #[test]
    fn new_leader_demotes_previous_ranks() {
        let mut attempts = vec![
            attempt(1, 8, 50, 0),
            attempt(2, 8, 40, 1),
            attempt(3, 5, 30, 2),
            attempt(4, 9, 60, 3),
        ];
        assign_points(&mut attempts);

        assert_eq!(points_of(&attempts, 4), 14);
        assert_eq!(points_of(&attempts, 2), 11);
        assert_eq!(points_of(&attempts, 1), 9);
        assert_eq!(points_of(&attempts, 3), 5);
    }

    #[test]
    fn earlier_submission_breaks_full_ties() {
        let mut attempts = vec![attempt(7, 6, 20, 30), attempt(8, 6, 20, 10)];
        assign_points(&mut attempts);
        assert_eq!(attempts[0].id, 8);
        assert_eq!(attempts[0].points, 11);
        assert_eq!(attempts[1].points, 9);
    }

    #[test]
    fn stale_points_are_overwritten() {
        let mut stale = attempt(1, 4, 10, 0);
        stale.points = 99;
        let mut attempts = vec![stale];
        assign_points(&mut attempts);
        assert_eq!(attempts[0].points, 9);
    }
}
