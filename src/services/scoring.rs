// src/services/scoring.rs

use crate::models::answer::{AnswerRecord, SubmittedAnswer};

/// Outcome of scoring one batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreSummary {
    pub per_answer: Vec<bool>,
    pub score: i32,
    pub total: i32,
}

/// Strict comparison: no trimming, no case folding, no partial credit.
/// An answer with unknown correctness is never correct.
pub fn is_correct(selected: &str, correct: Option<&str>) -> bool {
    correct.is_some_and(|correct| correct == selected)
}

/// Scores a submitted batch.
pub fn score(answers: &[SubmittedAnswer]) -> ScoreSummary {
    let per_answer: Vec<bool> = answers
        .iter()
        .map(|a| is_correct(&a.selected_option, a.correct_answer.as_deref()))
        .collect();

    summarize(per_answer)
}

/// Recomputes score and total from persisted answers.
pub fn tally(saved: &[AnswerRecord]) -> ScoreSummary {
    summarize(saved.iter().map(|a| a.is_correct).collect())
}

fn summarize(per_answer: Vec<bool>) -> ScoreSummary {
    let score = per_answer.iter().filter(|c| **c).count() as i32;
    let total = per_answer.len() as i32;
    ScoreSummary {
        per_answer,
        score,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(selected: &str, correct: Option<&str>) -> SubmittedAnswer {
        SubmittedAnswer {
            question_id: "q".into(),
            question_text: None,
            selected_option: selected.into(),
            correct_answer: correct.map(String::from),
        }
    }

    #[test]
    fn one_of_two_correct() {
        let summary = score(&[answer("A", Some("A")), answer("B", Some("A"))]);
        assert_eq!(summary.per_answer, vec![true, false]);
        assert_eq!(summary.score, 1);
        assert_eq!(summary.total, 2);
    }

    #[test]
    fn unknown_correct_answer_scores_zero() {
        let summary = score(&[answer("A", None)]);
        assert_eq!(summary.score, 0);
        assert_eq!(summary.total, 1);
    }

    #[test]
    fn comparison_is_exact() {
        assert!(!is_correct("a", Some("A")));
        assert!(!is_correct("A ", Some("A")));
        assert!(is_correct("Option C", Some("Option C")));
    }

    #[test]
    fn empty_batch_is_zero_of_zero() {
        let summary = score(&[]);
        assert_eq!((summary.score, summary.total), (0, 0));
    }
}
