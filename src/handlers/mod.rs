// src/handlers/mod.rs

pub mod leaderboard;
pub mod quiz_answer;
pub mod quiz_attempt;
pub mod session;
