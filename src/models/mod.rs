// src/models/mod.rs

pub mod answer;
pub mod attempt;
pub mod leaderboard;
pub mod quiz_date;
pub mod session;
pub mod user;
