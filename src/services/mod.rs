// src/services/mod.rs

pub mod leaderboard;
pub mod ranking;
pub mod scoring;
pub mod session;
pub mod submission;
