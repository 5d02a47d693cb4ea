// src/models/stats.rs

use serde::{Deserialize, Serialize};

/// Per-answer hit rate across all attempts of a quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerStats {
    pub answer: String,
    pub correct_count: i64,
    pub attempt_count: i64,
    pub percentage: f64,
}

/// Aggregate statistics from `/api/stats/quizzes/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizStatistics {
    pub quiz_id: i64,
    pub total_attempts: i64,
    pub average_score: f64,
    #[serde(default)]
    pub answers_stats: Vec<AnswerStats>,
}
