// src/models/attempt.rs

use serde::{Deserialize, Serialize};

/// DTO for submitting a quiz attempt.
/// Built once by the session controller and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizAttempt {
    /// One entry per submitted answer, in submission order.
    pub answers: Vec<String>,

    /// Seconds spent, 0 for untimed quizzes.
    pub completion_time: u32,
}

/// Server-computed outcome of an attempt. Rendered as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptResult {
    /// Percentage of correct answers.
    pub score: f64,
    pub correct_answers: u32,
    pub total_questions: u32,
    pub points_earned: i64,
}
