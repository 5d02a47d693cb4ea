// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A quiz as returned by `/api/quizzes`.
/// Immutable once loaded into a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,

    /// Free-form type tag, e.g. "standard", "list" or "multiple_choice".
    pub quiz_type: String,

    /// Time limit in seconds. Absent or zero means untimed.
    #[serde(default)]
    pub time_limit: Option<u32>,

    #[serde(default)]
    pub attempt_count: i64,
    pub creator_id: i64,

    /// Expected answers, ordered by `position`.
    /// The server is expected to redact correct values before sending.
    #[serde(default)]
    pub answers: Option<Vec<Answer>>,
}

impl Quiz {
    /// The countdown seed, if this quiz is timed.
    pub fn countdown_seconds(&self) -> Option<u32> {
        self.time_limit.filter(|limit| *limit > 0)
    }

    pub fn question_count(&self) -> Option<usize> {
        self.answers.as_ref().map(Vec::len)
    }
}

/// One expected answer. Used server-side for scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub correct_answer: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub position: u32,

    /// Multiple choice only: whether this option is a correct one.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_correct: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Answer {
    pub fn new(correct_answer: impl Into<String>, position: u32) -> Self {
        Self {
            correct_answer: correct_answer.into(),
            aliases: Vec::new(),
            position,
            is_correct: false,
            explanation: None,
        }
    }
}

/// DTO for creating a new quiz (no id, creator or attempt count).
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CreateQuizRequest {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub quiz_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<u32>,
    pub answers: Vec<Answer>,
    pub is_multiple_choice: bool,
    pub allow_multiple_answers: bool,
}

impl CreateQuizRequest {
    /// A free-text quiz with the given expected answers, positioned in order.
    pub fn standard(title: impl Into<String>, answers: Vec<String>) -> Self {
        let answers = answers
            .into_iter()
            .enumerate()
            .map(|(i, a)| Answer::new(a, i as u32))
            .collect();
        Self {
            title: title.into(),
            description: None,
            quiz_type: "standard".to_string(),
            time_limit: None,
            answers,
            is_multiple_choice: false,
            allow_multiple_answers: false,
        }
    }

    /// Sets the time limit in seconds. Zero means untimed and leaves the
    /// field out of the request.
    pub fn with_time_limit(mut self, seconds: u32) -> Self {
        self.time_limit = (seconds > 0).then_some(seconds);
        self
    }
}

/// Query parameters for listing quizzes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizListParams {
    /// Zero-indexed offset: `(page - 1) * limit`.
    pub skip: u64,
    pub limit: u32,
    /// Title filter. Only sent when non-empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl QuizListParams {
    /// Builds the query from a 1-indexed page. Page 0 is read as page 1.
    pub fn new(page: u32, limit: u32, search: Option<&str>) -> Self {
        let page = page.max(1);
        Self {
            skip: u64::from(page - 1) * u64::from(limit),
            limit,
            search: search.filter(|s| !s.is_empty()).map(str::to_owned),
        }
    }
}

impl Default for QuizListParams {
    fn default() -> Self {
        Self::new(1, 10, None)
    }
}
