// src/controllers/play.rs

use crate::{
    api::QuizApi,
    error::ClientError,
    models::{
        attempt::{AttemptResult, QuizAttempt},
        quiz::Quiz,
    },
    utils::{clock::Ticker, time::format_countdown},
};

pub const LOAD_FAILED: &str = "Failed to load quiz";
pub const SUBMIT_FAILED: &str = "Failed to submit quiz";

/// Where a single attempt currently stands.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Waiting for the quiz to arrive.
    Loading,
    /// Collecting answers. A submission may be outstanding.
    InProgress,
    /// Terminal: the server's verdict.
    Completed(AttemptResult),
    /// Terminal: a message for the user. No retry.
    Error(String),
}

/// Body and target of an outstanding submission.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSubmission {
    pub quiz_id: i64,
    pub attempt: QuizAttempt,
}

/// Drives one quiz attempt from load to result.
///
/// Answers are typed into one free-text box and submitted one at a time; an
/// explicit finish sends them all. There is no per-question stepper.
///
/// IO-free transitions (`resolve_load`, `begin_finish`, `resolve_finish`)
/// let a caller keep ticking the countdown while a request is in flight;
/// `load` and `finish` wrap them for callers that simply await.
#[derive(Debug, Clone)]
pub struct QuizSession {
    quiz_id: i64,
    state: SessionState,
    quiz: Option<Quiz>,
    answers: Vec<String>,
    input: String,
    remaining: Option<u32>,
    submitting: bool,
}

impl QuizSession {
    pub fn new(quiz_id: i64) -> Self {
        Self {
            quiz_id,
            state: SessionState::Loading,
            quiz: None,
            answers: Vec::new(),
            input: String::new(),
            remaining: None,
            submitting: false,
        }
    }

    pub fn quiz_id(&self) -> i64 {
        self.quiz_id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn quiz(&self) -> Option<&Quiz> {
        self.quiz.as_ref()
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn is_in_progress(&self) -> bool {
        self.state == SessionState::InProgress
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn result(&self) -> Option<&AttemptResult> {
        match &self.state {
            SessionState::Completed(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            SessionState::Error(msg) => Some(msg),
            _ => None,
        }
    }

    /// Fetches the quiz and applies the outcome.
    pub async fn load<A>(&mut self, api: &A) -> Result<&Quiz, ClientError>
    where
        A: QuizApi + ?Sized,
    {
        if self.state != SessionState::Loading {
            return Err(ClientError::BadRequest("Quiz is already loaded".to_string()));
        }

        let outcome = api.get_quiz(self.quiz_id).await;
        self.resolve_load(outcome);

        match (&self.state, &self.quiz) {
            (SessionState::InProgress, Some(quiz)) => Ok(quiz),
            _ => Err(ClientError::LoadError(LOAD_FAILED.to_string())),
        }
    }

    /// Loading → InProgress on success, Loading → Error otherwise.
    ///
    /// A nonzero time limit seeds the countdown; no time limit means no countdown.
    pub fn resolve_load(&mut self, outcome: Result<Quiz, ClientError>) {
        if self.state != SessionState::Loading {
            tracing::warn!("Ignoring load result for quiz {}: not loading", self.quiz_id);
            return;
        }

        match outcome {
            Ok(quiz) => {
                self.remaining = quiz.countdown_seconds();
                tracing::info!(
                    "Quiz {} loaded, time limit: {:?}",
                    self.quiz_id,
                    self.remaining
                );
                self.quiz = Some(quiz);
                self.state = SessionState::InProgress;
            }
            Err(e) => {
                tracing::error!("Failed to load quiz {}: {:?}", self.quiz_id, e);
                self.state = SessionState::Error(LOAD_FAILED.to_string());
            }
        }
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        if self.is_in_progress() {
            self.input = text.into();
        }
    }

    /// Records the trimmed input as the next answer and clears the box.
    ///
    /// Blank input is ignored. Returns whether an answer was recorded.
    pub fn submit_answer(&mut self) -> bool {
        if !self.is_in_progress() {
            return false;
        }

        let trimmed = self.input.trim();
        if trimmed.is_empty() {
            return false;
        }

        self.answers.push(trimmed.to_owned());
        self.input.clear();
        true
    }

    pub fn remaining_seconds(&self) -> Option<u32> {
        self.remaining
    }

    /// `m:ss` while a countdown exists, including a final `0:00`.
    pub fn countdown_display(&self) -> Option<String> {
        self.remaining.map(format_countdown)
    }

    /// Whether another tick would change anything.
    pub fn countdown_active(&self) -> bool {
        self.is_in_progress() && self.remaining.is_some_and(|r| r > 0)
    }

    /// One second elapsed. Stops at zero and never finishes the attempt.
    pub fn tick(&mut self) -> Option<u32> {
        if self.countdown_active() {
            if let Some(remaining) = self.remaining.as_mut() {
                *remaining -= 1;
                if *remaining == 0 {
                    tracing::info!("Time is up on quiz {}", self.quiz_id);
                }
            }
        }
        self.remaining
    }

    /// `time_limit - remaining` for timed quizzes, 0 otherwise.
    pub fn completion_time(&self) -> u32 {
        match self.quiz.as_ref().and_then(Quiz::countdown_seconds) {
            Some(limit) => limit.saturating_sub(self.remaining.unwrap_or(0)),
            None => 0,
        }
    }

    /// What a front end should offer: a finish control once something has
    /// been answered and nothing is outstanding. Not enforced by `begin_finish`.
    pub fn can_finish(&self) -> bool {
        self.is_in_progress() && !self.answers.is_empty() && !self.submitting
    }

    /// Marks a submission outstanding and builds its body.
    ///
    /// Fails with `Busy` while a previous submission has not resolved.
    pub fn begin_finish(&mut self) -> Result<PendingSubmission, ClientError> {
        if !self.is_in_progress() {
            return Err(ClientError::BadRequest("Quiz is not in progress".to_string()));
        }
        if self.submitting {
            return Err(ClientError::Busy);
        }

        self.submitting = true;
        Ok(PendingSubmission {
            quiz_id: self.quiz_id,
            attempt: QuizAttempt {
                answers: self.answers.clone(),
                completion_time: self.completion_time(),
            },
        })
    }

    /// InProgress → Completed on success, InProgress → Error otherwise.
    pub fn resolve_finish(&mut self, outcome: Result<AttemptResult, ClientError>) {
        if !self.submitting || !self.is_in_progress() {
            tracing::warn!("Ignoring submission result for quiz {}: none outstanding", self.quiz_id);
            return;
        }
        self.submitting = false;

        match outcome {
            Ok(result) => {
                tracing::info!(
                    "Quiz {} completed: score {}, {}/{} correct",
                    self.quiz_id,
                    result.score,
                    result.correct_answers,
                    result.total_questions
                );
                self.state = SessionState::Completed(result);
            }
            Err(e) => {
                tracing::error!("Failed to submit quiz {}: {:?}", self.quiz_id, e);
                self.state = SessionState::Error(SUBMIT_FAILED.to_string());
            }
        }
    }

    /// Submits every recorded answer and applies the outcome.
    pub async fn finish<A>(&mut self, api: &A) -> Result<&AttemptResult, ClientError>
    where
        A: QuizApi + ?Sized,
    {
        let pending = self.begin_finish()?;
        let outcome = api.submit_attempt(pending.quiz_id, &pending.attempt).await;
        self.resolve_finish(outcome);

        self.result()
            .ok_or_else(|| ClientError::SubmissionError(SUBMIT_FAILED.to_string()))
    }
}

/// Ticks the countdown until it stops.
///
/// Reaching zero ends the loop without submitting. The ticker stays with the
/// caller, so dropping it releases the timer.
pub async fn run_countdown<T>(session: &mut QuizSession, ticker: &mut T)
where
    T: Ticker + ?Sized,
{
    while session.countdown_active() {
        ticker.tick().await;
        session.tick();
    }
}
