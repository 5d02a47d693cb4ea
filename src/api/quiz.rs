// src/api/quiz.rs

use reqwest::Method;
use validator::Validate;

use super::ApiClient;
use crate::{
    error::ClientError,
    models::{
        attempt::{AttemptResult, QuizAttempt},
        quiz::{CreateQuizRequest, Quiz, QuizListParams},
        stats::QuizStatistics,
    },
};

impl ApiClient {
    /// Lists quizzes one page at a time.
    ///
    /// `page` is 1-indexed and sent as a zero-indexed `skip`; an empty `search`
    /// is left out of the query entirely.
    pub async fn list_quizzes(
        &self,
        page: u32,
        limit: u32,
        search: Option<&str>,
    ) -> Result<Vec<Quiz>, ClientError> {
        let params = QuizListParams::new(page, limit, search);
        let builder = self.request(Method::GET, "/api/quizzes")?.query(&params);
        self.send_json(builder).await
    }

    pub async fn get_quiz(&self, id: i64) -> Result<Quiz, ClientError> {
        let builder = self.request(Method::GET, &format!("/api/quizzes/{}", id))?;
        self.send_json(builder).await
    }

    /// Creates a quiz owned by the signed-in user.
    pub async fn create_quiz(&self, quiz: &CreateQuizRequest) -> Result<Quiz, ClientError> {
        quiz.validate()?;
        let builder = self.request(Method::POST, "/api/quizzes")?.json(quiz);
        self.send_json(builder).await
    }

    /// Sends a finished attempt. Scoring happens entirely on the server.
    pub async fn submit_attempt(
        &self,
        quiz_id: i64,
        attempt: &QuizAttempt,
    ) -> Result<AttemptResult, ClientError> {
        let builder = self
            .request(Method::POST, &format!("/api/quizzes/{}/attempts", quiz_id))?
            .json(attempt);
        self.send_json(builder).await
    }

    pub async fn quiz_statistics(&self, quiz_id: i64) -> Result<QuizStatistics, ClientError> {
        let builder = self.request(Method::GET, &format!("/api/stats/quizzes/{}", quiz_id))?;
        self.send_json(builder).await
    }
}
