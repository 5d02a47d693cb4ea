// src/api/mod.rs

use async_trait::async_trait;
use reqwest::{
    Method, RequestBuilder, Response,
    header::{CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::{
    config::Config,
    error::ClientError,
    models::{
        attempt::{AttemptResult, QuizAttempt},
        comment::Comment,
        quiz::Quiz,
    },
    session::Session,
};

pub mod auth;
pub mod comment;
pub mod quiz;

pub use auth::{AuthAction, OAuthProvider};

/// Thin JSON client for the quiz REST backend.
///
/// * Sends `Content-Type: application/json` on every request.
/// * Reads the session token at send time and attaches it as a bearer credential.
/// * No retries, no timeout beyond reqwest's default.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: Session,
}

impl ApiClient {
    pub fn new(base_url: Url, session: Session) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    pub fn from_config(config: &Config, session: Session) -> Result<Self, ClientError> {
        Self::new(config.api_url.clone(), session)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends `path` to the base URL, keeping any prefix the base carries.
    pub(crate) fn url(&self, path: &str) -> Result<Url, ClientError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!("{}{}", base, path))?)
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let url = self.url(path)?;
        tracing::debug!("{} {}", method, url);

        let builder = self.http.request(method, url);
        Ok(match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// Sends the request and decodes a JSON body.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = self.dispatch(builder).await?;
        response.json::<T>().await.map_err(|e| {
            tracing::error!("Failed to decode response body: {:?}", e);
            ClientError::from(e)
        })
    }

    /// Sends the request and discards whatever body comes back.
    pub(crate) async fn send_empty(&self, builder: RequestBuilder) -> Result<(), ClientError> {
        self.dispatch(builder).await.map(|_| ())
    }

    async fn dispatch(&self, builder: RequestBuilder) -> Result<Response, ClientError> {
        let response = self.send_raw(builder).await?;
        if response.status().is_success() {
            return Ok(response);
        }

        let (status, reason, body) = Self::read_failure(response).await;
        let message = server_message(&body).unwrap_or(reason);
        Err(ClientError::from_status(status, message))
    }

    /// Sends without looking at the status. Only transport failures are errors.
    pub(crate) async fn send_raw(&self, builder: RequestBuilder) -> Result<Response, ClientError> {
        builder.send().await.map_err(|e| {
            tracing::error!("Request failed: {:?}", e);
            ClientError::from(e)
        })
    }

    /// Drains a non-success response into `(status, reason, body)`.
    pub(crate) async fn read_failure(response: Response) -> (u16, String, String) {
        let status = response.status();
        let reason = status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string();
        let body = response.text().await.unwrap_or_default();
        tracing::error!("{} {}: {}", status.as_u16(), reason, body);
        (status.as_u16(), reason, body)
    }
}

/// Extracts the human-readable message from an error body.
///
/// Prefers `detail` (FastAPI), then `error`. Structured `detail` values such as
/// validation error lists are ignored.
pub fn server_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["detail", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .filter(|msg| !msg.is_empty())
        .map(str::to_owned)
}

/// The calls the quiz session controller depends on.
#[async_trait]
pub trait QuizApi: Send + Sync {
    async fn get_quiz(&self, id: i64) -> Result<Quiz, ClientError>;
    async fn submit_attempt(
        &self,
        quiz_id: i64,
        attempt: &QuizAttempt,
    ) -> Result<AttemptResult, ClientError>;
}

/// The calls the comment board depends on.
#[async_trait]
pub trait CommentApi: Send + Sync {
    async fn list_comments(&self, quiz_id: i64) -> Result<Vec<Comment>, ClientError>;
    async fn add_comment(&self, quiz_id: i64, content: &str) -> Result<Comment, ClientError>;
    async fn reply_to_comment(&self, comment_id: i64, content: &str)
    -> Result<Comment, ClientError>;
    async fn update_comment(&self, comment_id: i64, content: &str) -> Result<Comment, ClientError>;
    async fn delete_comment(&self, comment_id: i64) -> Result<(), ClientError>;
}

#[async_trait]
impl QuizApi for ApiClient {
    async fn get_quiz(&self, id: i64) -> Result<Quiz, ClientError> {
        ApiClient::get_quiz(self, id).await
    }

    async fn submit_attempt(
        &self,
        quiz_id: i64,
        attempt: &QuizAttempt,
    ) -> Result<AttemptResult, ClientError> {
        ApiClient::submit_attempt(self, quiz_id, attempt).await
    }
}

#[async_trait]
impl CommentApi for ApiClient {
    async fn list_comments(&self, quiz_id: i64) -> Result<Vec<Comment>, ClientError> {
        ApiClient::list_comments(self, quiz_id).await
    }

    async fn add_comment(&self, quiz_id: i64, content: &str) -> Result<Comment, ClientError> {
        ApiClient::add_comment(self, quiz_id, content).await
    }

    async fn reply_to_comment(
        &self,
        comment_id: i64,
        content: &str,
    ) -> Result<Comment, ClientError> {
        ApiClient::reply_to_comment(self, comment_id, content).await
    }

    async fn update_comment(&self, comment_id: i64, content: &str) -> Result<Comment, ClientError> {
        ApiClient::update_comment(self, comment_id, content).await
    }

    async fn delete_comment(&self, comment_id: i64) -> Result<(), ClientError> {
        ApiClient::delete_comment(self, comment_id).await
    }
}
