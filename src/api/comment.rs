// src/api/comment.rs

use reqwest::Method;
use validator::Validate;

use super::ApiClient;
use crate::{
    error::ClientError,
    models::comment::{Comment, CommentRequest},
};

impl ApiClient {
    /// All live comments on a quiz, flat, in server order.
    pub async fn list_comments(&self, quiz_id: i64) -> Result<Vec<Comment>, ClientError> {
        let builder = self.request(Method::GET, &format!("/api/quizzes/{}/comments", quiz_id))?;
        self.send_json(builder).await
    }

    pub async fn add_comment(&self, quiz_id: i64, content: &str) -> Result<Comment, ClientError> {
        self.write_comment(Method::POST, &format!("/api/quizzes/{}/comments", quiz_id), content)
            .await
    }

    pub async fn reply_to_comment(
        &self,
        comment_id: i64,
        content: &str,
    ) -> Result<Comment, ClientError> {
        self.write_comment(Method::POST, &format!("/api/comments/{}/replies", comment_id), content)
            .await
    }

    pub async fn update_comment(&self, comment_id: i64, content: &str) -> Result<Comment, ClientError> {
        self.write_comment(Method::PUT, &format!("/api/comments/{}", comment_id), content)
            .await
    }

    pub async fn delete_comment(&self, comment_id: i64) -> Result<(), ClientError> {
        let builder = self.request(Method::DELETE, &format!("/api/comments/{}", comment_id))?;
        self.send_empty(builder).await
    }

    async fn write_comment(
        &self,
        method: Method,
        path: &str,
        content: &str,
    ) -> Result<Comment, ClientError> {
        let payload = CommentRequest {
            content: content.to_owned(),
        };
        payload.validate()?;

        let builder = self.request(method, path)?.json(&payload);
        self.send_json(builder).await
    }
}
