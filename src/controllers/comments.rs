// src/controllers/comments.rs

use crate::{
    api::CommentApi,
    error::ClientError,
    models::comment::{Comment, CommentNode, build_tree},
};

/// The comment list under a quiz.
///
/// Mutations never touch the local list: each successful one is followed by
/// exactly one full re-fetch.
#[derive(Debug, Clone)]
pub struct CommentBoard {
    quiz_id: i64,
    comments: Vec<Comment>,
}

impl CommentBoard {
    pub fn new(quiz_id: i64) -> Self {
        Self {
            quiz_id,
            comments: Vec::new(),
        }
    }

    pub fn quiz_id(&self) -> i64 {
        self.quiz_id
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn find(&self, comment_id: i64) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == comment_id)
    }

    /// Replies nested under their parents.
    pub fn tree(&self) -> Vec<CommentNode> {
        build_tree(&self.comments)
    }

    /// Replaces the local list with the server's.
    pub async fn refresh<A>(&mut self, api: &A) -> Result<&[Comment], ClientError>
    where
        A: CommentApi + ?Sized,
    {
        match api.list_comments(self.quiz_id).await {
            Ok(list) => {
                self.comments = list;
                Ok(&self.comments)
            }
            Err(e) => {
                tracing::error!("Failed to fetch comments: {:?}", e);
                Err(ClientError::LoadError("Failed to load comments".to_string()))
            }
        }
    }

    /// Returns `Ok(false)` without calling the server when `content` is blank.
    pub async fn add<A>(&mut self, api: &A, content: &str) -> Result<bool, ClientError>
    where
        A: CommentApi + ?Sized,
    {
        if content.trim().is_empty() {
            return Ok(false);
        }

        api.add_comment(self.quiz_id, content)
            .await
            .map_err(|e| mutation_failed("add comment", e))?;
        self.refresh(api).await?;
        Ok(true)
    }

    pub async fn reply<A>(&mut self, api: &A, comment_id: i64, content: &str) -> Result<bool, ClientError>
    where
        A: CommentApi + ?Sized,
    {
        if content.trim().is_empty() {
            return Ok(false);
        }

        api.reply_to_comment(comment_id, content)
            .await
            .map_err(|e| mutation_failed("reply to comment", e))?;
        self.refresh(api).await?;
        Ok(true)
    }

    /// Skips the call when `content` is blank or unchanged.
    pub async fn update<A>(&mut self, api: &A, comment_id: i64, content: &str) -> Result<bool, ClientError>
    where
        A: CommentApi + ?Sized,
    {
        let unchanged = self
            .find(comment_id)
            .is_some_and(|c| c.content == content);
        if content.trim().is_empty() || unchanged {
            return Ok(false);
        }

        api.update_comment(comment_id, content)
            .await
            .map_err(|e| mutation_failed("update comment", e))?;
        self.refresh(api).await?;
        Ok(true)
    }

    pub async fn delete<A>(&mut self, api: &A, comment_id: i64) -> Result<(), ClientError>
    where
        A: CommentApi + ?Sized,
    {
        api.delete_comment(comment_id)
            .await
            .map_err(|e| mutation_failed("delete comment", e))?;
        self.refresh(api).await?;
        Ok(())
    }
}

fn mutation_failed(action: &str, err: ClientError) -> ClientError {
    tracing::error!("Failed to {}: {:?}", action, err);
    ClientError::SubmissionError(format!("Failed to {}", action))
}
