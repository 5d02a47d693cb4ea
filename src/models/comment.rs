use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::utils::time::lenient;

/// A comment on a quiz. Replies carry a `parent_id` and live in the same flat list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub content: String,
    pub author_id: i64,
    #[serde(default)]
    pub author_username: String,
    pub quiz_id: i64,
    #[serde(default)]
    pub parent_id: Option<i64>,
    #[serde(with = "lenient")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(with = "lenient")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
    #[serde(default)]
    pub likes_count: i64,
}

impl Comment {
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }
}

/// DTO for creating, replying to or editing a comment.
#[derive(Debug, Clone, Serialize, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 1, message = "Comment must not be empty"))]
    pub content: String,
}

/// A comment with its replies attached.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentNode {
    pub comment: Comment,
    pub replies: Vec<CommentNode>,
}

impl CommentNode {
    /// Number of comments in this subtree, including this one.
    pub fn len(&self) -> usize {
        1 + self.replies.iter().map(CommentNode::len).sum::<usize>()
    }
}

/// Rebuilds the reply tree from a flat adjacency list.
///
/// Siblings keep their order from the input. A comment whose parent is not in
/// the list (deleted, or on another page) becomes a root. Parent links that
/// would form a cycle are cut at the first comment seen twice.
pub fn build_tree(comments: &[Comment]) -> Vec<CommentNode> {
    let ids: HashSet<i64> = comments.iter().map(|c| c.id).collect();

    let mut children: HashMap<i64, Vec<&Comment>> = HashMap::new();
    let mut roots: Vec<&Comment> = Vec::new();
    for comment in comments {
        match comment.parent_id {
            Some(pid) if pid != comment.id && ids.contains(&pid) => {
                children.entry(pid).or_default().push(comment)
            }
            _ => roots.push(comment),
        }
    }

    let mut visited = HashSet::new();
    let mut tree: Vec<CommentNode> = roots
        .into_iter()
        .map(|c| attach(c, &children, &mut visited))
        .collect();

    // Comments only reachable through a cycle never hang off a root.
    for comment in comments {
        if !visited.contains(&comment.id) {
            tree.push(attach(comment, &children, &mut visited));
        }
    }
    tree
}

fn attach(
    comment: &Comment,
    children: &HashMap<i64, Vec<&Comment>>,
    visited: &mut HashSet<i64>,
) -> CommentNode {
    visited.insert(comment.id);
    let mut replies = Vec::new();
    for kid in children.get(&comment.id).into_iter().flatten() {
        if !visited.contains(&kid.id) {
            replies.push(attach(kid, children, visited));
        }
    }

    CommentNode {
        comment: comment.clone(),
        replies,
    }
}
