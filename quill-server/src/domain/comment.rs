use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Comment {
    pub(crate) id: i64,
    pub(crate) content: String,
    pub(crate) author_id: i64,
    pub(crate) post_id: i64,
    pub(crate) parent_comment_id: Option<i64>,
    pub(crate) is_approved: bool,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub(crate) struct CommentAuthor {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) avatar: String,
}

/// A comment joined with its author and derived like count.
#[derive(Debug, Clone)]
pub(crate) struct CommentView {
    pub(crate) comment: Comment,
    pub(crate) author: CommentAuthor,
    pub(crate) like_count: i64,
}

/// A top-level comment together with its replies.
#[derive(Debug, Clone)]
pub(crate) struct CommentThread {
    pub(crate) comment: CommentView,
    pub(crate) replies: Vec<CommentView>,
}

#[derive(Debug, Clone)]
pub(crate) struct CreateCommentRequest {
    pub(crate) content: String,
    pub(crate) parent_comment_id: Option<i64>,
}

impl CreateCommentRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            content: normalize_comment_content(&self.content)?,
            parent_comment_id: self.parent_comment_id,
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct UpdateCommentRequest {
    pub(crate) content: String,
}

impl UpdateCommentRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            content: normalize_comment_content(&self.content)?,
        })
    }
}

fn normalize_comment_content(content: &str) -> Result<String, DomainError> {
    let content = content.trim();
    let len = content.chars().count();
    if len == 0 || len > 1000 {
        return Err(DomainError::Validation {
            field: "content",
            message: "must be 1..1000 chars",
        });
    }
    Ok(content.to_string())
}

#[cfg(test)]
mod tests {
    use super::{CreateCommentRequest, UpdateCommentRequest};

    #[test]
    fn create_request_trims_and_keeps_parent() {
        let req = CreateCommentRequest {
            content: "  hello  ".to_string(),
            parent_comment_id: Some(3),
        };
        let validated = req.validate().expect("must validate");
        assert_eq!(validated.content, "hello");
        assert_eq!(validated.parent_comment_id, Some(3));
    }

    #[test]
    fn content_length_limit_is_enforced() {
        let req = UpdateCommentRequest {
            content: "c".repeat(1001),
        };
        assert!(req.validate().is_err());

        let req = UpdateCommentRequest {
            content: "c".repeat(1000),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn blank_content_is_rejected() {
        let req = CreateCommentRequest {
            content: "   ".to_string(),
            parent_comment_id: None,
        };
        assert!(req.validate().is_err());
    }
}
