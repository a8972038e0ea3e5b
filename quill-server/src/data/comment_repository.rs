use async_trait::async_trait;

use crate::domain::comment::{Comment, CommentThread, CommentView};
use crate::domain::error::DomainError;
use crate::domain::like::LikeOutcome;

#[derive(Debug, Clone)]
pub(crate) struct NewComment {
    pub(crate) content: String,
    pub(crate) author_id: i64,
    pub(crate) post_id: i64,
    pub(crate) parent_comment_id: Option<i64>,
}

#[async_trait]
pub(crate) trait CommentRepository: Send + Sync {
    async fn create_comment(&self, input: NewComment) -> Result<CommentView, DomainError>;
    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, DomainError>;
    async fn update_comment(
        &self,
        id: i64,
        content: String,
    ) -> Result<Option<CommentView>, DomainError>;
    async fn delete_comment(&self, id: i64) -> Result<bool, DomainError>;
    /// Approved top-level comments for a post, newest first, replies attached.
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentThread>, DomainError>;
    async fn toggle_like(
        &self,
        comment_id: i64,
        user_id: i64,
    ) -> Result<Option<LikeOutcome>, DomainError>;
}
