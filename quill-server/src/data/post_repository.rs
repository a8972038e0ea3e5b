use async_trait::async_trait;

use crate::data::Pagination;
use crate::domain::error::DomainError;
use crate::domain::like::LikeOutcome;
use crate::domain::post::{Post, PostView};

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) excerpt: String,
    pub(crate) featured_image: String,
    pub(crate) author_id: i64,
    pub(crate) category_ids: Vec<i64>,
    pub(crate) tags: Vec<String>,
    pub(crate) is_published: bool,
    pub(crate) slug: String,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PostPatch {
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
    pub(crate) excerpt: Option<String>,
    pub(crate) featured_image: Option<String>,
    pub(crate) category_ids: Option<Vec<i64>>,
    pub(crate) tags: Option<Vec<String>>,
    pub(crate) is_published: Option<bool>,
    pub(crate) slug: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum PostSort {
    #[default]
    PublishedAtDesc,
    CreatedAtDesc,
}

/// Independently-optional predicates combined with AND.
#[derive(Debug, Clone, Default)]
pub(crate) struct PostFilter {
    pub(crate) category_id: Option<i64>,
    pub(crate) search: Option<String>,
    pub(crate) author_id: Option<i64>,
    pub(crate) published_only: bool,
    pub(crate) sort: PostSort,
}

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn create_post(&self, input: NewPost) -> Result<PostView, DomainError>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError>;
    async fn get_post_view(&self, id: i64) -> Result<Option<PostView>, DomainError>;
    async fn update_post(&self, id: i64, patch: PostPatch)
    -> Result<Option<PostView>, DomainError>;
    async fn delete_post(&self, id: i64) -> Result<bool, DomainError>;
    async fn list_posts(
        &self,
        filter: &PostFilter,
        pagination: Pagination,
    ) -> Result<Vec<PostView>, DomainError>;
    async fn count_posts(&self, filter: &PostFilter) -> Result<i64, DomainError>;
    async fn increment_view_count(&self, id: i64) -> Result<bool, DomainError>;
    async fn toggle_like(
        &self,
        post_id: i64,
        user_id: i64,
    ) -> Result<Option<LikeOutcome>, DomainError>;
}
