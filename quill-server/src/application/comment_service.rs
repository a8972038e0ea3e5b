use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::data::post_repository::PostRepository;
use crate::domain::comment::{
    CommentThread, CommentView, CreateCommentRequest, UpdateCommentRequest,
};
use crate::domain::error::DomainError;
use crate::domain::like::LikeOutcome;
use crate::domain::user::Actor;

pub(crate) struct CommentService<C: CommentRepository, P: PostRepository> {
    comments: C,
    posts: P,
}

impl<C: CommentRepository, P: PostRepository> CommentService<C, P> {
    pub(crate) fn new(comments: C, posts: P) -> Self {
        Self { comments, posts }
    }

    pub(crate) async fn list_for_post(
        &self,
        post_id: i64,
    ) -> Result<Vec<CommentThread>, DomainError> {
        self.ensure_post_exists(post_id).await?;
        self.comments.list_for_post(post_id).await
    }

    pub(crate) async fn create_comment(
        &self,
        author_id: i64,
        post_id: i64,
        req: CreateCommentRequest,
    ) -> Result<CommentView, DomainError> {
        let req = req.validate()?;
        self.ensure_post_exists(post_id).await?;

        // Threading is one level deep: a reply must point at a top-level
        // comment on the same post.
        if let Some(parent_id) = req.parent_comment_id {
            let parent = self
                .comments
                .get_comment(parent_id)
                .await?
                .ok_or_else(|| DomainError::NotFound(format!("comment id: {parent_id}")))?;
            if parent.post_id != post_id {
                return Err(DomainError::Validation {
                    field: "parentCommentId",
                    message: "must reference a comment on the same post",
                });
            }
            if parent.parent_comment_id.is_some() {
                return Err(DomainError::Validation {
                    field: "parentCommentId",
                    message: "replies to replies are not allowed",
                });
            }
        }

        let new_comment = NewComment {
            content: req.content,
            author_id,
            post_id,
            parent_comment_id: req.parent_comment_id,
        };
        self.comments.create_comment(new_comment).await
    }

    pub(crate) async fn update_comment(
        &self,
        actor: &Actor,
        id: i64,
        req: UpdateCommentRequest,
    ) -> Result<CommentView, DomainError> {
        let req = req.validate()?;

        let comment = self
            .comments
            .get_comment(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("comment id: {id}")))?;
        if !actor.can_mutate(comment.author_id) {
            return Err(DomainError::Forbidden);
        }

        self.comments
            .update_comment(id, req.content)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("comment id: {id}")))
    }

    /// Deleting a top-level comment takes its replies with it.
    pub(crate) async fn delete_comment(&self, actor: &Actor, id: i64) -> Result<(), DomainError> {
        let comment = self
            .comments
            .get_comment(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("comment id: {id}")))?;
        if !actor.can_mutate(comment.author_id) {
            return Err(DomainError::Forbidden);
        }

        if !self.comments.delete_comment(id).await? {
            return Err(DomainError::NotFound(format!("comment id: {id}")));
        }
        Ok(())
    }

    pub(crate) async fn toggle_like(
        &self,
        comment_id: i64,
        user_id: i64,
    ) -> Result<LikeOutcome, DomainError> {
        self.comments
            .toggle_like(comment_id, user_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("comment id: {comment_id}")))
    }

    async fn ensure_post_exists(&self, post_id: i64) -> Result<(), DomainError> {
        self.posts
            .get_post(post_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| DomainError::NotFound(format!("post id: {post_id}")))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::Utc;

    use super::CommentService;
    use crate::data::Pagination;
    use crate::data::comment_repository::{CommentRepository, NewComment};
    use crate::data::post_repository::{NewPost, PostFilter, PostPatch, PostRepository};
    use crate::domain::comment::{
        Comment, CommentAuthor, CommentThread, CommentView, CreateCommentRequest,
        UpdateCommentRequest,
    };
    use crate::domain::error::DomainError;
    use crate::domain::like::LikeOutcome;
    use crate::domain::post::{Post, PostView};
    use crate::domain::user::{Actor, Role};

    #[derive(Clone, Default)]
    struct FakeCommentRepo {
        stored_comment: Arc<Mutex<Option<Comment>>>,
        created_input: Arc<Mutex<Option<NewComment>>>,
        updated_content: Arc<Mutex<Option<(i64, String)>>>,
        like_outcome: Arc<Mutex<Option<LikeOutcome>>>,
    }

    impl FakeCommentRepo {
        fn with_comment(comment: Comment) -> Self {
            let repo = Self::default();
            *repo
                .stored_comment
                .lock()
                .expect("stored_comment mutex poisoned") = Some(comment);
            repo
        }
    }

    #[async_trait]
    impl CommentRepository for FakeCommentRepo {
        async fn create_comment(&self, input: NewComment) -> Result<CommentView, DomainError> {
            let view = sample_view(sample_comment(
                10,
                input.author_id,
                input.post_id,
                input.parent_comment_id,
            ));
            *self
                .created_input
                .lock()
                .expect("created_input mutex poisoned") = Some(input);
            Ok(view)
        }

        async fn get_comment(&self, _id: i64) -> Result<Option<Comment>, DomainError> {
            Ok(self
                .stored_comment
                .lock()
                .expect("stored_comment mutex poisoned")
                .clone())
        }

        async fn update_comment(
            &self,
            id: i64,
            content: String,
        ) -> Result<Option<CommentView>, DomainError> {
            *self
                .updated_content
                .lock()
                .expect("updated_content mutex poisoned") = Some((id, content));
            Ok(self
                .stored_comment
                .lock()
                .expect("stored_comment mutex poisoned")
                .clone()
                .map(sample_view))
        }

        async fn delete_comment(&self, _id: i64) -> Result<bool, DomainError> {
            Ok(self
                .stored_comment
                .lock()
                .expect("stored_comment mutex poisoned")
                .take()
                .is_some())
        }

        async fn list_for_post(&self, _post_id: i64) -> Result<Vec<CommentThread>, DomainError> {
            Ok(Vec::new())
        }

        async fn toggle_like(
            &self,
            _comment_id: i64,
            _user_id: i64,
        ) -> Result<Option<LikeOutcome>, DomainError> {
            Ok(self
                .like_outcome
                .lock()
                .expect("like_outcome mutex poisoned")
                .clone())
        }
    }

    #[derive(Clone, Default)]
    struct FakePostRepo {
        stored_post: Arc<Mutex<Option<Post>>>,
    }

    impl FakePostRepo {
        fn with_post(post: Post) -> Self {
            let repo = Self::default();
            *repo.stored_post.lock().expect("stored_post mutex poisoned") = Some(post);
            repo
        }
    }

    #[async_trait]
    impl PostRepository for FakePostRepo {
        async fn create_post(&self, _input: NewPost) -> Result<PostView, DomainError> {
            unimplemented!("not exercised")
        }

        async fn get_post(&self, _id: i64) -> Result<Option<Post>, DomainError> {
            Ok(self
                .stored_post
                .lock()
                .expect("stored_post mutex poisoned")
                .clone())
        }

        async fn get_post_view(&self, _id: i64) -> Result<Option<PostView>, DomainError> {
            unimplemented!("not exercised")
        }

        async fn update_post(
            &self,
            _id: i64,
            _patch: PostPatch,
        ) -> Result<Option<PostView>, DomainError> {
            unimplemented!("not exercised")
        }

        async fn delete_post(&self, _id: i64) -> Result<bool, DomainError> {
            unimplemented!("not exercised")
        }

        async fn list_posts(
            &self,
            _filter: &PostFilter,
            _pagination: Pagination,
        ) -> Result<Vec<PostView>, DomainError> {
            unimplemented!("not exercised")
        }

        async fn count_posts(&self, _filter: &PostFilter) -> Result<i64, DomainError> {
            unimplemented!("not exercised")
        }

        async fn increment_view_count(&self, _id: i64) -> Result<bool, DomainError> {
            unimplemented!("not exercised")
        }

        async fn toggle_like(
            &self,
            _post_id: i64,
            _user_id: i64,
        ) -> Result<Option<LikeOutcome>, DomainError> {
            unimplemented!("not exercised")
        }
    }

    #[tokio::test]
    async fn create_comment_requires_existing_post() {
        let service = CommentService::new(FakeCommentRepo::default(), FakePostRepo::default());

        let req = CreateCommentRequest {
            content: "hello".to_string(),
            parent_comment_id: None,
        };
        let err = service
            .create_comment(1, 5, req)
            .await
            .expect_err("post must be missing");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn create_comment_stores_top_level_comment() {
        let comments = FakeCommentRepo::default();
        let posts = FakePostRepo::with_post(sample_post(5, 2));
        let service = CommentService::new(comments.clone(), posts);

        let req = CreateCommentRequest {
            content: "  hello  ".to_string(),
            parent_comment_id: None,
        };
        service
            .create_comment(1, 5, req)
            .await
            .expect("create must succeed");

        let created = comments
            .created_input
            .lock()
            .expect("created_input mutex poisoned")
            .clone()
            .expect("create_comment must be called");
        assert_eq!(created.content, "hello");
        assert_eq!(created.post_id, 5);
        assert_eq!(created.author_id, 1);
        assert!(created.parent_comment_id.is_none());
    }

    #[tokio::test]
    async fn reply_requires_existing_parent() {
        let comments = FakeCommentRepo::default();
        let posts = FakePostRepo::with_post(sample_post(5, 2));
        let service = CommentService::new(comments, posts);

        let req = CreateCommentRequest {
            content: "reply".to_string(),
            parent_comment_id: Some(3),
        };
        let err = service
            .create_comment(1, 5, req)
            .await
            .expect_err("parent must be missing");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn reply_parent_must_belong_to_same_post() {
        let comments = FakeCommentRepo::with_comment(sample_comment(3, 2, 99, None));
        let posts = FakePostRepo::with_post(sample_post(5, 2));
        let service = CommentService::new(comments, posts);

        let req = CreateCommentRequest {
            content: "reply".to_string(),
            parent_comment_id: Some(3),
        };
        let err = service
            .create_comment(1, 5, req)
            .await
            .expect_err("cross-post parent must be rejected");
        assert!(matches!(
            err,
            DomainError::Validation {
                field: "parentCommentId",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn reply_to_a_reply_is_rejected() {
        let comments = FakeCommentRepo::with_comment(sample_comment(3, 2, 5, Some(1)));
        let posts = FakePostRepo::with_post(sample_post(5, 2));
        let service = CommentService::new(comments, posts);

        let req = CreateCommentRequest {
            content: "reply".to_string(),
            parent_comment_id: Some(3),
        };
        let err = service
            .create_comment(1, 5, req)
            .await
            .expect_err("nested reply must be rejected");
        assert!(matches!(
            err,
            DomainError::Validation {
                field: "parentCommentId",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn reply_to_top_level_comment_is_accepted() {
        let comments = FakeCommentRepo::with_comment(sample_comment(3, 2, 5, None));
        let posts = FakePostRepo::with_post(sample_post(5, 2));
        let service = CommentService::new(comments.clone(), posts);

        let req = CreateCommentRequest {
            content: "reply".to_string(),
            parent_comment_id: Some(3),
        };
        service
            .create_comment(1, 5, req)
            .await
            .expect("reply must succeed");

        let created = comments
            .created_input
            .lock()
            .expect("created_input mutex poisoned")
            .clone()
            .expect("create_comment must be called");
        assert_eq!(created.parent_comment_id, Some(3));
    }

    #[tokio::test]
    async fn update_comment_rejects_non_owner() {
        let comments = FakeCommentRepo::with_comment(sample_comment(3, 2, 5, None));
        let service = CommentService::new(comments.clone(), FakePostRepo::default());

        let actor = Actor {
            id: 1,
            role: Role::User,
        };
        let req = UpdateCommentRequest {
            content: "edited".to_string(),
        };
        let err = service
            .update_comment(&actor, 3, req)
            .await
            .expect_err("must be forbidden");
        assert!(matches!(err, DomainError::Forbidden));
        assert!(
            comments
                .updated_content
                .lock()
                .expect("updated_content mutex poisoned")
                .is_none()
        );
    }

    #[tokio::test]
    async fn update_comment_allows_owner() {
        let comments = FakeCommentRepo::with_comment(sample_comment(3, 2, 5, None));
        let service = CommentService::new(comments.clone(), FakePostRepo::default());

        let actor = Actor {
            id: 2,
            role: Role::User,
        };
        let req = UpdateCommentRequest {
            content: "  edited  ".to_string(),
        };
        service
            .update_comment(&actor, 3, req)
            .await
            .expect("update must succeed");

        let (id, content) = comments
            .updated_content
            .lock()
            .expect("updated_content mutex poisoned")
            .clone()
            .expect("update must be captured");
        assert_eq!(id, 3);
        assert_eq!(content, "edited");
    }

    #[tokio::test]
    async fn delete_comment_allows_admin() {
        let comments = FakeCommentRepo::with_comment(sample_comment(3, 2, 5, None));
        let service = CommentService::new(comments, FakePostRepo::default());

        let actor = Actor {
            id: 42,
            role: Role::Admin,
        };
        service
            .delete_comment(&actor, 3)
            .await
            .expect("admin delete must succeed");
    }

    #[tokio::test]
    async fn toggle_like_returns_not_found_for_unknown_comment() {
        let service = CommentService::new(FakeCommentRepo::default(), FakePostRepo::default());
        let err = service
            .toggle_like(3, 1)
            .await
            .expect_err("comment must be missing");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    fn sample_comment(
        id: i64,
        author_id: i64,
        post_id: i64,
        parent_comment_id: Option<i64>,
    ) -> Comment {
        Comment {
            id,
            content: "content".to_string(),
            author_id,
            post_id,
            parent_comment_id,
            is_approved: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_view(comment: Comment) -> CommentView {
        let author = CommentAuthor {
            id: comment.author_id,
            username: "author".to_string(),
            avatar: String::new(),
        };
        CommentView {
            comment,
            author,
            like_count: 0,
        }
    }

    fn sample_post(id: i64, author_id: i64) -> Post {
        Post {
            id,
            title: "Title".to_string(),
            content: "content".to_string(),
            excerpt: "excerpt".to_string(),
            featured_image: String::new(),
            author_id,
            tags: Vec::new(),
            is_published: true,
            published_at: Utc::now(),
            slug: "title".to_string(),
            view_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}
