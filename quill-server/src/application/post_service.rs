use crate::data::Pagination;
use crate::data::category_repository::CategoryRepository;
use crate::data::post_repository::{NewPost, PostFilter, PostPatch, PostRepository, PostSort};
use crate::domain::error::DomainError;
use crate::domain::like::LikeOutcome;
use crate::domain::post::{
    CreatePostRequest, PostView, UpdatePostRequest, derive_excerpt, slugify,
};
use crate::domain::user::Actor;

const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Default)]
pub(crate) struct ListPostsQuery {
    pub(crate) page: Option<u32>,
    pub(crate) limit: Option<u32>,
    pub(crate) category: Option<String>,
    pub(crate) search: Option<String>,
    pub(crate) author_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub(crate) struct PostPage {
    pub(crate) posts: Vec<PostView>,
    pub(crate) page: u32,
    pub(crate) page_size: u32,
    pub(crate) total: i64,
}

impl PostPage {
    pub(crate) fn total_pages(&self) -> i64 {
        let size = i64::from(self.page_size.max(1));
        (self.total + size - 1) / size
    }

    pub(crate) fn has_next(&self) -> bool {
        i64::from(self.page) < self.total_pages()
    }

    pub(crate) fn has_prev(&self) -> bool {
        self.page > 1
    }
}

pub(crate) struct PostService<P: PostRepository, C: CategoryRepository> {
    posts: P,
    categories: C,
}

impl<P: PostRepository, C: CategoryRepository> PostService<P, C> {
    pub(crate) fn new(posts: P, categories: C) -> Self {
        Self { posts, categories }
    }

    pub(crate) async fn create_post(
        &self,
        author_id: i64,
        req: CreatePostRequest,
    ) -> Result<PostView, DomainError> {
        let req = req.validate()?;

        let slug = slugify(&req.title);
        let excerpt = match req.excerpt {
            Some(excerpt) if !excerpt.is_empty() => excerpt,
            _ => derive_excerpt(&req.content),
        };

        let new_post = NewPost {
            title: req.title,
            content: req.content,
            excerpt,
            featured_image: req.featured_image.unwrap_or_default(),
            author_id,
            category_ids: req.category_ids,
            tags: req.tags,
            is_published: req.is_published,
            slug,
        };
        self.posts.create_post(new_post).await
    }

    /// Every successful read counts as a view, so the counter is bumped
    /// before the post is loaded.
    pub(crate) async fn get_post(&self, id: i64) -> Result<PostView, DomainError> {
        if !self.posts.increment_view_count(id).await? {
            return Err(DomainError::NotFound(format!("post id: {id}")));
        }
        self.posts
            .get_post_view(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {id}")))
    }

    pub(crate) async fn update_post(
        &self,
        actor: &Actor,
        id: i64,
        req: UpdatePostRequest,
    ) -> Result<PostView, DomainError> {
        let req = req.validate()?;

        let post = self
            .posts
            .get_post(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {id}")))?;
        if !actor.can_mutate(post.author_id) {
            return Err(DomainError::Forbidden);
        }

        // The slug follows the title, so a title change recomputes it.
        let slug = req
            .title
            .as_ref()
            .filter(|title| **title != post.title)
            .map(|title| slugify(title));

        let patch = PostPatch {
            title: req.title,
            content: req.content,
            excerpt: req.excerpt,
            featured_image: req.featured_image,
            category_ids: req.category_ids,
            tags: req.tags,
            is_published: req.is_published,
            slug,
        };
        self.posts
            .update_post(id, patch)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {id}")))
    }

    pub(crate) async fn delete_post(&self, actor: &Actor, id: i64) -> Result<(), DomainError> {
        let post = self
            .posts
            .get_post(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {id}")))?;
        if !actor.can_mutate(post.author_id) {
            return Err(DomainError::Forbidden);
        }

        if !self.posts.delete_post(id).await? {
            return Err(DomainError::NotFound(format!("post id: {id}")));
        }
        Ok(())
    }

    pub(crate) async fn toggle_like(
        &self,
        post_id: i64,
        user_id: i64,
    ) -> Result<LikeOutcome, DomainError> {
        self.posts
            .toggle_like(post_id, user_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post id: {post_id}")))
    }

    /// Public listing: published posts only, newest publication first.
    pub(crate) async fn list_posts(&self, query: ListPostsQuery) -> Result<PostPage, DomainError> {
        // A category name nobody uses must not hide every post, so an
        // unresolved name simply drops the predicate.
        let category_id = match query.category.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => self
                .categories
                .find_by_name(name)
                .await?
                .map(|category| category.id),
            _ => None,
        };

        let filter = PostFilter {
            category_id,
            search: query
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            author_id: query.author_id,
            published_only: true,
            sort: PostSort::PublishedAtDesc,
        };
        self.page(&filter, query.page, query.limit).await
    }

    /// Posts by one author. Drafts stay hidden unless the author is the
    /// one asking.
    pub(crate) async fn list_user_posts(
        &self,
        user_id: i64,
        viewer: Option<&Actor>,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<PostPage, DomainError> {
        let is_author = viewer.is_some_and(|actor| actor.id == user_id);
        let filter = PostFilter {
            category_id: None,
            search: None,
            author_id: Some(user_id),
            published_only: !is_author,
            sort: PostSort::CreatedAtDesc,
        };
        self.page(&filter, page, limit).await
    }

    async fn page(
        &self,
        filter: &PostFilter,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<PostPage, DomainError> {
        let page = page.unwrap_or(1).max(1);
        let page_size = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let pagination = Pagination { page, page_size };

        let posts = self.posts.list_posts(filter, pagination).await?;
        let total = self.posts.count_posts(filter).await?;

        Ok(PostPage {
            posts,
            page,
            page_size,
            total,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::Utc;

    use super::{ListPostsQuery, PostPage, PostService};
    use crate::data::Pagination;
    use crate::data::category_repository::{CategoryPatch, CategoryRepository, NewCategory};
    use crate::data::post_repository::{
        NewPost, PostFilter, PostPatch, PostRepository, PostSort,
    };
    use crate::domain::category::Category;
    use crate::domain::error::DomainError;
    use crate::domain::like::LikeOutcome;
    use crate::domain::post::{
        CategoryRef, CreatePostRequest, Post, PostAuthor, PostView, UpdatePostRequest,
    };
    use crate::domain::user::{Actor, Role};

    #[derive(Clone, Default)]
    struct FakePostRepo {
        stored_post: Arc<Mutex<Option<Post>>>,
        created_input: Arc<Mutex<Option<NewPost>>>,
        applied_patch: Arc<Mutex<Option<PostPatch>>>,
        seen_filter: Arc<Mutex<Option<PostFilter>>>,
        seen_pagination: Arc<Mutex<Option<Pagination>>>,
        view_bumps: Arc<Mutex<Vec<i64>>>,
        like_outcome: Arc<Mutex<Option<LikeOutcome>>>,
        total: Arc<Mutex<i64>>,
    }

    impl FakePostRepo {
        fn with_post(post: Post) -> Self {
            let repo = Self::default();
            *repo.stored_post.lock().expect("stored_post mutex poisoned") = Some(post);
            repo
        }

        fn view(&self) -> PostView {
            let post = self
                .stored_post
                .lock()
                .expect("stored_post mutex poisoned")
                .clone()
                .unwrap_or_else(|| sample_post(1, 1, "Fallback", "fallback"));
            sample_view(post)
        }
    }

    #[async_trait]
    impl PostRepository for FakePostRepo {
        async fn create_post(&self, input: NewPost) -> Result<PostView, DomainError> {
            let view = sample_view(sample_post(1, input.author_id, &input.title, &input.slug));
            *self
                .created_input
                .lock()
                .expect("created_input mutex poisoned") = Some(input);
            Ok(view)
        }

        async fn get_post(&self, _id: i64) -> Result<Option<Post>, DomainError> {
            Ok(self
                .stored_post
                .lock()
                .expect("stored_post mutex poisoned")
                .clone())
        }

        async fn get_post_view(&self, _id: i64) -> Result<Option<PostView>, DomainError> {
            let post = self
                .stored_post
                .lock()
                .expect("stored_post mutex poisoned")
                .clone();
            Ok(post.map(sample_view))
        }

        async fn update_post(
            &self,
            _id: i64,
            patch: PostPatch,
        ) -> Result<Option<PostView>, DomainError> {
            *self
                .applied_patch
                .lock()
                .expect("applied_patch mutex poisoned") = Some(patch);
            Ok(Some(self.view()))
        }

        async fn delete_post(&self, _id: i64) -> Result<bool, DomainError> {
            Ok(self
                .stored_post
                .lock()
                .expect("stored_post mutex poisoned")
                .take()
                .is_some())
        }

        async fn list_posts(
            &self,
            filter: &PostFilter,
            pagination: Pagination,
        ) -> Result<Vec<PostView>, DomainError> {
            *self.seen_filter.lock().expect("seen_filter mutex poisoned") =
                Some(filter.clone());
            *self
                .seen_pagination
                .lock()
                .expect("seen_pagination mutex poisoned") = Some(pagination);
            Ok(Vec::new())
        }

        async fn count_posts(&self, _filter: &PostFilter) -> Result<i64, DomainError> {
            Ok(*self.total.lock().expect("total mutex poisoned"))
        }

        async fn increment_view_count(&self, id: i64) -> Result<bool, DomainError> {
            self.view_bumps
                .lock()
                .expect("view_bumps mutex poisoned")
                .push(id);
            Ok(self
                .stored_post
                .lock()
                .expect("stored_post mutex poisoned")
                .is_some())
        }

        async fn toggle_like(
            &self,
            _post_id: i64,
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
    struct FakeCategoryRepo {
        found: Arc<Mutex<Option<Category>>>,
        looked_up: Arc<Mutex<Option<String>>>,
    }

    #[async_trait]
    impl CategoryRepository for FakeCategoryRepo {
        async fn create_category(&self, _input: NewCategory) -> Result<Category, DomainError> {
            unimplemented!("not exercised")
        }

        async fn list_active(&self) -> Result<Vec<Category>, DomainError> {
            Ok(Vec::new())
        }

        async fn find_by_name(&self, name: &str) -> Result<Option<Category>, DomainError> {
            *self.looked_up.lock().expect("looked_up mutex poisoned") = Some(name.to_string());
            Ok(self.found.lock().expect("found mutex poisoned").clone())
        }

        async fn update_category(
            &self,
            _id: i64,
            _patch: CategoryPatch,
        ) -> Result<Option<Category>, DomainError> {
            unimplemented!("not exercised")
        }

        async fn deactivate_category(&self, _id: i64) -> Result<bool, DomainError> {
            unimplemented!("not exercised")
        }
    }

    #[tokio::test]
    async fn create_post_derives_slug_and_excerpt() {
        let repo = FakePostRepo::default();
        let service = PostService::new(repo.clone(), FakeCategoryRepo::default());

        let req = CreatePostRequest {
            title: "Hello, World! 2024".to_string(),
            content: "c".repeat(400),
            excerpt: None,
            category_ids: vec![2],
            tags: vec!["rust".to_string()],
            is_published: true,
            featured_image: None,
        };
        service.create_post(7, req).await.expect("create must succeed");

        let created = repo
            .created_input
            .lock()
            .expect("created_input mutex poisoned")
            .clone()
            .expect("create_post must be called");
        assert_eq!(created.slug, "hello-world-2024");
        assert_eq!(created.excerpt.chars().count(), 153);
        assert!(created.excerpt.ends_with("..."));
        assert_eq!(created.author_id, 7);
        assert_eq!(created.featured_image, "");
    }

    #[tokio::test]
    async fn create_post_keeps_explicit_excerpt() {
        let repo = FakePostRepo::default();
        let service = PostService::new(repo.clone(), FakeCategoryRepo::default());

        let req = CreatePostRequest {
            title: "Title".to_string(),
            content: "content".to_string(),
            excerpt: Some("hand written".to_string()),
            category_ids: Vec::new(),
            tags: Vec::new(),
            is_published: false,
            featured_image: Some("/uploads/x.png".to_string()),
        };
        service.create_post(7, req).await.expect("create must succeed");

        let created = repo
            .created_input
            .lock()
            .expect("created_input mutex poisoned")
            .clone()
            .expect("create_post must be called");
        assert_eq!(created.excerpt, "hand written");
        assert_eq!(created.featured_image, "/uploads/x.png");
    }

    #[tokio::test]
    async fn get_post_bumps_view_counter() {
        let repo = FakePostRepo::with_post(sample_post(5, 1, "Title", "title"));
        let service = PostService::new(repo.clone(), FakeCategoryRepo::default());

        service.get_post(5).await.expect("get must succeed");

        let bumps = repo
            .view_bumps
            .lock()
            .expect("view_bumps mutex poisoned")
            .clone();
        assert_eq!(bumps, vec![5]);
    }

    #[tokio::test]
    async fn get_post_returns_not_found_for_unknown_id() {
        let service = PostService::new(FakePostRepo::default(), FakeCategoryRepo::default());
        let err = service.get_post(5).await.expect_err("post must be missing");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_post_rejects_non_owner() {
        let repo = FakePostRepo::with_post(sample_post(5, 1, "Title", "title"));
        let service = PostService::new(repo.clone(), FakeCategoryRepo::default());

        let actor = Actor {
            id: 2,
            role: Role::User,
        };
        let err = service
            .update_post(&actor, 5, UpdatePostRequest::default())
            .await
            .expect_err("must be forbidden");
        assert!(matches!(err, DomainError::Forbidden));
        assert!(
            repo.applied_patch
                .lock()
                .expect("applied_patch mutex poisoned")
                .is_none()
        );
    }

    #[tokio::test]
    async fn update_post_allows_admin() {
        let repo = FakePostRepo::with_post(sample_post(5, 1, "Title", "title"));
        let service = PostService::new(repo.clone(), FakeCategoryRepo::default());

        let actor = Actor {
            id: 99,
            role: Role::Admin,
        };
        service
            .update_post(&actor, 5, UpdatePostRequest::default())
            .await
            .expect("admin update must succeed");
    }

    #[tokio::test]
    async fn update_post_recomputes_slug_when_title_changes() {
        let repo = FakePostRepo::with_post(sample_post(5, 1, "Old Title", "old-title"));
        let service = PostService::new(repo.clone(), FakeCategoryRepo::default());

        let actor = Actor {
            id: 1,
            role: Role::User,
        };
        let req = UpdatePostRequest {
            title: Some("Fresh Title".to_string()),
            ..Default::default()
        };
        service
            .update_post(&actor, 5, req)
            .await
            .expect("update must succeed");

        let patch = repo
            .applied_patch
            .lock()
            .expect("applied_patch mutex poisoned")
            .clone()
            .expect("patch must be captured");
        assert_eq!(patch.slug.as_deref(), Some("fresh-title"));
    }

    #[tokio::test]
    async fn update_post_keeps_slug_when_title_is_unchanged() {
        let repo = FakePostRepo::with_post(sample_post(5, 1, "Same Title", "same-title"));
        let service = PostService::new(repo.clone(), FakeCategoryRepo::default());

        let actor = Actor {
            id: 1,
            role: Role::User,
        };
        let req = UpdatePostRequest {
            title: Some("Same Title".to_string()),
            content: Some("new body".to_string()),
            ..Default::default()
        };
        service
            .update_post(&actor, 5, req)
            .await
            .expect("update must succeed");

        let patch = repo
            .applied_patch
            .lock()
            .expect("applied_patch mutex poisoned")
            .clone()
            .expect("patch must be captured");
        assert!(patch.slug.is_none());
        assert_eq!(patch.content.as_deref(), Some("new body"));
    }

    #[tokio::test]
    async fn delete_post_rejects_non_owner() {
        let repo = FakePostRepo::with_post(sample_post(5, 1, "Title", "title"));
        let service = PostService::new(repo, FakeCategoryRepo::default());

        let actor = Actor {
            id: 3,
            role: Role::User,
        };
        let err = service
            .delete_post(&actor, 5)
            .await
            .expect_err("must be forbidden");
        assert!(matches!(err, DomainError::Forbidden));
    }

    #[tokio::test]
    async fn toggle_like_returns_not_found_for_unknown_post() {
        let service = PostService::new(FakePostRepo::default(), FakeCategoryRepo::default());
        let err = service
            .toggle_like(5, 1)
            .await
            .expect_err("post must be missing");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn toggle_like_passes_outcome_through() {
        let repo = FakePostRepo::default();
        *repo
            .like_outcome
            .lock()
            .expect("like_outcome mutex poisoned") = Some(LikeOutcome {
            like_count: 3,
            has_liked: true,
        });
        let service = PostService::new(repo, FakeCategoryRepo::default());

        let outcome = service.toggle_like(5, 1).await.expect("toggle must succeed");
        assert_eq!(outcome.like_count, 3);
        assert!(outcome.has_liked);
    }

    #[tokio::test]
    async fn list_posts_drops_unknown_category_filter() {
        let repo = FakePostRepo::default();
        let categories = FakeCategoryRepo::default();
        let service = PostService::new(repo.clone(), categories.clone());

        let query = ListPostsQuery {
            category: Some("no-such-category".to_string()),
            ..Default::default()
        };
        service.list_posts(query).await.expect("list must succeed");

        let filter = repo
            .seen_filter
            .lock()
            .expect("seen_filter mutex poisoned")
            .clone()
            .expect("filter must be captured");
        assert!(filter.category_id.is_none());
        assert!(filter.published_only);
        assert_eq!(filter.sort, PostSort::PublishedAtDesc);
    }

    #[tokio::test]
    async fn list_posts_resolves_category_and_clamps_paging() {
        let repo = FakePostRepo::default();
        let categories = FakeCategoryRepo::default();
        *categories.found.lock().expect("found mutex poisoned") = Some(Category {
            id: 9,
            name: "Rust".to_string(),
            description: String::new(),
            color: "#FF8800".to_string(),
            is_active: true,
            created_at: Utc::now(),
        });
        let service = PostService::new(repo.clone(), categories.clone());

        let query = ListPostsQuery {
            page: Some(0),
            limit: Some(1000),
            category: Some("rust".to_string()),
            search: Some("  async  ".to_string()),
            author_id: None,
        };
        service.list_posts(query).await.expect("list must succeed");

        let filter = repo
            .seen_filter
            .lock()
            .expect("seen_filter mutex poisoned")
            .clone()
            .expect("filter must be captured");
        assert_eq!(filter.category_id, Some(9));
        assert_eq!(filter.search.as_deref(), Some("async"));

        let pagination = repo
            .seen_pagination
            .lock()
            .expect("seen_pagination mutex poisoned")
            .expect("pagination must be captured");
        assert_eq!(pagination.page, 1);
        assert_eq!(pagination.page_size, 100);
    }

    #[tokio::test]
    async fn list_user_posts_hides_drafts_from_other_viewers() {
        let repo = FakePostRepo::default();
        let service = PostService::new(repo.clone(), FakeCategoryRepo::default());

        let stranger = Actor {
            id: 2,
            role: Role::User,
        };
        service
            .list_user_posts(1, Some(&stranger), None, None)
            .await
            .expect("list must succeed");

        let filter = repo
            .seen_filter
            .lock()
            .expect("seen_filter mutex poisoned")
            .clone()
            .expect("filter must be captured");
        assert_eq!(filter.author_id, Some(1));
        assert!(filter.published_only);
        assert_eq!(filter.sort, PostSort::CreatedAtDesc);
    }

    #[tokio::test]
    async fn list_user_posts_shows_author_their_drafts() {
        let repo = FakePostRepo::default();
        let service = PostService::new(repo.clone(), FakeCategoryRepo::default());

        let author = Actor {
            id: 1,
            role: Role::User,
        };
        service
            .list_user_posts(1, Some(&author), None, None)
            .await
            .expect("list must succeed");

        let filter = repo
            .seen_filter
            .lock()
            .expect("seen_filter mutex poisoned")
            .clone()
            .expect("filter must be captured");
        assert!(!filter.published_only);
    }

    #[test]
    fn page_math_matches_totals() {
        let page = PostPage {
            posts: Vec::new(),
            page: 2,
            page_size: 10,
            total: 25,
        };
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_next());
        assert!(page.has_prev());

        let last = PostPage {
            posts: Vec::new(),
            page: 3,
            page_size: 10,
            total: 25,
        };
        assert!(!last.has_next());

        let empty = PostPage {
            posts: Vec::new(),
            page: 1,
            page_size: 10,
            total: 0,
        };
        assert_eq!(empty.total_pages(), 0);
        assert!(!empty.has_next());
        assert!(!empty.has_prev());
    }

    fn sample_post(id: i64, author_id: i64, title: &str, slug: &str) -> Post {
        Post {
            id,
            title: title.to_string(),
            content: "content".to_string(),
            excerpt: "excerpt".to_string(),
            featured_image: String::new(),
            author_id,
            tags: Vec::new(),
            is_published: true,
            published_at: Utc::now(),
            slug: slug.to_string(),
            view_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_view(post: Post) -> PostView {
        let author = PostAuthor {
            id: post.author_id,
            username: "author".to_string(),
            avatar: String::new(),
        };
        PostView {
            post,
            author,
            categories: vec![CategoryRef {
                id: 2,
                name: "Rust".to_string(),
                color: "#FF8800".to_string(),
            }],
            comment_count: 0,
            like_count: 0,
        }
    }
}
