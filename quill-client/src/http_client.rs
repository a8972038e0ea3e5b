use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::{QuillClientError, QuillClientResult};
use crate::models::{
    AuthResponse, Category, Comment, CommentThread, LikeStatus, Pagination, Post, PostDraft,
    PostList, PostQuery, PostUpdate, User, UserList, UserProfile,
};

#[derive(Debug, Serialize)]
struct RegisterRequestDto<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct LoginRequestDto<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct ProfileUpdateDto<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    avatar: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bio: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateCommentDto<'a> {
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_comment_id: Option<i64>,
}

#[derive(Debug, Serialize)]
struct UpdateCommentDto<'a> {
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct CategoryDto<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponseDto {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthEnvelope {
    user: User,
    token: String,
}

#[derive(Debug, Deserialize)]
struct UserEnvelope {
    user: User,
}

#[derive(Debug, Deserialize)]
struct ProfileEnvelope {
    user: UserProfile,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostsPaginationDto {
    current_page: u32,
    total_pages: i64,
    total_posts: i64,
    has_next: bool,
    has_prev: bool,
}

#[derive(Debug, Deserialize)]
struct PostsEnvelope {
    posts: Vec<Post>,
    pagination: PostsPaginationDto,
}

#[derive(Debug, Deserialize)]
struct PostEnvelope {
    post: Post,
}

#[derive(Debug, Deserialize)]
struct CommentsEnvelope {
    comments: Vec<CommentThread>,
}

#[derive(Debug, Deserialize)]
struct CommentEnvelope {
    comment: Comment,
}

#[derive(Debug, Deserialize)]
struct CategoriesEnvelope {
    categories: Vec<Category>,
}

#[derive(Debug, Deserialize)]
struct CategoryEnvelope {
    category: Category,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LikeEnvelope {
    like_count: i64,
    has_liked: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsersPaginationDto {
    current_page: u32,
    total_pages: i64,
    total_users: i64,
    has_next: bool,
    has_prev: bool,
}

#[derive(Debug, Deserialize)]
struct UsersEnvelope {
    users: Vec<UserProfile>,
    pagination: UsersPaginationDto,
}

impl From<PostsEnvelope> for PostList {
    fn from(value: PostsEnvelope) -> Self {
        Self {
            posts: value.posts,
            total: value.pagination.total_posts,
            pagination: Pagination {
                current_page: value.pagination.current_page,
                total_pages: value.pagination.total_pages,
                has_next: value.pagination.has_next,
                has_prev: value.pagination.has_prev,
            },
        }
    }
}

impl From<UsersEnvelope> for UserList {
    fn from(value: UsersEnvelope) -> Self {
        Self {
            users: value.users,
            total: value.pagination.total_users,
            pagination: Pagination {
                current_page: value.pagination.current_page,
                total_pages: value.pagination.total_pages,
                has_next: value.pagination.has_next,
                has_prev: value.pagination.has_prev,
            },
        }
    }
}

impl From<LikeEnvelope> for LikeStatus {
    fn from(value: LikeEnvelope) -> Self {
        Self {
            like_count: value.like_count,
            has_liked: value.has_liked,
        }
    }
}

#[derive(Debug, Clone)]
/// HTTP-клиент для работы с REST API `quill-server`.
pub(crate) struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    pub(crate) fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()
            .expect("failed to build reqwest client");

        Self {
            base_url: base_url.into(),
            client,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn decode_error(response: reqwest::Response) -> QuillClientError {
        let status = response.status();

        let message = match response.json::<ErrorResponseDto>().await {
            Ok(body) => body
                .message
                .unwrap_or_else(|| format!("http status {status}")),
            Err(_) => format!("http status {status}"),
        };
        QuillClientError::from_http_status(status, Some(message))
    }

    async fn finish<TRes>(response: reqwest::Response) -> QuillClientResult<TRes>
    where
        TRes: DeserializeOwned,
    {
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }
        response
            .json::<TRes>()
            .await
            .map_err(QuillClientError::from_reqwest)
    }

    /// универсальный helper для отправки запросов с json-payload
    async fn send_json<TReq, TRes>(
        &self,
        method: Method,
        path: &str,
        body: &TReq,
        token: Option<&str>,
    ) -> QuillClientResult<TRes>
    where
        TReq: Serialize,
        TRes: DeserializeOwned,
    {
        let url = self.endpoint(path);

        let mut request = self.client.request(method, url).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(QuillClientError::from_reqwest)?;
        Self::finish(response).await
    }

    async fn send_bare<TRes>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        token: Option<&str>,
    ) -> QuillClientResult<TRes>
    where
        TRes: DeserializeOwned,
    {
        let url = self.endpoint(path);

        let mut request = self.client.request(method, url);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(QuillClientError::from_reqwest)?;
        Self::finish(response).await
    }

    async fn send_multipart<TRes>(
        &self,
        method: Method,
        path: &str,
        form: Form,
        token: &str,
    ) -> QuillClientResult<TRes>
    where
        TRes: DeserializeOwned,
    {
        let url = self.endpoint(path);

        let response = self
            .client
            .request(method, url)
            .multipart(form)
            .bearer_auth(token)
            .send()
            .await
            .map_err(QuillClientError::from_reqwest)?;
        Self::finish(response).await
    }

    pub(crate) async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> QuillClientResult<AuthResponse> {
        let payload = RegisterRequestDto {
            username,
            email,
            password,
        };
        let envelope: AuthEnvelope = self
            .send_json(Method::POST, "/api/auth/register", &payload, None)
            .await?;
        Ok(AuthResponse {
            token: envelope.token,
            user: envelope.user,
        })
    }

    pub(crate) async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> QuillClientResult<AuthResponse> {
        let payload = LoginRequestDto { email, password };
        let envelope: AuthEnvelope = self
            .send_json(Method::POST, "/api/auth/login", &payload, None)
            .await?;
        Ok(AuthResponse {
            token: envelope.token,
            user: envelope.user,
        })
    }

    pub(crate) async fn me(&self, token: &str) -> QuillClientResult<User> {
        let envelope: UserEnvelope = self
            .send_bare(Method::GET, "/api/auth/me", &[], Some(token))
            .await?;
        Ok(envelope.user)
    }

    pub(crate) async fn update_profile(
        &self,
        token: &str,
        avatar: Option<&str>,
        bio: Option<&str>,
    ) -> QuillClientResult<User> {
        let payload = ProfileUpdateDto { avatar, bio };
        let envelope: UserEnvelope = self
            .send_json(Method::PUT, "/api/auth/profile", &payload, Some(token))
            .await?;
        Ok(envelope.user)
    }

    pub(crate) async fn list_posts(&self, query: &PostQuery) -> QuillClientResult<PostList> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(page) = query.page {
            params.push(("page", page.to_string()));
        }
        if let Some(limit) = query.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(category) = &query.category {
            params.push(("category", category.clone()));
        }
        if let Some(search) = &query.search {
            params.push(("search", search.clone()));
        }
        if let Some(author) = query.author {
            params.push(("author", author.to_string()));
        }

        let envelope: PostsEnvelope = self
            .send_bare(Method::GET, "/api/posts", &params, None)
            .await?;
        Ok(envelope.into())
    }

    pub(crate) async fn get_post(&self, id: i64) -> QuillClientResult<Post> {
        let envelope: PostEnvelope = self
            .send_bare(Method::GET, &format!("/api/posts/{id}"), &[], None)
            .await?;
        Ok(envelope.post)
    }

    pub(crate) async fn create_post(
        &self,
        token: &str,
        draft: PostDraft,
    ) -> QuillClientResult<Post> {
        let mut form = Form::new()
            .text("title", draft.title)
            .text("content", draft.content);
        if let Some(excerpt) = draft.excerpt {
            form = form.text("excerpt", excerpt);
        }
        if !draft.category_ids.is_empty() {
            form = form.text("categories", join_ids(&draft.category_ids));
        }
        if !draft.tags.is_empty() {
            form = form.text("tags", draft.tags.join(","));
        }
        if let Some(is_published) = draft.is_published {
            form = form.text("isPublished", is_published.to_string());
        }
        if let Some(image) = draft.image {
            form = form.part(
                "featuredImage",
                Part::bytes(image.bytes).file_name(image.file_name),
            );
        }

        let envelope: PostEnvelope = self
            .send_multipart(Method::POST, "/api/posts", form, token)
            .await?;
        Ok(envelope.post)
    }

    pub(crate) async fn update_post(
        &self,
        token: &str,
        id: i64,
        update: PostUpdate,
    ) -> QuillClientResult<Post> {
        let mut form = Form::new();
        if let Some(title) = update.title {
            form = form.text("title", title);
        }
        if let Some(content) = update.content {
            form = form.text("content", content);
        }
        if let Some(excerpt) = update.excerpt {
            form = form.text("excerpt", excerpt);
        }
        if let Some(category_ids) = update.category_ids {
            form = form.text("categories", join_ids(&category_ids));
        }
        if let Some(tags) = update.tags {
            form = form.text("tags", tags.join(","));
        }
        if let Some(is_published) = update.is_published {
            form = form.text("isPublished", is_published.to_string());
        }
        if let Some(image) = update.image {
            form = form.part(
                "featuredImage",
                Part::bytes(image.bytes).file_name(image.file_name),
            );
        }

        let envelope: PostEnvelope = self
            .send_multipart(Method::PUT, &format!("/api/posts/{id}"), form, token)
            .await?;
        Ok(envelope.post)
    }

    pub(crate) async fn delete_post(&self, token: &str, id: i64) -> QuillClientResult<()> {
        let _: serde_json::Value = self
            .send_bare(
                Method::DELETE,
                &format!("/api/posts/{id}"),
                &[],
                Some(token),
            )
            .await?;
        Ok(())
    }

    pub(crate) async fn toggle_post_like(
        &self,
        token: &str,
        id: i64,
    ) -> QuillClientResult<LikeStatus> {
        let envelope: LikeEnvelope = self
            .send_bare(
                Method::POST,
                &format!("/api/posts/{id}/like"),
                &[],
                Some(token),
            )
            .await?;
        Ok(envelope.into())
    }

    pub(crate) async fn list_user_posts(
        &self,
        user_id: i64,
        page: Option<u32>,
        limit: Option<u32>,
        token: Option<&str>,
    ) -> QuillClientResult<PostList> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(page) = page {
            params.push(("page", page.to_string()));
        }
        if let Some(limit) = limit {
            params.push(("limit", limit.to_string()));
        }

        let envelope: PostsEnvelope = self
            .send_bare(
                Method::GET,
                &format!("/api/posts/user/{user_id}"),
                &params,
                token,
            )
            .await?;
        Ok(envelope.into())
    }

    pub(crate) async fn list_comments(
        &self,
        post_id: i64,
    ) -> QuillClientResult<Vec<CommentThread>> {
        let envelope: CommentsEnvelope = self
            .send_bare(
                Method::GET,
                &format!("/api/comments/post/{post_id}"),
                &[],
                None,
            )
            .await?;
        Ok(envelope.comments)
    }

    pub(crate) async fn create_comment(
        &self,
        token: &str,
        post_id: i64,
        content: &str,
        parent_comment_id: Option<i64>,
    ) -> QuillClientResult<Comment> {
        let payload = CreateCommentDto {
            content,
            parent_comment_id,
        };
        let envelope: CommentEnvelope = self
            .send_json(
                Method::POST,
                &format!("/api/comments/post/{post_id}"),
                &payload,
                Some(token),
            )
            .await?;
        Ok(envelope.comment)
    }

    pub(crate) async fn update_comment(
        &self,
        token: &str,
        id: i64,
        content: &str,
    ) -> QuillClientResult<Comment> {
        let payload = UpdateCommentDto { content };
        let envelope: CommentEnvelope = self
            .send_json(
                Method::PUT,
                &format!("/api/comments/{id}"),
                &payload,
                Some(token),
            )
            .await?;
        Ok(envelope.comment)
    }

    pub(crate) async fn delete_comment(&self, token: &str, id: i64) -> QuillClientResult<()> {
        let _: serde_json::Value = self
            .send_bare(
                Method::DELETE,
                &format!("/api/comments/{id}"),
                &[],
                Some(token),
            )
            .await?;
        Ok(())
    }

    pub(crate) async fn toggle_comment_like(
        &self,
        token: &str,
        id: i64,
    ) -> QuillClientResult<LikeStatus> {
        let envelope: LikeEnvelope = self
            .send_bare(
                Method::POST,
                &format!("/api/comments/{id}/like"),
                &[],
                Some(token),
            )
            .await?;
        Ok(envelope.into())
    }

    pub(crate) async fn list_categories(&self) -> QuillClientResult<Vec<Category>> {
        let envelope: CategoriesEnvelope = self
            .send_bare(Method::GET, "/api/categories", &[], None)
            .await?;
        Ok(envelope.categories)
    }

    pub(crate) async fn create_category(
        &self,
        token: &str,
        name: &str,
        description: Option<&str>,
        color: Option<&str>,
    ) -> QuillClientResult<Category> {
        let payload = CategoryDto {
            name: Some(name),
            description,
            color,
        };
        let envelope: CategoryEnvelope = self
            .send_json(Method::POST, "/api/categories", &payload, Some(token))
            .await?;
        Ok(envelope.category)
    }

    pub(crate) async fn update_category(
        &self,
        token: &str,
        id: i64,
        name: Option<&str>,
        description: Option<&str>,
        color: Option<&str>,
    ) -> QuillClientResult<Category> {
        let payload = CategoryDto {
            name,
            description,
            color,
        };
        let envelope: CategoryEnvelope = self
            .send_json(
                Method::PUT,
                &format!("/api/categories/{id}"),
                &payload,
                Some(token),
            )
            .await?;
        Ok(envelope.category)
    }

    pub(crate) async fn delete_category(&self, token: &str, id: i64) -> QuillClientResult<()> {
        let _: serde_json::Value = self
            .send_bare(
                Method::DELETE,
                &format!("/api/categories/{id}"),
                &[],
                Some(token),
            )
            .await?;
        Ok(())
    }

    pub(crate) async fn list_users(
        &self,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> QuillClientResult<UserList> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(page) = page {
            params.push(("page", page.to_string()));
        }
        if let Some(limit) = limit {
            params.push(("limit", limit.to_string()));
        }

        let envelope: UsersEnvelope = self
            .send_bare(Method::GET, "/api/users", &params, None)
            .await?;
        Ok(envelope.into())
    }

    pub(crate) async fn get_user(&self, id: i64) -> QuillClientResult<UserProfile> {
        let envelope: ProfileEnvelope = self
            .send_bare(Method::GET, &format!("/api/users/{id}"), &[], None)
            .await?;
        Ok(envelope.user)
    }
}

fn join_ids(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_normalizes_slashes() {
        let client = HttpClient::new("http://localhost:8080/");
        let full = client.endpoint("/api/posts");
        assert_eq!(full, "http://localhost:8080/api/posts");
    }

    #[test]
    fn join_ids_produces_comma_separated_list() {
        assert_eq!(join_ids(&[1, 2, 3]), "1,2,3");
        assert_eq!(join_ids(&[]), "");
    }

    #[test]
    fn posts_envelope_maps_pagination() {
        let envelope = PostsEnvelope {
            posts: vec![],
            pagination: PostsPaginationDto {
                current_page: 2,
                total_pages: 5,
                total_posts: 42,
                has_next: true,
                has_prev: true,
            },
        };

        let list = PostList::from(envelope);
        assert_eq!(list.total, 42);
        assert_eq!(list.pagination.current_page, 2);
        assert!(list.pagination.has_next);
    }
}
