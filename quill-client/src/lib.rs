//! Клиентская библиотека для работы с quill-server по HTTP.
//!
//! Предоставляет типизированный API (`QuillClient`) поверх REST-эндпоинтов
//! сервера: аутентификация, посты, комментарии, категории и профили.
//!
//! Клиент хранит JWT-токен после `register`/`login` и автоматически использует
//! его в защищённых операциях.
#![warn(missing_docs)]

mod error;
mod http_client;
mod models;

pub use error::{QuillClientError, QuillClientResult};
pub use models::{
    AuthResponse, Author, Category, CategoryRef, Comment, CommentThread, ImageUpload, LikeStatus,
    Pagination, Post, PostDraft, PostList, PostQuery, PostUpdate, User, UserList, UserProfile,
};

use http_client::HttpClient;

#[derive(Debug, Clone)]
/// Клиент блог-сервиса поверх HTTP.
pub struct QuillClient {
    http: HttpClient,
    token: Option<String>,
}

impl QuillClient {
    /// Создаёт клиент с базовым URL сервера, например `http://127.0.0.1:8080`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: HttpClient::new(base_url),
            token: None,
        }
    }

    /// Устанавливает JWT-токен вручную.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Возвращает текущий JWT-токен, если он установлен.
    pub fn get_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Очищает сохранённый JWT-токен.
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Регистрирует пользователя и сохраняет полученный JWT-токен в клиенте.
    pub async fn register(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
    ) -> QuillClientResult<AuthResponse> {
        let result = self.http.register(username, email, password).await?;
        self.token = Some(result.token.clone());
        Ok(result)
    }

    /// Выполняет вход по email и сохраняет полученный JWT-токен в клиенте.
    pub async fn login(&mut self, email: &str, password: &str) -> QuillClientResult<AuthResponse> {
        let result = self.http.login(email, password).await?;
        self.token = Some(result.token.clone());
        Ok(result)
    }

    /// Возвращает аккаунт текущего пользователя.
    ///
    /// Требует установленный JWT-токен.
    pub async fn me(&self) -> QuillClientResult<User> {
        let token = self.require_token()?;
        self.http.me(token).await
    }

    /// Обновляет аватар и/или биографию текущего пользователя.
    ///
    /// Требует установленный JWT-токен.
    pub async fn update_profile(
        &self,
        avatar: Option<&str>,
        bio: Option<&str>,
    ) -> QuillClientResult<User> {
        let token = self.require_token()?;
        self.http.update_profile(token, avatar, bio).await
    }

    /// Возвращает страницу опубликованных постов с фильтрами.
    pub async fn list_posts(&self, query: &PostQuery) -> QuillClientResult<PostList> {
        self.http.list_posts(query).await
    }

    /// Возвращает пост по идентификатору и увеличивает его счётчик просмотров.
    pub async fn get_post(&self, id: i64) -> QuillClientResult<Post> {
        self.http.get_post(id).await
    }

    /// Создаёт новый пост.
    ///
    /// Требует установленный JWT-токен.
    pub async fn create_post(&self, draft: PostDraft) -> QuillClientResult<Post> {
        let token = self.require_token()?;
        self.http.create_post(token, draft).await
    }

    /// Частично обновляет пост; поля со значением `None` не меняются.
    ///
    /// Требует установленный JWT-токен автора поста или администратора.
    pub async fn update_post(&self, id: i64, update: PostUpdate) -> QuillClientResult<Post> {
        let token = self.require_token()?;
        self.http.update_post(token, id, update).await
    }

    /// Удаляет пост вместе с комментариями и лайками.
    ///
    /// Требует установленный JWT-токен автора поста или администратора.
    pub async fn delete_post(&self, id: i64) -> QuillClientResult<()> {
        let token = self.require_token()?;
        self.http.delete_post(token, id).await
    }

    /// Переключает лайк текущего пользователя на посте.
    ///
    /// Требует установленный JWT-токен.
    pub async fn toggle_post_like(&self, id: i64) -> QuillClientResult<LikeStatus> {
        let token = self.require_token()?;
        self.http.toggle_post_like(token, id).await
    }

    /// Возвращает страницу постов пользователя.
    ///
    /// С токеном владельца в выдачу попадают и черновики.
    pub async fn list_user_posts(
        &self,
        user_id: i64,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> QuillClientResult<PostList> {
        self.http
            .list_user_posts(user_id, page, limit, self.token.as_deref())
            .await
    }

    /// Возвращает комментарии поста: корневые с ответами, от новых к старым.
    pub async fn list_comments(&self, post_id: i64) -> QuillClientResult<Vec<CommentThread>> {
        self.http.list_comments(post_id).await
    }

    /// Создаёт комментарий или ответ на корневой комментарий поста.
    ///
    /// Требует установленный JWT-токен.
    pub async fn create_comment(
        &self,
        post_id: i64,
        content: &str,
        parent_comment_id: Option<i64>,
    ) -> QuillClientResult<Comment> {
        let token = self.require_token()?;
        self.http
            .create_comment(token, post_id, content, parent_comment_id)
            .await
    }

    /// Обновляет текст комментария.
    ///
    /// Требует установленный JWT-токен автора комментария или администратора.
    pub async fn update_comment(&self, id: i64, content: &str) -> QuillClientResult<Comment> {
        let token = self.require_token()?;
        self.http.update_comment(token, id, content).await
    }

    /// Удаляет комментарий вместе с ответами на него.
    ///
    /// Требует установленный JWT-токен автора комментария или администратора.
    pub async fn delete_comment(&self, id: i64) -> QuillClientResult<()> {
        let token = self.require_token()?;
        self.http.delete_comment(token, id).await
    }

    /// Переключает лайк текущего пользователя на комментарии.
    ///
    /// Требует установленный JWT-токен.
    pub async fn toggle_comment_like(&self, id: i64) -> QuillClientResult<LikeStatus> {
        let token = self.require_token()?;
        self.http.toggle_comment_like(token, id).await
    }

    /// Возвращает список активных категорий.
    pub async fn list_categories(&self) -> QuillClientResult<Vec<Category>> {
        self.http.list_categories().await
    }

    /// Создаёт категорию.
    ///
    /// Требует установленный JWT-токен администратора.
    pub async fn create_category(
        &self,
        name: &str,
        description: Option<&str>,
        color: Option<&str>,
    ) -> QuillClientResult<Category> {
        let token = self.require_token()?;
        self.http
            .create_category(token, name, description, color)
            .await
    }

    /// Обновляет категорию; поля со значением `None` не меняются.
    ///
    /// Требует установленный JWT-токен администратора.
    pub async fn update_category(
        &self,
        id: i64,
        name: Option<&str>,
        description: Option<&str>,
        color: Option<&str>,
    ) -> QuillClientResult<Category> {
        let token = self.require_token()?;
        self.http
            .update_category(token, id, name, description, color)
            .await
    }

    /// Деактивирует категорию (мягкое удаление).
    ///
    /// Требует установленный JWT-токен администратора.
    pub async fn delete_category(&self, id: i64) -> QuillClientResult<()> {
        let token = self.require_token()?;
        self.http.delete_category(token, id).await
    }

    /// Возвращает страницу публичных профилей пользователей.
    pub async fn list_users(
        &self,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> QuillClientResult<UserList> {
        self.http.list_users(page, limit).await
    }

    /// Возвращает публичный профиль пользователя по идентификатору.
    pub async fn get_user(&self, id: i64) -> QuillClientResult<UserProfile> {
        self.http.get_user(id).await
    }

    fn require_token(&self) -> QuillClientResult<&str> {
        self.token.as_deref().ok_or(QuillClientError::Unauthorized)
    }
}
