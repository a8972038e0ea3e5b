use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Аккаунт вызывающего пользователя (единственная модель с email).
pub struct User {
    /// Идентификатор пользователя.
    pub id: i64,
    /// Логин.
    pub username: String,
    /// Email.
    pub email: String,
    /// Роль: `user` или `admin`.
    pub role: String,
    /// Путь к аватару, например `/uploads/abc.png`.
    pub avatar: String,
    /// Короткая биография.
    pub bio: String,
    /// Дата и время создания аккаунта (UTC).
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Публичный профиль пользователя; email не раскрывается.
pub struct UserProfile {
    /// Идентификатор пользователя.
    pub id: i64,
    /// Логин.
    pub username: String,
    /// Путь к аватару.
    pub avatar: String,
    /// Короткая биография.
    pub bio: String,
    /// Дата и время создания аккаунта (UTC).
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Автор поста или комментария в выдаче.
pub struct Author {
    /// Идентификатор автора.
    pub id: i64,
    /// Логин автора.
    pub username: String,
    /// Путь к аватару.
    pub avatar: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Категория, привязанная к посту.
pub struct CategoryRef {
    /// Идентификатор категории.
    pub id: i64,
    /// Название.
    pub name: String,
    /// Цвет в hex-формате `#RRGGBB`.
    pub color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Пост вместе с автором, категориями и производными счётчиками.
pub struct Post {
    /// Идентификатор поста.
    pub id: i64,
    /// Заголовок.
    pub title: String,
    /// Содержимое.
    pub content: String,
    /// Короткая выдержка.
    pub excerpt: String,
    /// Путь к обложке или пустая строка.
    pub featured_image: String,
    /// Автор поста.
    pub author: Author,
    /// Категории поста.
    pub categories: Vec<CategoryRef>,
    /// Теги.
    pub tags: Vec<String>,
    /// Опубликован ли пост.
    pub is_published: bool,
    /// Дата публикации (UTC).
    pub published_at: DateTime<Utc>,
    /// Слаг, производный от заголовка.
    pub slug: String,
    /// Счётчик просмотров.
    pub view_count: i64,
    /// Число комментариев (включая ответы).
    pub comment_count: i64,
    /// Число лайков.
    pub like_count: i64,
    /// Дата создания (UTC).
    pub created_at: DateTime<Utc>,
    /// Дата последнего обновления (UTC).
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Комментарий с автором и числом лайков.
pub struct Comment {
    /// Идентификатор комментария.
    pub id: i64,
    /// Текст.
    pub content: String,
    /// Автор.
    pub author: Author,
    /// Идентификатор поста.
    pub post_id: i64,
    /// Идентификатор родительского комментария, если это ответ.
    #[serde(default)]
    pub parent_comment_id: Option<i64>,
    /// Число лайков.
    pub like_count: i64,
    /// Дата создания (UTC).
    pub created_at: DateTime<Utc>,
    /// Дата последнего обновления (UTC).
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Корневой комментарий вместе со своими ответами (один уровень вложенности).
pub struct CommentThread {
    /// Идентификатор комментария.
    pub id: i64,
    /// Текст.
    pub content: String,
    /// Автор.
    pub author: Author,
    /// Идентификатор поста.
    pub post_id: i64,
    /// Число лайков.
    pub like_count: i64,
    /// Дата создания (UTC).
    pub created_at: DateTime<Utc>,
    /// Дата последнего обновления (UTC).
    pub updated_at: DateTime<Utc>,
    /// Ответы на комментарий, от старых к новым.
    pub replies: Vec<Comment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Категория блога.
pub struct Category {
    /// Идентификатор категории.
    pub id: i64,
    /// Название.
    pub name: String,
    /// Описание.
    pub description: String,
    /// Цвет в hex-формате `#RRGGBB`.
    pub color: String,
    /// Активна ли категория (мягкое удаление).
    pub is_active: bool,
    /// Дата создания (UTC).
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Параметры пагинации в ответах списков.
pub struct Pagination {
    /// Текущая страница (нумерация с 1).
    pub current_page: u32,
    /// Общее число страниц.
    pub total_pages: i64,
    /// Признак наличия следующей страницы.
    pub has_next: bool,
    /// Признак наличия предыдущей страницы.
    pub has_prev: bool,
}

#[derive(Debug, Clone)]
/// Ответ после успешной регистрации или входа.
pub struct AuthResponse {
    /// JWT access token.
    pub token: String,
    /// Данные пользователя.
    pub user: User,
}

#[derive(Debug, Clone)]
/// Страница постов.
pub struct PostList {
    /// Посты текущей страницы.
    pub posts: Vec<Post>,
    /// Общее число постов в выборке.
    pub total: i64,
    /// Параметры пагинации.
    pub pagination: Pagination,
}

#[derive(Debug, Clone)]
/// Страница публичных профилей.
pub struct UserList {
    /// Профили текущей страницы.
    pub users: Vec<UserProfile>,
    /// Общее число пользователей.
    pub total: i64,
    /// Параметры пагинации.
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Copy)]
/// Результат переключения лайка.
pub struct LikeStatus {
    /// Актуальное число лайков.
    pub like_count: i64,
    /// Стоит ли лайк вызывающего пользователя после переключения.
    pub has_liked: bool,
}

#[derive(Debug, Clone)]
/// Загружаемое изображение обложки.
pub struct ImageUpload {
    /// Имя файла с расширением (jpg/jpeg/png/gif/webp).
    pub file_name: String,
    /// Содержимое файла.
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
/// Данные нового поста.
pub struct PostDraft {
    /// Заголовок (обязателен).
    pub title: String,
    /// Содержимое (обязательно).
    pub content: String,
    /// Выдержка; по умолчанию сервер берёт первые 150 символов содержимого.
    pub excerpt: Option<String>,
    /// Идентификаторы категорий.
    pub category_ids: Vec<i64>,
    /// Теги.
    pub tags: Vec<String>,
    /// Публиковать сразу; по умолчанию `true`.
    pub is_published: Option<bool>,
    /// Обложка.
    pub image: Option<ImageUpload>,
}

#[derive(Debug, Clone, Default)]
/// Частичное обновление поста; `None` оставляет поле без изменений.
pub struct PostUpdate {
    /// Новый заголовок (слаг пересчитывается на сервере).
    pub title: Option<String>,
    /// Новое содержимое.
    pub content: Option<String>,
    /// Новая выдержка.
    pub excerpt: Option<String>,
    /// Полная замена набора категорий.
    pub category_ids: Option<Vec<i64>>,
    /// Полная замена тегов.
    pub tags: Option<Vec<String>>,
    /// Смена статуса публикации.
    pub is_published: Option<bool>,
    /// Новая обложка.
    pub image: Option<ImageUpload>,
}

#[derive(Debug, Clone, Default)]
/// Фильтры списка постов; все поля опциональны и комбинируются через AND.
pub struct PostQuery {
    /// Страница (нумерация с 1).
    pub page: Option<u32>,
    /// Размер страницы (1..=100).
    pub limit: Option<u32>,
    /// Название категории без учёта регистра.
    pub category: Option<String>,
    /// Подстрока в заголовке или содержимом.
    pub search: Option<String>,
    /// Идентификатор автора.
    pub author: Option<i64>,
}
