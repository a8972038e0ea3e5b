use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use quill_client::{
    AuthResponse, Category, Comment, CommentThread, ImageUpload, Post, PostDraft, PostList,
    PostQuery, PostUpdate, QuillClient, QuillClientError, UserList, UserProfile,
};

const TOKEN_FILE: &str = ".quill_token";
const DEFAULT_SERVER: &str = "http://127.0.0.1:8080";

#[derive(Debug, Parser)]
#[command(name = "quill-cli", version, about = "CLI клиент для quill-server")]
struct Cli {
    /// Адрес HTTP-сервера.
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Регистрация пользователя.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Вход пользователя по email.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Текущий аккаунт (требует токен).
    Me,
    /// Создание поста (требует токен).
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        #[arg(long)]
        excerpt: Option<String>,
        /// Идентификаторы категорий через запятую, например `1,2`.
        #[arg(long)]
        categories: Option<String>,
        /// Теги через запятую, например `rust,web`.
        #[arg(long)]
        tags: Option<String>,
        /// Сохранить как черновик.
        #[arg(long)]
        draft: bool,
        /// Путь к файлу обложки (jpg/jpeg/png/gif/webp).
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Получение поста по id.
    Get {
        #[arg(long)]
        id: i64,
    },
    /// Частичное обновление поста (требует токен).
    ///
    /// Не указанные флаги оставляют поля без изменений.
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        excerpt: Option<String>,
        #[arg(long)]
        categories: Option<String>,
        #[arg(long)]
        tags: Option<String>,
        #[arg(long)]
        published: Option<bool>,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Удаление поста (требует токен).
    Delete {
        #[arg(long)]
        id: i64,
    },
    /// Список опубликованных постов.
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
        /// Фильтр по названию категории.
        #[arg(long)]
        category: Option<String>,
        /// Поиск по заголовку и содержимому.
        #[arg(long)]
        search: Option<String>,
        /// Фильтр по id автора.
        #[arg(long)]
        author: Option<i64>,
    },
    /// Переключение лайка на посте (требует токен).
    Like {
        #[arg(long)]
        id: i64,
    },
    /// Операции с комментариями.
    #[command(subcommand)]
    Comments(CommentsCommand),
    /// Операции с категориями.
    #[command(subcommand)]
    Categories(CategoriesCommand),
    /// Операции с пользователями.
    #[command(subcommand)]
    Users(UsersCommand),
}

#[derive(Debug, Subcommand)]
enum CommentsCommand {
    /// Комментарии поста.
    List {
        #[arg(long)]
        post: i64,
    },
    /// Новый комментарий или ответ (требует токен).
    Add {
        #[arg(long)]
        post: i64,
        #[arg(long)]
        content: String,
        /// Идентификатор корневого комментария для ответа.
        #[arg(long)]
        reply_to: Option<i64>,
    },
    /// Обновление текста комментария (требует токен).
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        content: String,
    },
    /// Удаление комментария (требует токен).
    Delete {
        #[arg(long)]
        id: i64,
    },
    /// Переключение лайка на комментарии (требует токен).
    Like {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Debug, Subcommand)]
enum CategoriesCommand {
    /// Список активных категорий.
    List,
    /// Новая категория (требует токен администратора).
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// Цвет в hex-формате, например `#FF0000`.
        #[arg(long)]
        color: Option<String>,
    },
    /// Обновление категории (требует токен администратора).
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Деактивация категории (требует токен администратора).
    Delete {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Debug, Subcommand)]
enum UsersCommand {
    /// Список публичных профилей.
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
    /// Публичный профиль по id.
    Get {
        #[arg(long)]
        id: i64,
    },
    /// Посты пользователя; с токеном владельца видны и черновики.
    Posts {
        #[arg(long)]
        id: i64,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Ошибка: {err}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let server = resolve_server(cli.server);
    let mut client = QuillClient::new(server);

    if let Some(token) = load_token().context("не удалось прочитать .quill_token")? {
        client.set_token(token);
    }

    match cli.command {
        Command::Register {
            username,
            email,
            password,
        } => {
            let auth = client
                .register(&username, &email, &password)
                .await
                .map_err(map_client_error)?;
            persist_token(&client).context("не удалось сохранить токен")?;
            print_auth("Регистрация успешна", &auth);
        }
        Command::Login { email, password } => {
            let auth = client
                .login(&email, &password)
                .await
                .map_err(map_client_error)?;
            persist_token(&client).context("не удалось сохранить токен")?;
            print_auth("Вход выполнен", &auth);
        }
        Command::Me => {
            let user = client.me().await.map_err(map_client_error)?;
            println!("id: {}", user.id);
            println!("username: {}", user.username);
            println!("email: {}", user.email);
            println!("role: {}", user.role);
            println!("created_at: {}", user.created_at);
        }
        Command::Create {
            title,
            content,
            excerpt,
            categories,
            tags,
            draft,
            image,
        } => {
            let post_draft = PostDraft {
                title,
                content,
                excerpt,
                category_ids: parse_id_list(categories.as_deref())?,
                tags: parse_tag_list(tags.as_deref()),
                is_published: if draft { Some(false) } else { None },
                image: read_image(image.as_deref())?,
            };
            let post = client
                .create_post(post_draft)
                .await
                .map_err(map_client_error)?;
            print_post("Пост создан", &post);
        }
        Command::Get { id } => {
            let post = client.get_post(id).await.map_err(map_client_error)?;
            print_post("Пост", &post);
        }
        Command::Update {
            id,
            title,
            content,
            excerpt,
            categories,
            tags,
            published,
            image,
        } => {
            let update = PostUpdate {
                title,
                content,
                excerpt,
                category_ids: match categories {
                    Some(raw) => Some(parse_id_list(Some(&raw))?),
                    None => None,
                },
                tags: tags.map(|raw| parse_tag_list(Some(&raw))),
                is_published: published,
                image: read_image(image.as_deref())?,
            };
            let post = client
                .update_post(id, update)
                .await
                .map_err(map_client_error)?;
            print_post("Пост обновлён", &post);
        }
        Command::Delete { id } => {
            client.delete_post(id).await.map_err(map_client_error)?;
            println!("Пост удалён: id={id}");
        }
        Command::List {
            page,
            limit,
            category,
            search,
            author,
        } => {
            let query = PostQuery {
                page: Some(page),
                limit: Some(limit),
                category,
                search,
                author,
            };
            let list = client.list_posts(&query).await.map_err(map_client_error)?;
            print_post_list(&list);
        }
        Command::Like { id } => {
            let status = client
                .toggle_post_like(id)
                .await
                .map_err(map_client_error)?;
            let state = if status.has_liked { "поставлен" } else { "снят" };
            println!("Лайк {state}: лайков теперь {}", status.like_count);
        }
        Command::Comments(command) => run_comments(&client, command).await?,
        Command::Categories(command) => run_categories(&client, command).await?,
        Command::Users(command) => run_users(&client, command).await?,
    }

    Ok(())
}

async fn run_comments(client: &QuillClient, command: CommentsCommand) -> Result<()> {
    match command {
        CommentsCommand::List { post } => {
            let threads = client.list_comments(post).await.map_err(map_client_error)?;
            print_threads(&threads);
        }
        CommentsCommand::Add {
            post,
            content,
            reply_to,
        } => {
            let comment = client
                .create_comment(post, &content, reply_to)
                .await
                .map_err(map_client_error)?;
            print_comment("Комментарий создан", &comment);
        }
        CommentsCommand::Update { id, content } => {
            let comment = client
                .update_comment(id, &content)
                .await
                .map_err(map_client_error)?;
            print_comment("Комментарий обновлён", &comment);
        }
        CommentsCommand::Delete { id } => {
            client.delete_comment(id).await.map_err(map_client_error)?;
            println!("Комментарий удалён: id={id}");
        }
        CommentsCommand::Like { id } => {
            let status = client
                .toggle_comment_like(id)
                .await
                .map_err(map_client_error)?;
            let state = if status.has_liked { "поставлен" } else { "снят" };
            println!("Лайк {state}: лайков теперь {}", status.like_count);
        }
    }
    Ok(())
}

async fn run_categories(client: &QuillClient, command: CategoriesCommand) -> Result<()> {
    match command {
        CategoriesCommand::List => {
            let categories = client.list_categories().await.map_err(map_client_error)?;
            println!("Категорий: {}", categories.len());
            for category in &categories {
                print_category_line(category);
            }
        }
        CategoriesCommand::Add {
            name,
            description,
            color,
        } => {
            let category = client
                .create_category(&name, description.as_deref(), color.as_deref())
                .await
                .map_err(map_client_error)?;
            println!("Категория создана");
            print_category_line(&category);
        }
        CategoriesCommand::Update {
            id,
            name,
            description,
            color,
        } => {
            let category = client
                .update_category(id, name.as_deref(), description.as_deref(), color.as_deref())
                .await
                .map_err(map_client_error)?;
            println!("Категория обновлена");
            print_category_line(&category);
        }
        CategoriesCommand::Delete { id } => {
            client.delete_category(id).await.map_err(map_client_error)?;
            println!("Категория деактивирована: id={id}");
        }
    }
    Ok(())
}

async fn run_users(client: &QuillClient, command: UsersCommand) -> Result<()> {
    match command {
        UsersCommand::List { page, limit } => {
            let list = client
                .list_users(Some(page), Some(limit))
                .await
                .map_err(map_client_error)?;
            print_user_list(&list);
        }
        UsersCommand::Get { id } => {
            let profile = client.get_user(id).await.map_err(map_client_error)?;
            print_profile(&profile);
        }
        UsersCommand::Posts { id, page, limit } => {
            let list = client
                .list_user_posts(id, Some(page), Some(limit))
                .await
                .map_err(map_client_error)?;
            print_post_list(&list);
        }
    }
    Ok(())
}

fn resolve_server(server: Option<String>) -> String {
    let raw = server
        .or_else(|| std::env::var("QUILL_SERVER").ok())
        .unwrap_or_else(|| DEFAULT_SERVER.to_string());
    normalize_server(raw)
}

fn normalize_server(server: String) -> String {
    if server.starts_with("http://") || server.starts_with("https://") {
        return server;
    }

    format!("http://{server}")
}

fn parse_id_list(raw: Option<&str>) -> Result<Vec<i64>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>()
                .with_context(|| format!("некорректный идентификатор: {part}"))
        })
        .collect()
}

fn parse_tag_list(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

fn read_image(path: Option<&Path>) -> Result<Option<ImageUpload>> {
    let Some(path) = path else {
        return Ok(None);
    };

    let bytes =
        fs::read(path).with_context(|| format!("не удалось прочитать {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .context("путь к обложке не содержит имени файла")?;
    Ok(Some(ImageUpload { file_name, bytes }))
}

fn parse_token_content(raw: &str) -> Option<String> {
    let token = raw.trim().to_string();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

fn load_token() -> io::Result<Option<String>> {
    if !Path::new(TOKEN_FILE).exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(TOKEN_FILE)?;
    Ok(parse_token_content(&raw))
}

fn persist_token(client: &QuillClient) -> io::Result<()> {
    if let Some(token) = client.get_token() {
        fs::write(TOKEN_FILE, token)?;
    }
    Ok(())
}

fn map_client_error(err: QuillClientError) -> anyhow::Error {
    let message = match err {
        QuillClientError::Unauthorized => {
            "требуется авторизация: выполните `quill-cli login ...` или `quill-cli register ...`"
                .to_string()
        }
        QuillClientError::NotFound => "ресурс не найден".to_string(),
        QuillClientError::Conflict(message) => format!("конфликт: {message}"),
        QuillClientError::InvalidRequest(message) => format!("некорректный запрос: {message}"),
        QuillClientError::Http(err) => format!("ошибка HTTP: {err}"),
    };
    anyhow::anyhow!(message)
}

fn print_auth(title: &str, auth: &AuthResponse) {
    println!("{title}");
    println!("token: {}", auth.token);
    println!("user:");
    println!("  id: {}", auth.user.id);
    println!("  username: {}", auth.user.username);
    println!("  email: {}", auth.user.email);
    println!("  role: {}", auth.user.role);
    println!("  created_at: {}", auth.user.created_at);
}

fn print_post(title: &str, post: &Post) {
    println!("{title}");
    println!("id: {}", post.id);
    println!("title: {}", post.title);
    println!("slug: {}", post.slug);
    println!("excerpt: {}", post.excerpt);
    println!("content: {}", post.content);
    println!("author: {} (id={})", post.author.username, post.author.id);
    if !post.categories.is_empty() {
        let names: Vec<&str> = post
            .categories
            .iter()
            .map(|category| category.name.as_str())
            .collect();
        println!("categories: {}", names.join(", "));
    }
    if !post.tags.is_empty() {
        println!(
            "tags: {}",
            serde_json::to_string(&post.tags).unwrap_or_default()
        );
    }
    println!("published: {}", post.is_published);
    println!(
        "views: {}, comments: {}, likes: {}",
        post.view_count, post.comment_count, post.like_count
    );
    println!("created_at: {}", post.created_at);
    println!("updated_at: {}", post.updated_at);
}

fn print_post_list(list: &PostList) {
    println!(
        "Постов: {} (страница {}/{}, всего {})",
        list.posts.len(),
        list.pagination.current_page,
        list.pagination.total_pages,
        list.total
    );

    for post in &list.posts {
        println!(
            "- [{}] {} (автор: {}, лайков: {})",
            post.id, post.title, post.author.username, post.like_count
        );
    }
}

fn print_comment(title: &str, comment: &Comment) {
    println!("{title}");
    println!("id: {}", comment.id);
    println!("post_id: {}", comment.post_id);
    if let Some(parent) = comment.parent_comment_id {
        println!("reply_to: {parent}");
    }
    println!("author: {}", comment.author.username);
    println!("content: {}", comment.content);
    println!("created_at: {}", comment.created_at);
}

fn print_threads(threads: &[CommentThread]) {
    println!("Комментариев: {}", threads.len());
    for thread in threads {
        println!(
            "- [{}] {} (автор: {}, лайков: {})",
            thread.id, thread.content, thread.author.username, thread.like_count
        );
        for reply in &thread.replies {
            println!(
                "    [{}] {} (автор: {}, лайков: {})",
                reply.id, reply.content, reply.author.username, reply.like_count
            );
        }
    }
}

fn print_category_line(category: &Category) {
    println!(
        "- [{}] {} ({}) {}",
        category.id, category.name, category.color, category.description
    );
}

fn print_profile(profile: &UserProfile) {
    println!("id: {}", profile.id);
    println!("username: {}", profile.username);
    if !profile.bio.is_empty() {
        println!("bio: {}", profile.bio);
    }
    println!("created_at: {}", profile.created_at);
}

fn print_user_list(list: &UserList) {
    println!(
        "Пользователей: {} (страница {}/{}, всего {})",
        list.users.len(),
        list.pagination.current_page,
        list.pagination.total_pages,
        list.total
    );

    for user in &list.users {
        println!("- [{}] {}", user.id, user.username);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_server_keeps_scheme() {
        let s = normalize_server("https://example.com:8080".to_string());
        assert_eq!(s, "https://example.com:8080");
    }

    #[test]
    fn normalize_server_adds_http_scheme() {
        let s = normalize_server("127.0.0.1:8080".to_string());
        assert_eq!(s, "http://127.0.0.1:8080");
    }

    #[test]
    fn parse_id_list_splits_and_trims() {
        let ids = parse_id_list(Some("1, 2,3")).expect("valid list");
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn parse_id_list_rejects_garbage() {
        assert!(parse_id_list(Some("1,abc")).is_err());
    }

    #[test]
    fn parse_id_list_empty_when_missing() {
        assert!(parse_id_list(None).expect("valid").is_empty());
    }

    #[test]
    fn parse_tag_list_drops_blank_parts() {
        let tags = parse_tag_list(Some("rust, ,web,"));
        assert_eq!(tags, vec!["rust".to_string(), "web".to_string()]);
    }

    #[test]
    fn parse_token_content_trims_whitespace() {
        let token = parse_token_content("  abc.def.ghi  ");
        assert_eq!(token.as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn parse_token_content_rejects_blank() {
        let token = parse_token_content("   ");
        assert!(token.is_none());
    }
}
