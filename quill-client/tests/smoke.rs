use std::time::{SystemTime, UNIX_EPOCH};

use quill_client::{PostDraft, PostQuery, QuillClient, QuillClientError};

fn unique_suffix() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock must be after unix epoch")
        .as_nanos();
    format!("{nanos}")
}

fn base_url() -> String {
    std::env::var("QUILL_HTTP_URL").unwrap_or_else(|_| "http://127.0.0.1:8080".to_string())
}

#[tokio::test]
#[ignore = "requires running HTTP server and database"]
async fn http_smoke_flow() {
    let mut author = QuillClient::new(base_url());

    let suffix = unique_suffix();
    let username = format!("smoke_user_{suffix}");
    let email = format!("smoke_{suffix}@example.com");
    let password = "password123";

    let register = author
        .register(&username, &email, password)
        .await
        .expect("register must succeed");
    assert!(!register.token.is_empty());
    assert_eq!(register.user.username, username);
    assert!(author.get_token().is_some());

    let mut duplicate = QuillClient::new(base_url());
    let second_registration = duplicate
        .register(&format!("smoke_dup_{suffix}"), &email, password)
        .await;
    match second_registration {
        Err(QuillClientError::Conflict(message)) => {
            assert!(message.contains("email"), "conflict must name the email field");
        }
        other => panic!("duplicate email must conflict, got {other:?}"),
    }

    let login = author
        .login(&email, password)
        .await
        .expect("login must succeed");
    assert_eq!(login.user.email, email);

    let me = author.me().await.expect("me must succeed");
    assert_eq!(me.username, username);

    let draft = PostDraft {
        title: format!("Smoke title {suffix}"),
        content: "smoke content".to_string(),
        tags: vec!["smoke".to_string()],
        ..Default::default()
    };
    let created = author
        .create_post(draft)
        .await
        .expect("create_post must succeed");
    assert_eq!(created.title, format!("Smoke title {suffix}"));
    assert_eq!(created.slug, format!("smoke-title-{suffix}"));
    assert!(created.is_published);

    let fetched = author
        .get_post(created.id)
        .await
        .expect("get_post must succeed");
    assert_eq!(fetched.id, created.id);

    let listed = author
        .list_posts(&PostQuery {
            search: Some(suffix.clone()),
            ..Default::default()
        })
        .await
        .expect("list_posts must succeed");
    assert!(listed.posts.iter().any(|post| post.id == created.id));

    // Лайки ставит второй пользователь.
    let mut reader = QuillClient::new(base_url());
    reader
        .register(
            &format!("smoke_reader_{suffix}"),
            &format!("smoke_reader_{suffix}@example.com"),
            password,
        )
        .await
        .expect("reader register must succeed");

    let liked = reader
        .toggle_post_like(created.id)
        .await
        .expect("toggle_post_like must succeed");
    assert!(liked.has_liked);
    assert_eq!(liked.like_count, 1);

    let unliked = reader
        .toggle_post_like(created.id)
        .await
        .expect("toggle_post_like must succeed");
    assert!(!unliked.has_liked);
    assert_eq!(unliked.like_count, 0);

    let root = reader
        .create_comment(created.id, "smoke comment", None)
        .await
        .expect("create_comment must succeed");
    assert_eq!(root.post_id, created.id);

    let reply = author
        .create_comment(created.id, "smoke reply", Some(root.id))
        .await
        .expect("reply must succeed");
    assert_eq!(reply.parent_comment_id, Some(root.id));

    let reply_to_reply = reader
        .create_comment(created.id, "too deep", Some(reply.id))
        .await;
    assert!(matches!(
        reply_to_reply,
        Err(QuillClientError::InvalidRequest(_))
    ));

    let threads = author
        .list_comments(created.id)
        .await
        .expect("list_comments must succeed");
    let thread = threads
        .iter()
        .find(|thread| thread.id == root.id)
        .expect("root comment must be present");
    assert!(thread.replies.iter().any(|comment| comment.id == reply.id));

    let foreign_delete = reader.delete_post(created.id).await;
    assert!(matches!(
        foreign_delete,
        Err(QuillClientError::Unauthorized)
    ));

    author
        .delete_post(created.id)
        .await
        .expect("delete_post must succeed");

    let after_delete = author.get_post(created.id).await;
    assert!(matches!(after_delete, Err(QuillClientError::NotFound)));
}
