use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::data::Pagination;
use crate::data::post_repository::{NewPost, PostFilter, PostPatch, PostRepository, PostSort};
use crate::domain::error::DomainError;
use crate::domain::like::LikeOutcome;
use crate::domain::post::{CategoryRef, Post, PostAuthor, PostView};

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    title: String,
    content: String,
    excerpt: String,
    featured_image: String,
    author_id: i64,
    tags: Vec<String>,
    is_published: bool,
    published_at: DateTime<Utc>,
    slug: String,
    view_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct PostViewRow {
    id: i64,
    title: String,
    content: String,
    excerpt: String,
    featured_image: String,
    author_id: i64,
    tags: Vec<String>,
    is_published: bool,
    published_at: DateTime<Utc>,
    slug: String,
    view_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    author_username: String,
    author_avatar: String,
    comment_count: i64,
    like_count: i64,
}

#[derive(sqlx::FromRow)]
struct PostCategoryRow {
    post_id: i64,
    id: i64,
    name: String,
    color: String,
}

// Counts are derived per read; they can never drift from the like/comment
// tables.
const POST_VIEW_SELECT: &str = "SELECT p.id, p.title, p.content, p.excerpt, p.featured_image, \
     p.author_id, p.tags, p.is_published, p.published_at, p.slug, p.view_count, \
     p.created_at, p.updated_at, \
     u.username AS author_username, u.avatar AS author_avatar, \
     (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comment_count, \
     (SELECT COUNT(*) FROM post_likes pl WHERE pl.post_id = p.id) AS like_count \
     FROM posts p \
     JOIN users u ON u.id = p.author_id";

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<PostView, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_post_db_error)?;

        let post_id: i64 = sqlx::query_scalar(
            "INSERT INTO posts \
             (title, content, excerpt, featured_image, author_id, tags, is_published, slug) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING id",
        )
        .bind(&input.title)
        .bind(&input.content)
        .bind(&input.excerpt)
        .bind(&input.featured_image)
        .bind(input.author_id)
        .bind(&input.tags)
        .bind(input.is_published)
        .bind(&input.slug)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_post_db_error)?;

        if !input.category_ids.is_empty() {
            insert_post_categories(&mut tx, post_id, &input.category_ids).await?;
        }

        tx.commit().await.map_err(map_post_db_error)?;

        self.get_post_view(post_id).await?.ok_or_else(|| {
            DomainError::Unexpected(format!("post {post_id} vanished after insert"))
        })
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let row: Option<PostRow> = sqlx::query_as(
            "SELECT id, title, content, excerpt, featured_image, author_id, tags, \
             is_published, published_at, slug, view_count, created_at, updated_at \
             FROM posts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(row.map(map_row_to_post))
    }

    async fn get_post_view(&self, id: i64) -> Result<Option<PostView>, DomainError> {
        let row: Option<PostViewRow> =
            sqlx::query_as(&format!("{POST_VIEW_SELECT} WHERE p.id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_post_db_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut categories = self.load_categories(&[row.id]).await?;
        let categories = categories.remove(&row.id).unwrap_or_default();
        Ok(Some(map_row_to_view(row, categories)))
    }

    async fn update_post(
        &self,
        id: i64,
        patch: PostPatch,
    ) -> Result<Option<PostView>, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_post_db_error)?;

        let updated: Option<i64> = sqlx::query_scalar(
            "UPDATE posts SET \
             title = COALESCE($2, title), \
             content = COALESCE($3, content), \
             excerpt = COALESCE($4, excerpt), \
             featured_image = COALESCE($5, featured_image), \
             tags = COALESCE($6, tags), \
             is_published = COALESCE($7, is_published), \
             slug = COALESCE($8, slug), \
             updated_at = NOW() \
             WHERE id = $1 \
             RETURNING id",
        )
        .bind(id)
        .bind(patch.title)
        .bind(patch.content)
        .bind(patch.excerpt)
        .bind(patch.featured_image)
        .bind(patch.tags)
        .bind(patch.is_published)
        .bind(patch.slug)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_post_db_error)?;

        if updated.is_none() {
            return Ok(None);
        }

        if let Some(category_ids) = patch.category_ids {
            sqlx::query("DELETE FROM post_categories WHERE post_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(map_post_db_error)?;
            if !category_ids.is_empty() {
                insert_post_categories(&mut tx, id, &category_ids).await?;
            }
        }

        tx.commit().await.map_err(map_post_db_error)?;

        self.get_post_view(id).await
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        // Likes, comments and category links go with the post via FK cascade.
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_posts(
        &self,
        filter: &PostFilter,
        pagination: Pagination,
    ) -> Result<Vec<PostView>, DomainError> {
        let mut qb = QueryBuilder::<Postgres>::new(POST_VIEW_SELECT);
        push_filter(&mut qb, filter);
        match filter.sort {
            PostSort::PublishedAtDesc => {
                qb.push(" ORDER BY p.published_at DESC, p.created_at DESC, p.id DESC");
            }
            PostSort::CreatedAtDesc => {
                qb.push(" ORDER BY p.created_at DESC, p.id DESC");
            }
        }
        qb.push(" LIMIT ").push_bind(pagination.limit());
        qb.push(" OFFSET ").push_bind(pagination.offset());

        let rows: Vec<PostViewRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let mut categories = self.load_categories(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let cats = categories.remove(&row.id).unwrap_or_default();
                map_row_to_view(row, cats)
            })
            .collect())
    }

    async fn count_posts(&self, filter: &PostFilter) -> Result<i64, DomainError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM posts p");
        push_filter(&mut qb, filter);

        qb.build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(map_post_db_error)
    }

    async fn increment_view_count(&self, id: i64) -> Result<bool, DomainError> {
        // Single atomic UPDATE; concurrent reads cannot lose increments.
        let result = sqlx::query("UPDATE posts SET view_count = view_count + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn toggle_like(
        &self,
        post_id: i64,
        user_id: i64,
    ) -> Result<Option<LikeOutcome>, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_post_db_error)?;

        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM posts WHERE id = $1")
            .bind(post_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_post_db_error)?;
        if exists.is_none() {
            return Ok(None);
        }

        let removed = sqlx::query("DELETE FROM post_likes WHERE post_id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(map_post_db_error)?
            .rows_affected();

        let has_liked = if removed == 0 {
            // The primary key makes this a no-op under a racing duplicate.
            sqlx::query(
                "INSERT INTO post_likes (post_id, user_id) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(post_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(map_post_db_error)?;
            true
        } else {
            false
        };

        let like_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM post_likes WHERE post_id = $1")
                .bind(post_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(map_post_db_error)?;

        tx.commit().await.map_err(map_post_db_error)?;

        Ok(Some(LikeOutcome {
            like_count,
            has_liked,
        }))
    }
}

impl PostgresPostRepository {
    async fn load_categories(
        &self,
        post_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<CategoryRef>>, DomainError> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<PostCategoryRow> = sqlx::query_as(
            "SELECT pc.post_id, c.id, c.name, c.color \
             FROM post_categories pc \
             JOIN categories c ON c.id = pc.category_id \
             WHERE pc.post_id = ANY($1) \
             ORDER BY c.name",
        )
        .bind(post_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        let mut grouped: HashMap<i64, Vec<CategoryRef>> = HashMap::new();
        for row in rows {
            grouped.entry(row.post_id).or_default().push(CategoryRef {
                id: row.id,
                name: row.name,
                color: row.color,
            });
        }
        Ok(grouped)
    }
}

async fn insert_post_categories(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    post_id: i64,
    category_ids: &[i64],
) -> Result<(), DomainError> {
    sqlx::query(
        "INSERT INTO post_categories (post_id, category_id) \
         SELECT $1, category_id FROM UNNEST($2::bigint[]) AS category_id \
         ON CONFLICT DO NOTHING",
    )
    .bind(post_id)
    .bind(category_ids)
    .execute(&mut **tx)
    .await
    .map_err(map_post_db_error)?;
    Ok(())
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &PostFilter) {
    qb.push(" WHERE TRUE");
    if filter.published_only {
        qb.push(" AND p.is_published");
    }
    if let Some(author_id) = filter.author_id {
        qb.push(" AND p.author_id = ");
        qb.push_bind(author_id);
    }
    if let Some(category_id) = filter.category_id {
        qb.push(" AND EXISTS (SELECT 1 FROM post_categories pc WHERE pc.post_id = p.id AND pc.category_id = ");
        qb.push_bind(category_id);
        qb.push(")");
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", escape_like(search));
        qb.push(" AND (p.title ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR p.content ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }
}

fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn map_row_to_post(row: PostRow) -> Post {
    Post {
        id: row.id,
        title: row.title,
        content: row.content,
        excerpt: row.excerpt,
        featured_image: row.featured_image,
        author_id: row.author_id,
        tags: row.tags,
        is_published: row.is_published,
        published_at: row.published_at,
        slug: row.slug,
        view_count: row.view_count,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn map_row_to_view(row: PostViewRow, categories: Vec<CategoryRef>) -> PostView {
    PostView {
        post: Post {
            id: row.id,
            title: row.title,
            content: row.content,
            excerpt: row.excerpt,
            featured_image: row.featured_image,
            author_id: row.author_id,
            tags: row.tags,
            is_published: row.is_published,
            published_at: row.published_at,
            slug: row.slug,
            view_count: row.view_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        },
        author: PostAuthor {
            id: row.author_id,
            username: row.author_username,
            avatar: row.author_avatar,
        },
        categories,
        comment_count: row.comment_count,
        like_count: row.like_count,
    }
}

fn map_post_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23503")
    {
        let resource = match db_err.constraint() {
            Some("post_categories_category_id_fkey") => "category",
            Some("posts_author_id_fkey") => "author",
            _ => "referenced resource",
        };
        return DomainError::NotFound(resource.to_string());
    }
    DomainError::Unexpected(err.to_string())
}
