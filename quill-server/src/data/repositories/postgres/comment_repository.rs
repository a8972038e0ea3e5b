use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::domain::comment::{Comment, CommentAuthor, CommentThread, CommentView};
use crate::domain::error::DomainError;
use crate::domain::like::LikeOutcome;

#[derive(Debug, Clone)]
pub(crate) struct PostgresCommentRepository {
    pool: PgPool,
}

impl PostgresCommentRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CommentViewRow {
    id: i64,
    content: String,
    author_id: i64,
    post_id: i64,
    parent_comment_id: Option<i64>,
    is_approved: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    author_username: String,
    author_avatar: String,
    like_count: i64,
}

const COMMENT_VIEW_SELECT: &str = "SELECT c.id, c.content, c.author_id, c.post_id, c.parent_comment_id, c.is_approved, \
     c.created_at, c.updated_at, \
     u.username AS author_username, u.avatar AS author_avatar, \
     (SELECT COUNT(*) FROM comment_likes cl WHERE cl.comment_id = c.id) AS like_count \
     FROM comments c \
     JOIN users u ON u.id = c.author_id";

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create_comment(&self, input: NewComment) -> Result<CommentView, DomainError> {
        // One INSERT; thread linkage is the parent_comment_id column itself,
        // so there is no multi-document consistency window to manage.
        let comment_id: i64 = sqlx::query_scalar(
            "INSERT INTO comments (content, author_id, post_id, parent_comment_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id",
        )
        .bind(&input.content)
        .bind(input.author_id)
        .bind(input.post_id)
        .bind(input.parent_comment_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        self.fetch_view(comment_id).await?.ok_or_else(|| {
            DomainError::Unexpected(format!("comment {comment_id} vanished after insert"))
        })
    }

    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, DomainError> {
        let row: Option<CommentViewRow> =
            sqlx::query_as(&format!("{COMMENT_VIEW_SELECT} WHERE c.id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_comment_db_error)?;

        Ok(row.map(|r| map_row_to_view(r).comment))
    }

    async fn update_comment(
        &self,
        id: i64,
        content: String,
    ) -> Result<Option<CommentView>, DomainError> {
        let updated: Option<i64> = sqlx::query_scalar(
            "UPDATE comments SET content = $2, updated_at = NOW() WHERE id = $1 RETURNING id",
        )
        .bind(id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        match updated {
            Some(id) => self.fetch_view(id).await,
            None => Ok(None),
        }
    }

    async fn delete_comment(&self, id: i64) -> Result<bool, DomainError> {
        // Replies cascade via the parent_comment_id FK.
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_comment_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentThread>, DomainError> {
        let top_level: Vec<CommentViewRow> = sqlx::query_as(&format!(
            "{COMMENT_VIEW_SELECT} \
             WHERE c.post_id = $1 AND c.parent_comment_id IS NULL AND c.is_approved \
             ORDER BY c.created_at DESC, c.id DESC"
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        let parent_ids: Vec<i64> = top_level.iter().map(|r| r.id).collect();
        let mut replies = self.load_replies(&parent_ids).await?;

        Ok(top_level
            .into_iter()
            .map(|row| {
                let attached = replies.remove(&row.id).unwrap_or_default();
                CommentThread {
                    comment: map_row_to_view(row),
                    replies: attached,
                }
            })
            .collect())
    }

    async fn toggle_like(
        &self,
        comment_id: i64,
        user_id: i64,
    ) -> Result<Option<LikeOutcome>, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_comment_db_error)?;

        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM comments WHERE id = $1")
            .bind(comment_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_comment_db_error)?;
        if exists.is_none() {
            return Ok(None);
        }

        let removed =
            sqlx::query("DELETE FROM comment_likes WHERE comment_id = $1 AND user_id = $2")
                .bind(comment_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await
                .map_err(map_comment_db_error)?
                .rows_affected();

        let has_liked = if removed == 0 {
            sqlx::query(
                "INSERT INTO comment_likes (comment_id, user_id) VALUES ($1, $2) \
                 ON CONFLICT DO NOTHING",
            )
            .bind(comment_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(map_comment_db_error)?;
            true
        } else {
            false
        };

        let like_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM comment_likes WHERE comment_id = $1")
                .bind(comment_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(map_comment_db_error)?;

        tx.commit().await.map_err(map_comment_db_error)?;

        Ok(Some(LikeOutcome {
            like_count,
            has_liked,
        }))
    }
}

impl PostgresCommentRepository {
    async fn fetch_view(&self, id: i64) -> Result<Option<CommentView>, DomainError> {
        let row: Option<CommentViewRow> =
            sqlx::query_as(&format!("{COMMENT_VIEW_SELECT} WHERE c.id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_comment_db_error)?;

        Ok(row.map(map_row_to_view))
    }

    async fn load_replies(
        &self,
        parent_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<CommentView>>, DomainError> {
        if parent_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<CommentViewRow> = sqlx::query_as(&format!(
            "{COMMENT_VIEW_SELECT} \
             WHERE c.parent_comment_id = ANY($1) \
             ORDER BY c.created_at ASC, c.id ASC"
        ))
        .bind(parent_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        let mut grouped: HashMap<i64, Vec<CommentView>> = HashMap::new();
        for row in rows {
            let parent = row
                .parent_comment_id
                .ok_or_else(|| DomainError::Unexpected("reply without parent id".to_string()))?;
            grouped.entry(parent).or_default().push(map_row_to_view(row));
        }
        Ok(grouped)
    }
}

fn map_row_to_view(row: CommentViewRow) -> CommentView {
    CommentView {
        comment: Comment {
            id: row.id,
            content: row.content,
            author_id: row.author_id,
            post_id: row.post_id,
            parent_comment_id: row.parent_comment_id,
            is_approved: row.is_approved,
            created_at: row.created_at,
            updated_at: row.updated_at,
        },
        author: CommentAuthor {
            id: row.author_id,
            username: row.author_username,
            avatar: row.author_avatar,
        },
        like_count: row.like_count,
    }
}

fn map_comment_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23503")
    {
        let resource = match db_err.constraint() {
            Some("comments_post_id_fkey") => "post",
            Some("comments_parent_comment_id_fkey") => "parent comment",
            Some("comments_author_id_fkey") => "author",
            _ => "referenced resource",
        };
        return DomainError::NotFound(resource.to_string());
    }
    DomainError::Unexpected(err.to_string())
}
