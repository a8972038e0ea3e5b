use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::data::Pagination;
use crate::data::user_repository::{NewUser, ProfilePatch, UserCredentials, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::user::{Role, User, UserProfile};

#[derive(Debug, Clone)]
pub(crate) struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    role: String,
    avatar: String,
    bio: String,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct UserCredentialsRow {
    id: i64,
    username: String,
    email: String,
    role: String,
    avatar: String,
    bio: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct UserProfileRow {
    id: i64,
    username: String,
    avatar: String,
    bio: String,
    created_at: DateTime<Utc>,
}

const USER_COLUMNS: &str = "id, username, email, role, avatar, bio, created_at";

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        let row: UserRow = sqlx::query_as(
            "INSERT INTO users (username, email, password_hash) \
             VALUES ($1, $2, $3) \
             RETURNING id, username, email, role, avatar, bio, created_at",
        )
        .bind(&input.username)
        .bind(&input.email)
        .bind(&input.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        map_row_to_user(row)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredentials>, DomainError> {
        let row: Option<UserCredentialsRow> = sqlx::query_as(
            "SELECT id, username, email, role, avatar, bio, password_hash, created_at \
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        match row {
            Some(r) => {
                let password_hash = r.password_hash.clone();
                let user = map_row_to_user(UserRow {
                    id: r.id,
                    username: r.username,
                    email: r.email,
                    role: r.role,
                    avatar: r.avatar,
                    bio: r.bio,
                    created_at: r.created_at,
                })?;
                Ok(Some(UserCredentials {
                    user,
                    password_hash,
                }))
            }
            None => Ok(None),
        }
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_user_db_error)?;

        row.map(map_row_to_user).transpose()
    }

    async fn update_profile(
        &self,
        id: i64,
        patch: ProfilePatch,
    ) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(
            "UPDATE users \
             SET avatar = COALESCE($2, avatar), \
                 bio = COALESCE($3, bio), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING id, username, email, role, avatar, bio, created_at",
        )
        .bind(id)
        .bind(patch.avatar)
        .bind(patch.bio)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        row.map(map_row_to_user).transpose()
    }

    async fn list_profiles(
        &self,
        pagination: Pagination,
    ) -> Result<Vec<UserProfile>, DomainError> {
        let rows: Vec<UserProfileRow> = sqlx::query_as(
            "SELECT id, username, avatar, bio, created_at \
             FROM users \
             ORDER BY created_at DESC, id DESC \
             LIMIT $1 OFFSET $2",
        )
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        Ok(rows
            .into_iter()
            .map(|r| UserProfile {
                id: r.id,
                username: r.username,
                avatar: r.avatar,
                bio: r.bio,
                created_at: r.created_at,
            })
            .collect())
    }

    async fn count_users(&self) -> Result<i64, DomainError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(map_user_db_error)
    }
}

fn map_row_to_user(row: UserRow) -> Result<User, DomainError> {
    let role = Role::parse(&row.role)
        .map_err(|_| DomainError::Unexpected(format!("unknown role '{}' in users", row.role)))?;

    Ok(User {
        id: row.id,
        username: row.username,
        email: row.email,
        role,
        avatar: row.avatar,
        bio: row.bio,
        created_at: row.created_at,
    })
}

fn map_user_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23505")
    {
        let resource = match db_err.constraint() {
            Some("users_username_key") => "username",
            Some("users_email_key") => "email",
            _ => "user",
        };
        return DomainError::AlreadyExists(resource.to_string());
    }
    DomainError::Unexpected(err.to_string())
}
