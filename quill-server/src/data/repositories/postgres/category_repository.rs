use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::data::category_repository::{CategoryPatch, CategoryRepository, NewCategory};
use crate::domain::category::Category;
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct PostgresCategoryRepository {
    pool: PgPool,
}

impl PostgresCategoryRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: i64,
    name: String,
    description: String,
    color: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

const CATEGORY_COLUMNS: &str = "id, name, description, color, is_active, created_at";

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn create_category(&self, input: NewCategory) -> Result<Category, DomainError> {
        let row: CategoryRow = sqlx::query_as(
            "INSERT INTO categories (name, description, color) \
             VALUES ($1, $2, $3) \
             RETURNING id, name, description, color, is_active, created_at",
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.color)
        .fetch_one(&self.pool)
        .await
        .map_err(map_category_db_error)?;

        Ok(map_row_to_category(row))
    }

    async fn list_active(&self) -> Result<Vec<Category>, DomainError> {
        let rows: Vec<CategoryRow> = sqlx::query_as(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE is_active ORDER BY name ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_category_db_error)?;

        Ok(rows.into_iter().map(map_row_to_category).collect())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, DomainError> {
        let pattern = format!("%{}%", escape_like(name));
        let row: Option<CategoryRow> = sqlx::query_as(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories \
             WHERE name ILIKE $1 \
             ORDER BY name ASC \
             LIMIT 1"
        ))
        .bind(pattern)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_category_db_error)?;

        Ok(row.map(map_row_to_category))
    }

    async fn update_category(
        &self,
        id: i64,
        patch: CategoryPatch,
    ) -> Result<Option<Category>, DomainError> {
        let row: Option<CategoryRow> = sqlx::query_as(
            "UPDATE categories SET \
             name = COALESCE($2, name), \
             description = COALESCE($3, description), \
             color = COALESCE($4, color) \
             WHERE id = $1 \
             RETURNING id, name, description, color, is_active, created_at",
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.description)
        .bind(patch.color)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_category_db_error)?;

        Ok(row.map(map_row_to_category))
    }

    async fn deactivate_category(&self, id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query("UPDATE categories SET is_active = FALSE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_category_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn map_row_to_category(row: CategoryRow) -> Category {
    Category {
        id: row.id,
        name: row.name,
        description: row.description,
        color: row.color,
        is_active: row.is_active,
        created_at: row.created_at,
    }
}

fn map_category_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23505")
    {
        return DomainError::AlreadyExists("name".to_string());
    }
    DomainError::Unexpected(err.to_string())
}
