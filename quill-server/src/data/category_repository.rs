use async_trait::async_trait;

use crate::domain::category::Category;
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct NewCategory {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) color: String,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct CategoryPatch {
    pub(crate) name: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) color: Option<String>,
}

#[async_trait]
pub(crate) trait CategoryRepository: Send + Sync {
    async fn create_category(&self, input: NewCategory) -> Result<Category, DomainError>;
    async fn list_active(&self) -> Result<Vec<Category>, DomainError>;
    /// Case-insensitive substring match, used to resolve the `category`
    /// listing filter to an id.
    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, DomainError>;
    async fn update_category(
        &self,
        id: i64,
        patch: CategoryPatch,
    ) -> Result<Option<Category>, DomainError>;
    /// Soft delete: categories are deactivated, never removed.
    async fn deactivate_category(&self, id: i64) -> Result<bool, DomainError>;
}
