use async_trait::async_trait;

use crate::data::Pagination;
use crate::domain::error::DomainError;
use crate::domain::user::{User, UserProfile};

#[derive(Debug, Clone)]
pub(crate) struct UserCredentials {
    pub(crate) user: User,
    pub(crate) password_hash: String,
}

#[derive(Debug, Clone)]
pub(crate) struct NewUser {
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password_hash: String,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ProfilePatch {
    pub(crate) avatar: Option<String>,
    pub(crate) bio: Option<String>,
}

#[async_trait]
pub(crate) trait UserRepository: Send + Sync {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredentials>, DomainError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, DomainError>;
    async fn update_profile(
        &self,
        id: i64,
        patch: ProfilePatch,
    ) -> Result<Option<User>, DomainError>;
    async fn list_profiles(&self, pagination: Pagination)
    -> Result<Vec<UserProfile>, DomainError>;
    async fn count_users(&self) -> Result<i64, DomainError>;
}
