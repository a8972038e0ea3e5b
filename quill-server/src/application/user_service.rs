use crate::data::Pagination;
use crate::data::user_repository::UserRepository;
use crate::domain::error::DomainError;
use crate::domain::user::{User, UserProfile};

const DEFAULT_PAGE_SIZE: u32 = 10;
const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone)]
pub(crate) struct UserPage {
    pub(crate) users: Vec<UserProfile>,
    pub(crate) page: u32,
    pub(crate) page_size: u32,
    pub(crate) total: i64,
}

impl UserPage {
    pub(crate) fn total_pages(&self) -> i64 {
        let size = i64::from(self.page_size.max(1));
        (self.total + size - 1) / size
    }

    pub(crate) fn has_next(&self) -> bool {
        i64::from(self.page) < self.total_pages()
    }

    pub(crate) fn has_prev(&self) -> bool {
        self.page > 1
    }
}

pub(crate) struct UserService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    pub(crate) fn new(repo: R) -> Self {
        Self { repo }
    }

    pub(crate) async fn list_users(
        &self,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<UserPage, DomainError> {
        let page = page.unwrap_or(1).max(1);
        let page_size = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);

        let users = self
            .repo
            .list_profiles(Pagination { page, page_size })
            .await?;
        let total = self.repo.count_users().await?;

        Ok(UserPage {
            users,
            page,
            page_size,
            total,
        })
    }

    pub(crate) async fn get_profile(&self, id: i64) -> Result<UserProfile, DomainError> {
        let user = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user id: {id}")))?;
        Ok(profile_of(user))
    }
}

fn profile_of(user: User) -> UserProfile {
    UserProfile {
        id: user.id,
        username: user.username,
        avatar: user.avatar,
        bio: user.bio,
        created_at: user.created_at,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::Utc;

    use super::UserService;
    use crate::data::Pagination;
    use crate::data::user_repository::{
        NewUser, ProfilePatch, UserCredentials, UserRepository,
    };
    use crate::domain::error::DomainError;
    use crate::domain::user::{Role, User, UserProfile};

    #[derive(Clone, Default)]
    struct FakeUserRepo {
        user_by_id: Arc<Mutex<Option<User>>>,
        seen_pagination: Arc<Mutex<Option<Pagination>>>,
        total: Arc<Mutex<i64>>,
    }

    #[async_trait]
    impl UserRepository for FakeUserRepo {
        async fn create_user(&self, _input: NewUser) -> Result<User, DomainError> {
            unimplemented!("not exercised")
        }

        async fn find_by_email(
            &self,
            _email: &str,
        ) -> Result<Option<UserCredentials>, DomainError> {
            unimplemented!("not exercised")
        }

        async fn find_by_id(&self, _id: i64) -> Result<Option<User>, DomainError> {
            Ok(self
                .user_by_id
                .lock()
                .expect("user_by_id mutex poisoned")
                .clone())
        }

        async fn update_profile(
            &self,
            _id: i64,
            _patch: ProfilePatch,
        ) -> Result<Option<User>, DomainError> {
            unimplemented!("not exercised")
        }

        async fn list_profiles(
            &self,
            pagination: Pagination,
        ) -> Result<Vec<UserProfile>, DomainError> {
            *self
                .seen_pagination
                .lock()
                .expect("seen_pagination mutex poisoned") = Some(pagination);
            Ok(Vec::new())
        }

        async fn count_users(&self) -> Result<i64, DomainError> {
            Ok(*self.total.lock().expect("total mutex poisoned"))
        }
    }

    #[tokio::test]
    async fn get_profile_drops_private_fields() {
        let repo = FakeUserRepo::default();
        *repo.user_by_id.lock().expect("user_by_id mutex poisoned") = Some(User {
            id: 4,
            username: "reader".to_string(),
            email: "reader@example.com".to_string(),
            role: Role::User,
            avatar: "/uploads/a.png".to_string(),
            bio: "hi".to_string(),
            created_at: Utc::now(),
        });
        let service = UserService::new(repo);

        let profile = service.get_profile(4).await.expect("profile must exist");
        assert_eq!(profile.id, 4);
        assert_eq!(profile.username, "reader");
        assert_eq!(profile.avatar, "/uploads/a.png");
    }

    #[tokio::test]
    async fn get_profile_returns_not_found_for_unknown_id() {
        let service = UserService::new(FakeUserRepo::default());
        let err = service
            .get_profile(4)
            .await
            .expect_err("user must be missing");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_users_clamps_paging() {
        let repo = FakeUserRepo::default();
        *repo.total.lock().expect("total mutex poisoned") = 42;
        let service = UserService::new(repo.clone());

        let page = service
            .list_users(Some(0), Some(500))
            .await
            .expect("list must succeed");
        assert_eq!(page.page, 1);
        assert_eq!(page.page_size, 100);
        assert_eq!(page.total, 42);

        let pagination = repo
            .seen_pagination
            .lock()
            .expect("seen_pagination mutex poisoned")
            .expect("pagination must be captured");
        assert_eq!(pagination.page, 1);
        assert_eq!(pagination.page_size, 100);
    }
}
