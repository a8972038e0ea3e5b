use crate::data::category_repository::{CategoryPatch, CategoryRepository, NewCategory};
use crate::domain::category::{
    Category, CreateCategoryRequest, DEFAULT_COLOR, UpdateCategoryRequest,
};
use crate::domain::error::DomainError;

pub(crate) struct CategoryService<R: CategoryRepository> {
    repo: R,
}

impl<R: CategoryRepository> CategoryService<R> {
    pub(crate) fn new(repo: R) -> Self {
        Self { repo }
    }

    pub(crate) async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        self.repo.list_active().await
    }

    pub(crate) async fn create_category(
        &self,
        req: CreateCategoryRequest,
    ) -> Result<Category, DomainError> {
        let req = req.validate()?;
        let new_category = NewCategory {
            name: req.name,
            description: req.description.unwrap_or_default(),
            color: req.color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
        };
        self.repo.create_category(new_category).await
    }

    pub(crate) async fn update_category(
        &self,
        id: i64,
        req: UpdateCategoryRequest,
    ) -> Result<Category, DomainError> {
        let req = req.validate()?;
        let patch = CategoryPatch {
            name: req.name,
            description: req.description,
            color: req.color,
        };
        self.repo
            .update_category(id, patch)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("category id: {id}")))
    }

    pub(crate) async fn delete_category(&self, id: i64) -> Result<(), DomainError> {
        if !self.repo.deactivate_category(id).await? {
            return Err(DomainError::NotFound(format!("category id: {id}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chrono::Utc;

    use super::CategoryService;
    use crate::data::category_repository::{CategoryPatch, CategoryRepository, NewCategory};
    use crate::domain::category::{Category, CreateCategoryRequest, UpdateCategoryRequest};
    use crate::domain::error::DomainError;

    #[derive(Clone, Default)]
    struct FakeCategoryRepo {
        created_input: Arc<Mutex<Option<NewCategory>>>,
        stored_category: Arc<Mutex<Option<Category>>>,
    }

    #[async_trait]
    impl CategoryRepository for FakeCategoryRepo {
        async fn create_category(&self, input: NewCategory) -> Result<Category, DomainError> {
            let category = Category {
                id: 1,
                name: input.name.clone(),
                description: input.description.clone(),
                color: input.color.clone(),
                is_active: true,
                created_at: Utc::now(),
            };
            *self
                .created_input
                .lock()
                .expect("created_input mutex poisoned") = Some(input);
            Ok(category)
        }

        async fn list_active(&self) -> Result<Vec<Category>, DomainError> {
            Ok(Vec::new())
        }

        async fn find_by_name(&self, _name: &str) -> Result<Option<Category>, DomainError> {
            Ok(None)
        }

        async fn update_category(
            &self,
            _id: i64,
            _patch: CategoryPatch,
        ) -> Result<Option<Category>, DomainError> {
            Ok(self
                .stored_category
                .lock()
                .expect("stored_category mutex poisoned")
                .clone())
        }

        async fn deactivate_category(&self, _id: i64) -> Result<bool, DomainError> {
            Ok(self
                .stored_category
                .lock()
                .expect("stored_category mutex poisoned")
                .take()
                .is_some())
        }
    }

    #[tokio::test]
    async fn create_category_fills_in_defaults() {
        let repo = FakeCategoryRepo::default();
        let service = CategoryService::new(repo.clone());

        let req = CreateCategoryRequest {
            name: "  Rust  ".to_string(),
            description: None,
            color: None,
        };
        service
            .create_category(req)
            .await
            .expect("create must succeed");

        let created = repo
            .created_input
            .lock()
            .expect("created_input mutex poisoned")
            .clone()
            .expect("create_category must be called");
        assert_eq!(created.name, "Rust");
        assert_eq!(created.description, "");
        assert_eq!(created.color, "#6B7280");
    }

    #[tokio::test]
    async fn update_category_returns_not_found_for_unknown_id() {
        let service = CategoryService::new(FakeCategoryRepo::default());
        let err = service
            .update_category(7, UpdateCategoryRequest::default())
            .await
            .expect_err("category must be missing");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_category_returns_not_found_for_unknown_id() {
        let service = CategoryService::new(FakeCategoryRepo::default());
        let err = service
            .delete_category(7)
            .await
            .expect_err("category must be missing");
        assert!(matches!(err, DomainError::NotFound(_)));
    }
}
