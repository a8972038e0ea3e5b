use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;

pub(crate) const DEFAULT_COLOR: &str = "#6B7280";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Category {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) color: String,
    pub(crate) is_active: bool,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub(crate) struct CreateCategoryRequest {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) color: Option<String>,
}

impl CreateCategoryRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            name: normalize_name(&self.name)?,
            description: self.description.map(|d| d.trim().to_string()),
            color: self.color.map(|c| normalize_color(&c)).transpose()?,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct UpdateCategoryRequest {
    pub(crate) name: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) color: Option<String>,
}

impl UpdateCategoryRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            name: self.name.map(|n| normalize_name(&n)).transpose()?,
            description: self.description.map(|d| d.trim().to_string()),
            color: self.color.map(|c| normalize_color(&c)).transpose()?,
        })
    }
}

fn normalize_name(name: &str) -> Result<String, DomainError> {
    let name = name.trim();
    let len = name.chars().count();
    if len == 0 || len > 50 {
        return Err(DomainError::Validation {
            field: "name",
            message: "must be 1..50 chars",
        });
    }
    Ok(name.to_string())
}

fn normalize_color(color: &str) -> Result<String, DomainError> {
    let color = color.trim();
    let is_hex = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !is_hex {
        return Err(DomainError::Validation {
            field: "color",
            message: "must be a hex color like #RRGGBB",
        });
    }
    Ok(color.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::{CreateCategoryRequest, UpdateCategoryRequest};

    #[test]
    fn name_length_limit_is_enforced() {
        let req = CreateCategoryRequest {
            name: "n".repeat(51),
            description: None,
            color: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn color_must_be_hex() {
        let req = CreateCategoryRequest {
            name: "Rust".to_string(),
            description: None,
            color: Some("red".to_string()),
        };
        assert!(req.validate().is_err());

        let req = CreateCategoryRequest {
            name: "Rust".to_string(),
            description: None,
            color: Some("#ff8800".to_string()),
        };
        let validated = req.validate().expect("must validate");
        assert_eq!(validated.color.as_deref(), Some("#FF8800"));
    }

    #[test]
    fn update_accepts_partial_patch() {
        let req = UpdateCategoryRequest {
            description: Some("  systems things  ".to_string()),
            ..Default::default()
        };
        let validated = req.validate().expect("must validate");
        assert_eq!(validated.description.as_deref(), Some("systems things"));
        assert!(validated.name.is_none());
    }
}
