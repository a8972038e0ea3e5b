use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use super::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Role {
    User,
    Admin,
}

impl Role {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub(crate) fn parse(raw: &str) -> Result<Self, DomainError> {
        match raw {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(DomainError::Validation {
                field: "role",
                message: "must be 'user' or 'admin'",
            }),
        }
    }
}

/// Identity resolved from a verified bearer token on the current request.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Actor {
    pub(crate) id: i64,
    pub(crate) role: Role,
}

impl Actor {
    /// Ownership check: a resource may be mutated by its author or an admin.
    pub(crate) fn can_mutate(&self, author_id: i64) -> bool {
        self.id == author_id || self.role == Role::Admin
    }
}

#[derive(Debug, Clone)]
pub(crate) struct User {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) role: Role,
    pub(crate) avatar: String,
    pub(crate) bio: String,
    pub(crate) created_at: DateTime<Utc>,
}

/// Public profile projection; never carries email or password hash.
#[derive(Debug, Clone)]
pub(crate) struct UserProfile {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) avatar: String,
    pub(crate) bio: String,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RegisterRequest {
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password: String,
}

impl RegisterRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let username = normalize_username(&self.username)?;
        let email = normalize_email(&self.email)?;
        let password_len = self.password.chars().count();
        if password_len < 6 || password_len > 128 {
            return Err(DomainError::Validation {
                field: "password",
                message: "must be 6..128 chars",
            });
        }
        Ok(Self {
            username,
            email,
            password: self.password,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct LoginRequest {
    pub(crate) email: String,
    pub(crate) password: String,
}

impl LoginRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let email = normalize_email(&self.email)?;
        if self.password.is_empty() {
            return Err(DomainError::Validation {
                field: "password",
                message: "must not be empty",
            });
        }
        Ok(Self {
            email,
            password: self.password,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ProfileUpdateRequest {
    pub(crate) avatar: Option<String>,
    pub(crate) bio: Option<String>,
}

impl ProfileUpdateRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        if let Some(bio) = &self.bio
            && bio.chars().count() > 500
        {
            return Err(DomainError::Validation {
                field: "bio",
                message: "must be at most 500 chars",
            });
        }
        if let Some(avatar) = &self.avatar
            && avatar.len() > 2048
        {
            return Err(DomainError::Validation {
                field: "avatar",
                message: "must be at most 2048 chars",
            });
        }
        Ok(self)
    }
}

fn normalize_username(username: &str) -> Result<String, DomainError> {
    let username = username.trim();
    let len = username.chars().count();
    if len < 3 || len > 30 {
        return Err(DomainError::Validation {
            field: "username",
            message: "must be 3..30 chars",
        });
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(DomainError::Validation {
            field: "username",
            message: "must contain only letters, digits and underscores",
        });
    }
    Ok(username.to_string())
}

fn normalize_email(email: &str) -> Result<String, DomainError> {
    let email = email.trim().to_lowercase();
    if !email.validate_email() {
        return Err(DomainError::Validation {
            field: "email",
            message: "must be a valid email",
        });
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::{Actor, LoginRequest, RegisterRequest, Role, normalize_email, normalize_username};

    #[test]
    fn username_rules_are_applied() {
        assert!(normalize_username("ab").is_err());
        assert!(normalize_username("has space").is_err());
        assert!(normalize_username("dash-ed").is_err());
        assert!(normalize_username("valid_user_42").is_ok());
    }

    #[test]
    fn normalize_email_trims_and_lowercases() {
        let value = normalize_email("  TeSt@Example.COM ").expect("must be valid");
        assert_eq!(value, "test@example.com");
    }

    #[test]
    fn register_password_length_is_checked() {
        let short = RegisterRequest {
            username: "valid_user".to_string(),
            email: "test@example.com".to_string(),
            password: "abc".to_string(),
        };
        assert!(short.validate().is_err());

        let ok = RegisterRequest {
            username: "valid_user".to_string(),
            email: "test@example.com".to_string(),
            password: "secret1".to_string(),
        };
        let validated = ok.validate().expect("must be valid");
        assert_eq!(validated.username, "valid_user");
        assert_eq!(validated.email, "test@example.com");
    }

    #[test]
    fn login_requires_non_empty_password() {
        let req = LoginRequest {
            email: "test@example.com".to_string(),
            password: String::new(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn owner_and_admin_can_mutate_others_cannot() {
        let owner = Actor {
            id: 10,
            role: Role::User,
        };
        let admin = Actor {
            id: 99,
            role: Role::Admin,
        };
        let stranger = Actor {
            id: 11,
            role: Role::User,
        };

        assert!(owner.can_mutate(10));
        assert!(admin.can_mutate(10));
        assert!(!stranger.can_mutate(10));
    }

    #[test]
    fn role_parse_round_trips() {
        assert_eq!(Role::parse("admin").expect("valid"), Role::Admin);
        assert_eq!(Role::parse("user").expect("valid"), Role::User);
        assert!(Role::parse("root").is_err());
        assert_eq!(Role::Admin.as_str(), "admin");
    }
}
