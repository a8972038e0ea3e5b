use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;

const EXCERPT_CHARS: usize = 150;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) excerpt: String,
    pub(crate) featured_image: String,
    pub(crate) author_id: i64,
    pub(crate) tags: Vec<String>,
    pub(crate) is_published: bool,
    pub(crate) published_at: DateTime<Utc>,
    pub(crate) slug: String,
    pub(crate) view_count: i64,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

/// Author fields joined into post read responses.
#[derive(Debug, Clone)]
pub(crate) struct PostAuthor {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) avatar: String,
}

#[derive(Debug, Clone)]
pub(crate) struct CategoryRef {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) color: String,
}

/// A post joined with its author, categories and derived counters.
/// Counts are always recomputed from the like/comment tables, never stored.
#[derive(Debug, Clone)]
pub(crate) struct PostView {
    pub(crate) post: Post,
    pub(crate) author: PostAuthor,
    pub(crate) categories: Vec<CategoryRef>,
    pub(crate) comment_count: i64,
    pub(crate) like_count: i64,
}

#[derive(Debug, Clone)]
pub(crate) struct CreatePostRequest {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) excerpt: Option<String>,
    pub(crate) category_ids: Vec<i64>,
    pub(crate) tags: Vec<String>,
    pub(crate) is_published: bool,
    pub(crate) featured_image: Option<String>,
}

impl CreatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            title: normalize_title(&self.title)?,
            content: normalize_content(&self.content)?,
            excerpt: self.excerpt.map(|e| normalize_excerpt(&e)).transpose()?,
            tags: normalize_tags(self.tags),
            category_ids: self.category_ids,
            is_published: self.is_published,
            featured_image: self.featured_image,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct UpdatePostRequest {
    pub(crate) title: Option<String>,
    pub(crate) content: Option<String>,
    pub(crate) excerpt: Option<String>,
    pub(crate) category_ids: Option<Vec<i64>>,
    pub(crate) tags: Option<Vec<String>>,
    pub(crate) is_published: Option<bool>,
    pub(crate) featured_image: Option<String>,
}

impl UpdatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            title: self.title.map(|t| normalize_title(&t)).transpose()?,
            content: self.content.map(|c| normalize_content(&c)).transpose()?,
            excerpt: self.excerpt.map(|e| normalize_excerpt(&e)).transpose()?,
            tags: self.tags.map(normalize_tags),
            category_ids: self.category_ids,
            is_published: self.is_published,
            featured_image: self.featured_image,
        })
    }
}

/// Deterministic slug: lowercase, keep only `[a-z0-9 -]`, whitespace runs
/// become single hyphens, repeated hyphens collapse.
pub(crate) fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let kept: String = lowered
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == ' ' || *c == '-')
        .collect();

    let mut slug = String::with_capacity(kept.len());
    let mut prev_hyphen = false;
    for c in kept.chars() {
        let c = if c.is_whitespace() { '-' } else { c };
        if c == '-' {
            if !prev_hyphen {
                slug.push('-');
            }
            prev_hyphen = true;
        } else {
            slug.push(c);
            prev_hyphen = false;
        }
    }
    slug
}

/// First 150 characters of the content plus an ellipsis marker.
pub(crate) fn derive_excerpt(content: &str) -> String {
    let truncated: String = content.chars().take(EXCERPT_CHARS).collect();
    format!("{truncated}...")
}

fn normalize_title(title: &str) -> Result<String, DomainError> {
    let title = title.trim();
    let len = title.chars().count();
    if len == 0 || len > 200 {
        return Err(DomainError::Validation {
            field: "title",
            message: "must be 1..200 chars",
        });
    }
    Ok(title.to_string())
}

fn normalize_content(content: &str) -> Result<String, DomainError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(DomainError::Validation {
            field: "content",
            message: "must not be empty",
        });
    }
    Ok(content.to_string())
}

fn normalize_excerpt(excerpt: &str) -> Result<String, DomainError> {
    let excerpt = excerpt.trim();
    if excerpt.chars().count() > 300 {
        return Err(DomainError::Validation {
            field: "excerpt",
            message: "must be at most 300 chars",
        });
    }
    Ok(excerpt.to_string())
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{CreatePostRequest, DomainError, UpdatePostRequest, derive_excerpt, slugify};

    #[test]
    fn slugify_strips_punctuation_and_hyphenates() {
        assert_eq!(slugify("Hello, World! 2024"), "hello-world-2024");
    }

    #[test]
    fn slugify_collapses_whitespace_and_hyphen_runs() {
        assert_eq!(slugify("a   b"), "a-b");
        assert_eq!(slugify("a -- b"), "a-b");
        assert_eq!(slugify("Rust  &  You"), "rust-you");
    }

    #[test]
    fn slugify_keeps_digits_and_existing_hyphens() {
        assert_eq!(slugify("post-42"), "post-42");
    }

    #[test]
    fn derive_excerpt_truncates_to_150_chars() {
        let content = "x".repeat(400);
        let excerpt = derive_excerpt(&content);
        assert_eq!(excerpt.chars().count(), 153);
        assert!(excerpt.ends_with("..."));
    }

    #[test]
    fn derive_excerpt_is_char_boundary_safe() {
        let content = "ё".repeat(200);
        let excerpt = derive_excerpt(&content);
        assert_eq!(excerpt.chars().count(), 153);
    }

    #[test]
    fn create_request_rejects_empty_title() {
        let req = sample_create("   ", "content");
        let err = req.validate().expect_err("title must be rejected");
        assert_validation_field(err, "title");
    }

    #[test]
    fn create_request_rejects_overlong_title() {
        let req = sample_create(&"t".repeat(201), "content");
        let err = req.validate().expect_err("title must be rejected");
        assert_validation_field(err, "title");
    }

    #[test]
    fn create_request_normalizes_tags() {
        let mut req = sample_create("Title", "content");
        req.tags = vec![" rust ".to_string(), String::new(), "web".to_string()];
        let validated = req.validate().expect("must validate");
        assert_eq!(validated.tags, vec!["rust", "web"]);
    }

    #[test]
    fn update_request_validates_only_present_fields() {
        let req = UpdatePostRequest {
            content: Some("  body  ".to_string()),
            ..Default::default()
        };
        let validated = req.validate().expect("must validate");
        assert_eq!(validated.content.as_deref(), Some("body"));
        assert!(validated.title.is_none());
    }

    fn sample_create(title: &str, content: &str) -> CreatePostRequest {
        CreatePostRequest {
            title: title.to_string(),
            content: content.to_string(),
            excerpt: None,
            category_ids: Vec::new(),
            tags: Vec::new(),
            is_published: true,
            featured_image: None,
        }
    }

    fn assert_validation_field(err: DomainError, expected_field: &'static str) {
        match err {
            DomainError::Validation { field, .. } => assert_eq!(field, expected_field),
            _ => panic!("expected DomainError::Validation"),
        }
    }
}
